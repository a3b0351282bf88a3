//! # Bursar Core
//!
//! A fee and payroll ledger library providing payment reconciliation,
//! dues tracking, and statement generation for campus administration
//! systems.
//!
//! ## Features
//!
//! - **Structure catalog**: fee structures per course semester and versioned
//!   salary structures per employee, with totals derived from components
//! - **Payment ledger**: append-only payment records with cached settlement
//!   status and date-descending listings
//! - **Reconciliation**: pure re-aggregation of owed/paid/pending amounts
//!   and status classification (Pending/Partial/Paid/Overdue for fees,
//!   Processing/Paid/Failed for salaries)
//! - **Statements**: per-subject settlement views across all periods
//! - **Storage abstraction**: database-agnostic design with trait-based
//!   storage
//!
//! ## Quick Start
//!
//! ```rust
//! use bursar_core::{Ledger, MemoryStore, Components, FeeComponents, Period};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # async fn run() -> bursar_core::LedgerResult<()> {
//! let store = MemoryStore::new();
//! let mut ledger = Ledger::new(store);
//!
//! let structure = ledger
//!     .create_structure(
//!         "fee-cs-1".to_string(),
//!         "course-cs".to_string(),
//!         Period::Semester(1),
//!         Components::Fee(FeeComponents {
//!             tuition: BigDecimal::from(60000),
//!             library: BigDecimal::from(5000),
//!             exam: BigDecimal::from(3000),
//!             other: BigDecimal::from(7000),
//!             due_date: NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
//!         }),
//!     )
//!     .await?;
//! assert_eq!(structure.total(), BigDecimal::from(75000));
//! # Ok(())
//! # }
//! ```

pub mod ledger;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use ledger::*;
pub use reconciliation::{settle, ReconciliationEngine, Statement};
pub use traits::*;
pub use types::*;
pub use utils::memory_store::MemoryStore;
