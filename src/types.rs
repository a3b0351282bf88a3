//! Core types and data structures for the fee and payroll ledger

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Billing period a structure covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    /// Academic semester number (fee structures)
    Semester(u8),
    /// Payroll month (salary structures)
    Month { year: i32, month: u32 },
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Semester(n) => write!(f, "semester {}", n),
            Period::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
        }
    }
}

/// Kind of obligation a structure defines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// Student fee for a course semester
    Fee,
    /// Employee salary for a payroll month
    Salary,
}

/// Fee component amounts for one course semester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeComponents {
    /// Tuition fee (required, must be positive)
    pub tuition: BigDecimal,
    /// Library fee
    pub library: BigDecimal,
    /// Examination fee
    pub exam: BigDecimal,
    /// Miscellaneous charges
    pub other: BigDecimal,
    /// Date by which the total must be settled
    pub due_date: NaiveDate,
}

impl FeeComponents {
    /// Total amount owed for these components
    pub fn total(&self) -> BigDecimal {
        &self.tuition + &self.library + &self.exam + &self.other
    }
}

/// Salary component amounts for one payroll month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryComponents {
    /// Base salary (required, must be positive)
    pub base: BigDecimal,
    /// House rent allowance
    pub hra: BigDecimal,
    /// Dearness allowance
    pub da: BigDecimal,
    /// Other allowances
    pub allowances: BigDecimal,
    /// Total deductions (PF, tax, etc.)
    pub deductions: BigDecimal,
}

impl SalaryComponents {
    /// Gross earnings before deductions
    pub fn gross(&self) -> BigDecimal {
        &self.base + &self.hra + &self.da + &self.allowances
    }

    /// Net salary payable (gross minus deductions)
    pub fn net(&self) -> BigDecimal {
        self.gross() - &self.deductions
    }
}

/// Component set of a structure
///
/// The total is always derived from the components through [`Components::total`];
/// it is never stored and cannot be set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Components {
    Fee(FeeComponents),
    Salary(SalaryComponents),
}

impl Components {
    /// Kind of structure these components belong to
    pub fn kind(&self) -> StructureKind {
        match self {
            Components::Fee(_) => StructureKind::Fee,
            Components::Salary(_) => StructureKind::Salary,
        }
    }

    /// Signed component sum: fee total, or net salary for salary components
    pub fn total(&self) -> BigDecimal {
        match self {
            Components::Fee(fee) => fee.total(),
            Components::Salary(salary) => salary.net(),
        }
    }

    /// Merge a patch into the components
    ///
    /// Fails with [`LedgerError::Validation`] when the patch kind does not
    /// match the component kind.
    pub fn apply(&mut self, patch: ComponentPatch) -> LedgerResult<()> {
        match (self, patch) {
            (Components::Fee(fee), ComponentPatch::Fee(p)) => {
                if let Some(tuition) = p.tuition {
                    fee.tuition = tuition;
                }
                if let Some(library) = p.library {
                    fee.library = library;
                }
                if let Some(exam) = p.exam {
                    fee.exam = exam;
                }
                if let Some(other) = p.other {
                    fee.other = other;
                }
                if let Some(due_date) = p.due_date {
                    fee.due_date = due_date;
                }
                Ok(())
            }
            (Components::Salary(salary), ComponentPatch::Salary(p)) => {
                if let Some(base) = p.base {
                    salary.base = base;
                }
                if let Some(hra) = p.hra {
                    salary.hra = hra;
                }
                if let Some(da) = p.da {
                    salary.da = da;
                }
                if let Some(allowances) = p.allowances {
                    salary.allowances = allowances;
                }
                if let Some(deductions) = p.deductions {
                    salary.deductions = deductions;
                }
                Ok(())
            }
            _ => Err(LedgerError::Validation(
                "Component patch kind does not match structure kind".to_string(),
            )),
        }
    }
}

/// Partial update for fee components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeePatch {
    pub tuition: Option<BigDecimal>,
    pub library: Option<BigDecimal>,
    pub exam: Option<BigDecimal>,
    pub other: Option<BigDecimal>,
    pub due_date: Option<NaiveDate>,
}

/// Partial update for salary components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalaryPatch {
    pub base: Option<BigDecimal>,
    pub hra: Option<BigDecimal>,
    pub da: Option<BigDecimal>,
    pub allowances: Option<BigDecimal>,
    pub deductions: Option<BigDecimal>,
}

/// Partial component update applied by `update_structure`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComponentPatch {
    Fee(FeePatch),
    Salary(SalaryPatch),
}

/// A fee or salary structure: what one subject owes (or is owed) for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Unique identifier for the structure
    pub id: String,
    /// Course the fee applies to, or the employee the salary belongs to
    pub subject_id: String,
    /// Period the structure covers
    pub period: Period,
    /// Component amounts; the total is derived, never stored
    pub components: Components,
    /// Whether this is the version currently accepting payments
    pub active: bool,
    /// When the structure was created
    pub created_at: NaiveDateTime,
    /// When the structure was last updated
    pub updated_at: NaiveDateTime,
}

impl Structure {
    /// Create a new active structure
    pub fn new(id: String, subject_id: String, period: Period, components: Components) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            subject_id,
            period,
            components,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Kind of this structure
    pub fn kind(&self) -> StructureKind {
        self.components.kind()
    }

    /// Derived total: fee component sum, or net salary
    pub fn total(&self) -> BigDecimal {
        self.components.total()
    }

    /// Due date, present only for fee structures
    pub fn due_date(&self) -> Option<NaiveDate> {
        match &self.components {
            Components::Fee(fee) => Some(fee.due_date),
            Components::Salary(_) => None,
        }
    }
}

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    Online,
    Cheque,
    BankTransfer,
    DemandDraft,
}

/// Settlement status of a structure, cached on its newest payment record
///
/// Fee structures move through `Pending -> Partial -> Paid`, with `Overdue`
/// reported whenever money is still owed past the due date. Salary structures
/// report `Processing`, `Paid` or `Failed` from the disbursement attempt
/// outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// No payment received yet (fee)
    Pending,
    /// Some payments received, total not yet covered (fee)
    Partial,
    /// Total fully covered
    Paid,
    /// Money still owed past the due date (fee)
    Overdue,
    /// Disbursement attempt not yet resolved (salary)
    Processing,
    /// Disbursement attempt rejected by the channel (salary)
    Failed,
}

/// Outcome reported by the salary disbursement channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisbursementOutcome {
    /// Funds confirmed transferred
    Settled,
    /// Transfer rejected or bounced
    Failed,
    /// Attempt still pending with the channel
    InFlight,
}

/// Append-only record of one payment made against a structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Unique identifier for the record
    pub id: String,
    /// Structure the payment settles against
    pub structure_id: String,
    /// Amount paid, always positive
    pub amount: BigDecimal,
    /// Date the payment was made
    pub date: NaiveDate,
    /// How the payment was made
    pub mode: PaymentMode,
    /// External transaction reference, when the mode provides one
    pub transaction_id: Option<String>,
    /// Free-form remarks
    pub remarks: Option<String>,
    /// Cached settlement status; `summarize` is the source of truth
    pub status: PaymentStatus,
    /// When the record was created
    pub created_at: NaiveDateTime,
    /// When the record was last updated
    pub updated_at: NaiveDateTime,
}

impl PaymentRecord {
    /// Create a new record with a generated id
    pub fn new(
        structure_id: String,
        amount: BigDecimal,
        date: NaiveDate,
        mode: PaymentMode,
        status: PaymentStatus,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            structure_id,
            amount,
            date,
            mode,
            transaction_id: None,
            remarks: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this record's amount counts toward the paid total
    ///
    /// Failed disbursements never reduce what is owed.
    pub fn counts_toward_paid(&self) -> bool {
        self.status != PaymentStatus::Failed
    }
}

/// Computed settlement view of one structure; never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Structure the summary describes
    pub structure_id: String,
    /// Subject the structure belongs to
    pub subject_id: String,
    /// Period the structure covers
    pub period: Period,
    /// Fee or salary
    pub kind: StructureKind,
    /// Structure total: what is owed
    pub total_owed: BigDecimal,
    /// Sum of all non-failed payment amounts
    pub total_paid: BigDecimal,
    /// max(0, owed - paid)
    pub pending: BigDecimal,
    /// Derived settlement status
    pub status: PaymentStatus,
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Structure not found: {0}")]
    StructureNotFound(String),
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
