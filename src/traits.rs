//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Storage abstraction for the ledger system
///
/// This trait allows the ledger core to work with any storage backend
/// (PostgreSQL, MongoDB, in-memory, etc.) by implementing these methods.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Save a new structure to storage
    async fn save_structure(&mut self, structure: &Structure) -> LedgerResult<()>;

    /// Get a structure by id
    async fn get_structure(&self, structure_id: &str) -> LedgerResult<Option<Structure>>;

    /// Find the structure for a subject and period
    async fn find_structure(
        &self,
        subject_id: &str,
        period: Period,
    ) -> LedgerResult<Option<Structure>>;

    /// List structures, optionally filtered by subject and kind
    async fn list_structures(
        &self,
        subject_id: Option<&str>,
        kind: Option<StructureKind>,
    ) -> LedgerResult<Vec<Structure>>;

    /// Update an existing structure
    async fn update_structure(&mut self, structure: &Structure) -> LedgerResult<()>;

    /// Delete a structure
    async fn delete_structure(&mut self, structure_id: &str) -> LedgerResult<()>;

    /// Append a payment record to storage
    async fn save_payment(&mut self, payment: &PaymentRecord) -> LedgerResult<()>;

    /// Get a payment record by id
    async fn get_payment(&self, payment_id: &str) -> LedgerResult<Option<PaymentRecord>>;

    /// Update an existing payment record (status cache and outcome reporting)
    async fn update_payment(&mut self, payment: &PaymentRecord) -> LedgerResult<()>;

    /// All payment records against one structure, newest first
    async fn payments_for_structure(
        &self,
        structure_id: &str,
    ) -> LedgerResult<Vec<PaymentRecord>>;

    /// List payment records matching a filter, ordered by date descending
    ///
    /// The descending order is a contract: recent-transaction views rely
    /// on it.
    async fn list_payments(&self, filter: &PaymentFilter) -> LedgerResult<Vec<PaymentRecord>>;
}

/// Filter for payment record listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentFilter {
    /// Restrict to payments against structures of this subject
    pub subject_id: Option<String>,
    /// Restrict to payments against one structure
    pub structure_id: Option<String>,
    /// Restrict to records with this cached status
    pub status: Option<PaymentStatus>,
    /// Earliest payment date, inclusive
    pub from: Option<NaiveDate>,
    /// Latest payment date, inclusive
    pub to: Option<NaiveDate>,
}

impl PaymentFilter {
    /// Filter for one subject's payments
    pub fn for_subject(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: Some(subject_id.into()),
            ..Self::default()
        }
    }

    /// Filter for one structure's payments
    pub fn for_structure(structure_id: impl Into<String>) -> Self {
        Self {
            structure_id: Some(structure_id.into()),
            ..Self::default()
        }
    }

    /// Whether a record (with its structure's subject) matches the filter
    pub fn matches(&self, payment: &PaymentRecord, subject_id: &str) -> bool {
        if let Some(ref want) = self.subject_id {
            if want != subject_id {
                return false;
            }
        }
        if let Some(ref want) = self.structure_id {
            if *want != payment.structure_id {
                return false;
            }
        }
        if let Some(want) = self.status {
            if want != payment.status {
                return false;
            }
        }
        if let Some(from) = self.from {
            if payment.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if payment.date > to {
                return false;
            }
        }
        true
    }
}

/// Trait for implementing custom structure validation rules
pub trait StructureValidator: Send + Sync {
    /// Validate a structure before saving
    fn validate_structure(&self, structure: &Structure) -> LedgerResult<()>;
}

/// Trait for implementing custom payment validation rules
pub trait PaymentValidator: Send + Sync {
    /// Validate a payment record before saving
    fn validate_payment(&self, payment: &PaymentRecord) -> LedgerResult<()>;
}

/// Default structure validator with the required-component rules
pub struct DefaultStructureValidator;

impl StructureValidator for DefaultStructureValidator {
    fn validate_structure(&self, structure: &Structure) -> LedgerResult<()> {
        if structure.id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Structure id cannot be empty".to_string(),
            ));
        }

        if structure.subject_id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Subject id cannot be empty".to_string(),
            ));
        }

        let zero = BigDecimal::from(0);
        match &structure.components {
            Components::Fee(fee) => {
                for (name, amount) in [
                    ("tuition", &fee.tuition),
                    ("library", &fee.library),
                    ("exam", &fee.exam),
                    ("other", &fee.other),
                ] {
                    if *amount < zero {
                        return Err(LedgerError::Validation(format!(
                            "Fee component '{}' cannot be negative",
                            name
                        )));
                    }
                }
                if fee.tuition <= zero {
                    return Err(LedgerError::Validation(
                        "Fee structure requires a positive tuition component".to_string(),
                    ));
                }
            }
            Components::Salary(salary) => {
                for (name, amount) in [
                    ("base", &salary.base),
                    ("hra", &salary.hra),
                    ("da", &salary.da),
                    ("allowances", &salary.allowances),
                    ("deductions", &salary.deductions),
                ] {
                    if *amount < zero {
                        return Err(LedgerError::Validation(format!(
                            "Salary component '{}' cannot be negative",
                            name
                        )));
                    }
                }
                if salary.base <= zero {
                    return Err(LedgerError::Validation(
                        "Salary structure requires a positive base component".to_string(),
                    ));
                }
                if salary.deductions > salary.gross() {
                    return Err(LedgerError::Validation(
                        "Salary deductions cannot exceed gross earnings".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Default payment validator with the positive-amount rule
pub struct DefaultPaymentValidator;

impl PaymentValidator for DefaultPaymentValidator {
    fn validate_payment(&self, payment: &PaymentRecord) -> LedgerResult<()> {
        if payment.structure_id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Payment must reference a structure".to_string(),
            ));
        }

        if payment.amount <= BigDecimal::from(0) {
            return Err(LedgerError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
