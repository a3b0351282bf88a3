//! Validation utilities

use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> LedgerResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(LedgerError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a subject or structure id is well formed
pub fn validate_id(id: &str) -> LedgerResult<()> {
    if id.trim().is_empty() {
        return Err(LedgerError::Validation("Id cannot be empty".to_string()));
    }

    if id.len() > 64 {
        return Err(LedgerError::Validation(
            "Id cannot exceed 64 characters".to_string(),
        ));
    }

    // Alphanumeric plus dashes and underscores keeps ids URL- and key-safe.
    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LedgerError::Validation(
            "Id can only contain alphanumeric characters, dashes, and underscores".to_string(),
        ));
    }

    Ok(())
}

/// Validate payment remarks length
pub fn validate_remarks(remarks: &str) -> LedgerResult<()> {
    if remarks.len() > 500 {
        return Err(LedgerError::Validation(
            "Remarks cannot exceed 500 characters".to_string(),
        ));
    }
    Ok(())
}

/// Enhanced structure validator with id checks on top of the default rules
pub struct EnhancedStructureValidator;

impl StructureValidator for EnhancedStructureValidator {
    fn validate_structure(&self, structure: &Structure) -> LedgerResult<()> {
        validate_id(&structure.id)?;
        validate_id(&structure.subject_id)?;
        DefaultStructureValidator.validate_structure(structure)
    }
}

/// Enhanced payment validator with reference and remark checks
pub struct EnhancedPaymentValidator;

impl PaymentValidator for EnhancedPaymentValidator {
    fn validate_payment(&self, payment: &PaymentRecord) -> LedgerResult<()> {
        DefaultPaymentValidator.validate_payment(payment)?;
        validate_positive_amount(&payment.amount)?;

        if let Some(ref remarks) = payment.remarks {
            validate_remarks(remarks)?;
        }

        if let Some(ref transaction_id) = payment.transaction_id {
            if transaction_id.trim().is_empty() {
                return Err(LedgerError::Validation(
                    "Transaction id cannot be blank when provided".to_string(),
                ));
            }
        }

        Ok(())
    }
}
