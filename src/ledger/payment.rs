//! Payment ledger: append-only payment records against structures

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::debug;

use crate::reconciliation::ReconciliationEngine;
use crate::traits::*;
use crate::types::*;

/// Draft of a payment, built up before recording
///
/// Corrections are new compensating records, never edits, so the draft is
/// the only place payment fields are assembled.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    amount: BigDecimal,
    date: NaiveDate,
    mode: PaymentMode,
    transaction_id: Option<String>,
    remarks: Option<String>,
}

impl PaymentDraft {
    /// Start a draft with the required fields
    pub fn new(amount: BigDecimal, date: NaiveDate, mode: PaymentMode) -> Self {
        Self {
            amount,
            date,
            mode,
            transaction_id: None,
            remarks: None,
        }
    }

    /// Attach an external transaction reference
    pub fn transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    /// Attach free-form remarks
    pub fn remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    fn into_record(self, structure_id: String, status: PaymentStatus) -> PaymentRecord {
        let mut record = PaymentRecord::new(structure_id, self.amount, self.date, self.mode, status);
        record.transaction_id = self.transaction_id;
        record.remarks = self.remarks;
        record
    }
}

/// Payment ledger over a storage backend
///
/// Every successful append triggers a settlement recompute so list views
/// can read the cached status without re-summing.
pub struct PaymentLedger<S: LedgerStore> {
    store: S,
    engine: ReconciliationEngine<S>,
    validator: Box<dyn PaymentValidator>,
}

impl<S: LedgerStore + Clone> PaymentLedger<S> {
    /// Create a new payment ledger
    pub fn new(store: S) -> Self {
        Self {
            engine: ReconciliationEngine::new(store.clone()),
            store,
            validator: Box::new(DefaultPaymentValidator),
        }
    }

    /// Create a new payment ledger with a custom validator
    pub fn with_validator(store: S, validator: Box<dyn PaymentValidator>) -> Self {
        Self {
            engine: ReconciliationEngine::new(store.clone()),
            store,
            validator,
        }
    }

    /// Record a payment against a structure
    ///
    /// Fails with [`LedgerError::StructureNotFound`] when the structure does
    /// not resolve; nothing is stored in that case. On success the record is
    /// persisted and the cached settlement status refreshed.
    pub async fn record_payment(
        &mut self,
        structure_id: &str,
        draft: PaymentDraft,
    ) -> LedgerResult<PaymentRecord> {
        let structure = self.structure_required(structure_id).await?;

        // Fee records start Pending and pick up the aggregate from the
        // recompute below; salary records start as in-flight attempts.
        let initial = match structure.kind() {
            StructureKind::Fee => PaymentStatus::Pending,
            StructureKind::Salary => PaymentStatus::Processing,
        };

        self.append(structure, draft, initial).await
    }

    /// Record a salary disbursement attempt with the channel-reported outcome
    ///
    /// The core does not talk to the disbursement channel; it records
    /// whatever outcome the caller reports. Fails with
    /// [`LedgerError::Validation`] against a fee structure.
    pub async fn record_disbursement(
        &mut self,
        structure_id: &str,
        draft: PaymentDraft,
        outcome: DisbursementOutcome,
    ) -> LedgerResult<PaymentRecord> {
        let structure = self.structure_required(structure_id).await?;

        if structure.kind() != StructureKind::Salary {
            return Err(LedgerError::Validation(format!(
                "Structure '{}' is a fee structure; disbursement outcomes apply to salaries",
                structure_id
            )));
        }

        self.append(structure, draft, status_for(outcome)).await
    }

    /// Resolve an in-flight salary disbursement
    ///
    /// Moves `Processing` to `Paid` or `Failed` per the reported outcome.
    /// Fails with [`LedgerError::Conflict`] when the record was already
    /// resolved.
    pub async fn report_outcome(
        &mut self,
        payment_id: &str,
        outcome: DisbursementOutcome,
    ) -> LedgerResult<PaymentRecord> {
        let mut record = self
            .store
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| LedgerError::PaymentNotFound(payment_id.to_string()))?;

        let structure = self.structure_required(&record.structure_id).await?;
        if structure.kind() != StructureKind::Salary {
            return Err(LedgerError::Validation(format!(
                "Payment '{}' is a fee payment; outcomes apply to salary disbursements",
                payment_id
            )));
        }

        if record.status != PaymentStatus::Processing {
            return Err(LedgerError::Conflict(format!(
                "Disbursement '{}' is already resolved as {:?}",
                payment_id, record.status
            )));
        }

        record.status = status_for(outcome);
        record.updated_at = chrono::Utc::now().naive_utc();
        self.store.update_payment(&record).await?;
        debug!(payment = %record.id, status = ?record.status, "resolved disbursement");

        Ok(record)
    }

    /// List payment records matching a filter, newest first
    pub async fn list_payments(&self, filter: &PaymentFilter) -> LedgerResult<Vec<PaymentRecord>> {
        self.store.list_payments(filter).await
    }

    /// Get a payment record by id
    pub async fn get_payment(&self, payment_id: &str) -> LedgerResult<Option<PaymentRecord>> {
        self.store.get_payment(payment_id).await
    }

    async fn append(
        &mut self,
        structure: Structure,
        draft: PaymentDraft,
        initial: PaymentStatus,
    ) -> LedgerResult<PaymentRecord> {
        let record = draft.into_record(structure.id.clone(), initial);
        self.validator.validate_payment(&record)?;

        self.store.save_payment(&record).await?;
        debug!(
            payment = %record.id,
            structure = %structure.id,
            amount = %record.amount,
            "recorded payment"
        );

        self.engine.recompute(&structure.id).await?;

        // Return the stored record so the caller sees the refreshed cache.
        Ok(self
            .store
            .get_payment(&record.id)
            .await?
            .unwrap_or(record))
    }

    async fn structure_required(&self, structure_id: &str) -> LedgerResult<Structure> {
        self.store
            .get_structure(structure_id)
            .await?
            .ok_or_else(|| LedgerError::StructureNotFound(structure_id.to_string()))
    }
}

fn status_for(outcome: DisbursementOutcome) -> PaymentStatus {
    match outcome {
        DisbursementOutcome::Settled => PaymentStatus::Paid,
        DisbursementOutcome::Failed => PaymentStatus::Failed,
        DisbursementOutcome::InFlight => PaymentStatus::Processing,
    }
}
