//! Main ledger facade that coordinates structures, payments and settlement

use chrono::NaiveDate;

use crate::ledger::{PaymentDraft, PaymentLedger, StructureCatalog};
use crate::reconciliation::{ReconciliationEngine, Statement};
use crate::traits::*;
use crate::types::*;

/// Main ledger system coordinating all fee and payroll operations
pub struct Ledger<S: LedgerStore> {
    catalog: StructureCatalog<S>,
    payments: PaymentLedger<S>,
    engine: ReconciliationEngine<S>,
}

impl<S: LedgerStore + Clone> Ledger<S> {
    /// Create a new ledger with the given storage backend
    pub fn new(store: S) -> Self {
        Self {
            catalog: StructureCatalog::new(store.clone()),
            payments: PaymentLedger::new(store.clone()),
            engine: ReconciliationEngine::new(store),
        }
    }

    /// Create a new ledger with custom validators
    pub fn with_validators(
        store: S,
        structure_validator: Box<dyn StructureValidator>,
        payment_validator: Box<dyn PaymentValidator>,
    ) -> Self {
        Self {
            catalog: StructureCatalog::with_validator(store.clone(), structure_validator),
            payments: PaymentLedger::with_validator(store.clone(), payment_validator),
            engine: ReconciliationEngine::new(store),
        }
    }

    // Structure operations
    /// Create a new fee or salary structure
    pub async fn create_structure(
        &mut self,
        id: String,
        subject_id: String,
        period: Period,
        components: Components,
    ) -> LedgerResult<Structure> {
        self.catalog
            .create_structure(id, subject_id, period, components)
            .await
    }

    /// Replace the active salary structure of a subject with a new version
    pub async fn supersede_structure(
        &mut self,
        subject_id: String,
        period: Period,
        components: Components,
    ) -> LedgerResult<Structure> {
        self.catalog
            .supersede_structure(subject_id, period, components)
            .await
    }

    /// Merge a component patch into an unreferenced structure
    pub async fn update_structure(
        &mut self,
        structure_id: &str,
        patch: ComponentPatch,
    ) -> LedgerResult<Structure> {
        self.catalog.update_structure(structure_id, patch).await
    }

    /// Get the structure for a subject and period
    pub async fn get_structure(
        &self,
        subject_id: &str,
        period: Period,
    ) -> LedgerResult<Option<Structure>> {
        self.catalog.get_structure(subject_id, period).await
    }

    /// Delete a structure that no payment references yet
    pub async fn delete_structure(&mut self, structure_id: &str) -> LedgerResult<()> {
        self.catalog.delete_structure(structure_id).await
    }

    /// List all structures of a subject
    pub async fn list_structures(&self, subject_id: &str) -> LedgerResult<Vec<Structure>> {
        self.catalog.list_structures(subject_id).await
    }

    /// List all structures of one kind across subjects
    pub async fn list_structures_by_kind(
        &self,
        kind: StructureKind,
    ) -> LedgerResult<Vec<Structure>> {
        self.catalog.list_structures_by_kind(kind).await
    }

    /// The active salary structure of a subject, if any
    pub async fn active_salary_structure(
        &self,
        subject_id: &str,
    ) -> LedgerResult<Option<Structure>> {
        self.catalog.active_salary_structure(subject_id).await
    }

    // Payment operations
    /// Record a payment against a structure
    pub async fn record_payment(
        &mut self,
        structure_id: &str,
        draft: PaymentDraft,
    ) -> LedgerResult<PaymentRecord> {
        self.payments.record_payment(structure_id, draft).await
    }

    /// Record a salary disbursement with the channel-reported outcome
    pub async fn record_disbursement(
        &mut self,
        structure_id: &str,
        draft: PaymentDraft,
        outcome: DisbursementOutcome,
    ) -> LedgerResult<PaymentRecord> {
        self.payments
            .record_disbursement(structure_id, draft, outcome)
            .await
    }

    /// Resolve an in-flight salary disbursement
    pub async fn report_outcome(
        &mut self,
        payment_id: &str,
        outcome: DisbursementOutcome,
    ) -> LedgerResult<PaymentRecord> {
        self.payments.report_outcome(payment_id, outcome).await
    }

    /// List payment records matching a filter, newest first
    pub async fn list_payments(&self, filter: &PaymentFilter) -> LedgerResult<Vec<PaymentRecord>> {
        self.payments.list_payments(filter).await
    }

    /// Get a payment record by id
    pub async fn get_payment(&self, payment_id: &str) -> LedgerResult<Option<PaymentRecord>> {
        self.payments.get_payment(payment_id).await
    }

    // Settlement operations
    /// Summarize a structure as of today
    pub async fn summarize(&self, structure_id: &str) -> LedgerResult<Summary> {
        self.engine.summarize(structure_id).await
    }

    /// Summarize a structure as of an explicit date
    pub async fn summarize_as_of(
        &self,
        structure_id: &str,
        as_of: NaiveDate,
    ) -> LedgerResult<Summary> {
        self.engine.summarize_as_of(structure_id, as_of).await
    }

    /// Summarize and persist the cached settlement status
    pub async fn recompute(&mut self, structure_id: &str) -> LedgerResult<Summary> {
        self.engine.recompute(structure_id).await
    }

    /// One summary per period for a subject, ordered by period ascending
    pub async fn summarize_all(&self, subject_id: &str) -> LedgerResult<Vec<Summary>> {
        self.engine.summarize_all(subject_id).await
    }

    /// `summarize_all` with an explicit as-of date
    pub async fn summarize_all_as_of(
        &self,
        subject_id: &str,
        as_of: NaiveDate,
    ) -> LedgerResult<Vec<Summary>> {
        self.engine.summarize_all_as_of(subject_id, as_of).await
    }

    /// Build the full statement for a subject as of today
    pub async fn statement(&self, subject_id: &str) -> LedgerResult<Statement> {
        self.engine.statement(subject_id).await
    }

    /// Build the full statement for a subject as of an explicit date
    pub async fn statement_as_of(
        &self,
        subject_id: &str,
        as_of: NaiveDate,
    ) -> LedgerResult<Statement> {
        self.engine.statement_as_of(subject_id, as_of).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_store::MemoryStore;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn fee_components(due: NaiveDate) -> Components {
        Components::Fee(FeeComponents {
            tuition: BigDecimal::from(60000),
            library: BigDecimal::from(5000),
            exam: BigDecimal::from(3000),
            other: BigDecimal::from(7000),
            due_date: due,
        })
    }

    #[tokio::test]
    async fn test_fee_collection_flow() {
        let store = MemoryStore::new();
        let mut ledger = Ledger::new(store);

        let due = NaiveDate::from_ymd_opt(2024, 7, 31).unwrap();
        let structure = ledger
            .create_structure(
                "fee-cs-1".to_string(),
                "course-cs".to_string(),
                Period::Semester(1),
                fee_components(due),
            )
            .await
            .unwrap();

        assert_eq!(structure.total(), BigDecimal::from(75000));

        let draft = PaymentDraft::new(
            BigDecimal::from(30000),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            PaymentMode::Online,
        )
        .transaction_id("TXN-1001");
        let first = ledger.record_payment(&structure.id, draft).await.unwrap();
        assert_eq!(first.status, PaymentStatus::Partial);

        let draft = PaymentDraft::new(
            BigDecimal::from(45000),
            NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            PaymentMode::Cash,
        );
        let second = ledger.record_payment(&structure.id, draft).await.unwrap();
        assert_eq!(second.status, PaymentStatus::Paid);

        let summary = ledger.summarize(&structure.id).await.unwrap();
        assert_eq!(summary.total_paid, BigDecimal::from(75000));
        assert_eq!(summary.pending, BigDecimal::from(0));
        assert_eq!(summary.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_payment_against_unknown_structure_is_rejected() {
        let store = MemoryStore::new();
        let mut ledger = Ledger::new(store);

        let draft = PaymentDraft::new(
            BigDecimal::from(1000),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            PaymentMode::Cash,
        );
        let err = ledger.record_payment("missing", draft).await.unwrap_err();
        assert!(matches!(err, LedgerError::StructureNotFound(_)));

        let records = ledger
            .list_payments(&PaymentFilter::default())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_update_is_frozen_after_first_payment() {
        let store = MemoryStore::new();
        let mut ledger = Ledger::new(store);

        let due = NaiveDate::from_ymd_opt(2024, 7, 31).unwrap();
        let structure = ledger
            .create_structure(
                "fee-me-2".to_string(),
                "course-me".to_string(),
                Period::Semester(2),
                fee_components(due),
            )
            .await
            .unwrap();

        // Editable while unreferenced.
        let patch = ComponentPatch::Fee(FeePatch {
            library: Some(BigDecimal::from(6000)),
            ..FeePatch::default()
        });
        let updated = ledger.update_structure(&structure.id, patch).await.unwrap();
        assert_eq!(updated.total(), BigDecimal::from(76000));

        let draft = PaymentDraft::new(
            BigDecimal::from(1000),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            PaymentMode::Cheque,
        );
        ledger.record_payment(&structure.id, draft).await.unwrap();

        let patch = ComponentPatch::Fee(FeePatch {
            exam: Some(BigDecimal::from(4000)),
            ..FeePatch::default()
        });
        let err = ledger
            .update_structure(&structure.id, patch)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }
}
