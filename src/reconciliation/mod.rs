//! Reconciliation engine: the single source of truth for what is owed,
//! what is paid, and the settlement status of every structure
//!
//! Settlement is always a pure re-aggregation over the full payment record
//! set. Nothing here depends on a previously cached value, so recomputing is
//! idempotent and order-independent no matter how concurrent writers
//! interleave.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::traits::*;
use crate::types::*;

/// Settle one structure against its payment records
///
/// Pure function: same structure, records, and `as_of` date always produce
/// an identical [`Summary`]. The `as_of` date only matters for the fee
/// overdue check.
pub fn settle(structure: &Structure, payments: &[PaymentRecord], as_of: NaiveDate) -> Summary {
    let zero = BigDecimal::from(0);
    let total_owed = structure.total();
    let total_paid: BigDecimal = payments
        .iter()
        .filter(|p| p.counts_toward_paid())
        .map(|p| &p.amount)
        .sum();

    let outstanding = &total_owed - &total_paid;
    let pending = if outstanding > zero {
        outstanding
    } else {
        zero.clone()
    };

    let status = match structure.kind() {
        StructureKind::Fee => fee_status(&total_paid, &pending, structure.due_date(), as_of),
        StructureKind::Salary => salary_status(&total_paid, &pending, payments),
    };

    Summary {
        structure_id: structure.id.clone(),
        subject_id: structure.subject_id.clone(),
        period: structure.period,
        kind: structure.kind(),
        total_owed,
        total_paid,
        pending,
        status,
    }
}

fn fee_status(
    total_paid: &BigDecimal,
    pending: &BigDecimal,
    due_date: Option<NaiveDate>,
    as_of: NaiveDate,
) -> PaymentStatus {
    let zero = BigDecimal::from(0);
    if *pending == zero && *total_paid > zero {
        PaymentStatus::Paid
    } else if *pending > zero && due_date.is_some_and(|due| as_of > due) {
        PaymentStatus::Overdue
    } else if *total_paid > zero {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

// Salary status follows the attempt outcomes, not the due-date clock.
fn salary_status(
    total_paid: &BigDecimal,
    pending: &BigDecimal,
    payments: &[PaymentRecord],
) -> PaymentStatus {
    let zero = BigDecimal::from(0);
    if !payments.is_empty()
        && payments
            .iter()
            .all(|p| p.status == PaymentStatus::Failed)
    {
        PaymentStatus::Failed
    } else if *pending == zero && *total_paid > zero {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Processing
    }
}

/// Per-subject statement: one summary row per period plus aggregate totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub subject_id: String,
    pub as_of: NaiveDate,
    /// One row per structure, ordered by period ascending
    pub rows: Vec<Summary>,
    pub total_owed: BigDecimal,
    pub total_paid: BigDecimal,
    pub total_pending: BigDecimal,
}

/// Reconciliation engine over a storage backend
pub struct ReconciliationEngine<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> ReconciliationEngine<S> {
    /// Create an engine over the given storage backend
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Summarize a structure as of today
    pub async fn summarize(&self, structure_id: &str) -> LedgerResult<Summary> {
        self.summarize_as_of(structure_id, today()).await
    }

    /// Summarize a structure as of an explicit date
    ///
    /// Deterministic: two calls with no intervening writes return identical
    /// summaries.
    pub async fn summarize_as_of(
        &self,
        structure_id: &str,
        as_of: NaiveDate,
    ) -> LedgerResult<Summary> {
        let structure = self.structure_required(structure_id).await?;
        let payments = self.store.payments_for_structure(structure_id).await?;
        Ok(settle(&structure, &payments, as_of))
    }

    /// Summarize and persist the settlement status onto the newest record
    pub async fn recompute(&mut self, structure_id: &str) -> LedgerResult<Summary> {
        self.recompute_as_of(structure_id, today()).await
    }

    /// `recompute` with an explicit as-of date
    ///
    /// Safe to re-run after partial failure and safe under concurrent
    /// writers: the summary is rebuilt from the full record set every time.
    pub async fn recompute_as_of(
        &mut self,
        structure_id: &str,
        as_of: NaiveDate,
    ) -> LedgerResult<Summary> {
        let structure = self.structure_required(structure_id).await?;
        let payments = self.store.payments_for_structure(structure_id).await?;
        let summary = settle(&structure, &payments, as_of);

        // The cached status lives on the newest fee record only. Salary
        // records keep their per-attempt outcome untouched.
        if structure.kind() == StructureKind::Fee {
            if let Some(newest) = payments.first() {
                if newest.status != summary.status {
                    let mut refreshed = newest.clone();
                    refreshed.status = summary.status;
                    refreshed.updated_at = chrono::Utc::now().naive_utc();
                    self.store.update_payment(&refreshed).await?;
                }
            }
        }

        debug!(
            structure = structure_id,
            status = ?summary.status,
            pending = %summary.pending,
            "recomputed settlement"
        );

        Ok(summary)
    }

    /// One summary per structure of a subject, ordered by period ascending
    ///
    /// Each element is independent; no running balance is carried across
    /// periods.
    pub async fn summarize_all(&self, subject_id: &str) -> LedgerResult<Vec<Summary>> {
        self.summarize_all_as_of(subject_id, today()).await
    }

    /// `summarize_all` with an explicit as-of date
    pub async fn summarize_all_as_of(
        &self,
        subject_id: &str,
        as_of: NaiveDate,
    ) -> LedgerResult<Vec<Summary>> {
        let mut structures = self.store.list_structures(Some(subject_id), None).await?;
        structures.sort_by_key(|s| s.period);

        let mut summaries = Vec::with_capacity(structures.len());
        for structure in &structures {
            let payments = self.store.payments_for_structure(&structure.id).await?;
            summaries.push(settle(structure, &payments, as_of));
        }
        Ok(summaries)
    }

    /// Build the full statement for a subject as of today
    pub async fn statement(&self, subject_id: &str) -> LedgerResult<Statement> {
        self.statement_as_of(subject_id, today()).await
    }

    /// Build the full statement for a subject as of an explicit date
    pub async fn statement_as_of(
        &self,
        subject_id: &str,
        as_of: NaiveDate,
    ) -> LedgerResult<Statement> {
        let rows = self.summarize_all_as_of(subject_id, as_of).await?;

        let total_owed: BigDecimal = rows.iter().map(|s| &s.total_owed).sum();
        let total_paid: BigDecimal = rows.iter().map(|s| &s.total_paid).sum();
        let total_pending: BigDecimal = rows.iter().map(|s| &s.pending).sum();

        Ok(Statement {
            subject_id: subject_id.to_string(),
            as_of,
            rows,
            total_owed,
            total_paid,
            total_pending,
        })
    }

    async fn structure_required(&self, structure_id: &str) -> LedgerResult<Structure> {
        self.store
            .get_structure(structure_id)
            .await?
            .ok_or_else(|| LedgerError::StructureNotFound(structure_id.to_string()))
    }
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee_structure(due_date: NaiveDate) -> Structure {
        Structure::new(
            "fee-cs-1".to_string(),
            "course-cs".to_string(),
            Period::Semester(1),
            Components::Fee(FeeComponents {
                tuition: BigDecimal::from(60000),
                library: BigDecimal::from(5000),
                exam: BigDecimal::from(3000),
                other: BigDecimal::from(7000),
                due_date,
            }),
        )
    }

    fn salary_structure() -> Structure {
        Structure::new(
            "sal-f42-2024-06".to_string(),
            "faculty-42".to_string(),
            Period::Month {
                year: 2024,
                month: 6,
            },
            Components::Salary(SalaryComponents {
                base: BigDecimal::from(40000),
                hra: BigDecimal::from(8000),
                da: BigDecimal::from(4000),
                allowances: BigDecimal::from(2000),
                deductions: BigDecimal::from(3000),
            }),
        )
    }

    fn payment(structure: &Structure, amount: i64, status: PaymentStatus) -> PaymentRecord {
        PaymentRecord::new(
            structure.id.clone(),
            BigDecimal::from(amount),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            PaymentMode::Online,
            status,
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fee_total_is_component_sum() {
        let structure = fee_structure(date(2024, 7, 31));
        assert_eq!(structure.total(), BigDecimal::from(75000));
    }

    #[test]
    fn salary_net_is_signed_component_sum() {
        let structure = salary_structure();
        assert_eq!(structure.total(), BigDecimal::from(51000));
    }

    #[test]
    fn unpaid_fee_is_pending_before_due_date() {
        let structure = fee_structure(date(2024, 7, 31));
        let summary = settle(&structure, &[], date(2024, 7, 1));
        assert_eq!(summary.status, PaymentStatus::Pending);
        assert_eq!(summary.pending, BigDecimal::from(75000));
        assert_eq!(summary.total_paid, BigDecimal::from(0));
    }

    #[test]
    fn exact_payment_settles_fee() {
        let structure = fee_structure(date(2024, 7, 31));
        let payments = vec![payment(&structure, 75000, PaymentStatus::Pending)];
        let summary = settle(&structure, &payments, date(2024, 7, 1));
        assert_eq!(summary.status, PaymentStatus::Paid);
        assert_eq!(summary.pending, BigDecimal::from(0));
    }

    #[test]
    fn partial_payments_accumulate() {
        let structure = fee_structure(date(2024, 7, 31));
        let payments = vec![
            payment(&structure, 30000, PaymentStatus::Pending),
            payment(&structure, 20000, PaymentStatus::Partial),
        ];
        let summary = settle(&structure, &payments, date(2024, 7, 1));
        assert_eq!(summary.status, PaymentStatus::Partial);
        assert_eq!(summary.total_paid, BigDecimal::from(50000));
        assert_eq!(summary.pending, BigDecimal::from(25000));
    }

    #[test]
    fn fee_goes_overdue_after_due_date() {
        let structure = fee_structure(date(2024, 7, 31));
        let payments = vec![payment(&structure, 30000, PaymentStatus::Partial)];

        // Still owing on the due date itself: not yet overdue.
        let on_due = settle(&structure, &payments, date(2024, 7, 31));
        assert_eq!(on_due.status, PaymentStatus::Partial);

        let past_due = settle(&structure, &payments, date(2024, 8, 1));
        assert_eq!(past_due.status, PaymentStatus::Overdue);
    }

    #[test]
    fn overdue_clears_once_fully_paid() {
        let structure = fee_structure(date(2024, 7, 31));
        let payments = vec![
            payment(&structure, 30000, PaymentStatus::Overdue),
            payment(&structure, 45000, PaymentStatus::Pending),
        ];
        let summary = settle(&structure, &payments, date(2024, 9, 1));
        assert_eq!(summary.status, PaymentStatus::Paid);
        assert_eq!(summary.pending, BigDecimal::from(0));
    }

    #[test]
    fn overpayment_never_reports_negative_pending() {
        let structure = fee_structure(date(2024, 7, 31));
        let payments = vec![
            payment(&structure, 40000, PaymentStatus::Partial),
            payment(&structure, 40000, PaymentStatus::Partial),
        ];
        let summary = settle(&structure, &payments, date(2024, 7, 1));
        assert_eq!(summary.total_paid, BigDecimal::from(80000));
        assert_eq!(summary.pending, BigDecimal::from(0));
        assert_eq!(summary.status, PaymentStatus::Paid);
    }

    #[test]
    fn settle_is_deterministic() {
        let structure = fee_structure(date(2024, 7, 31));
        let payments = vec![payment(&structure, 30000, PaymentStatus::Partial)];
        let first = settle(&structure, &payments, date(2024, 7, 1));
        let second = settle(&structure, &payments, date(2024, 7, 1));
        assert_eq!(first, second);
    }

    #[test]
    fn unpaid_salary_is_processing() {
        let structure = salary_structure();
        let summary = settle(&structure, &[], date(2024, 7, 1));
        assert_eq!(summary.status, PaymentStatus::Processing);
        assert_eq!(summary.pending, BigDecimal::from(51000));
    }

    #[test]
    fn settled_disbursement_pays_salary() {
        let structure = salary_structure();
        let payments = vec![payment(&structure, 51000, PaymentStatus::Paid)];
        let summary = settle(&structure, &payments, date(2024, 7, 1));
        assert_eq!(summary.status, PaymentStatus::Paid);
        assert_eq!(summary.pending, BigDecimal::from(0));
    }

    #[test]
    fn failed_disbursements_do_not_count_as_paid() {
        let structure = salary_structure();
        let payments = vec![payment(&structure, 51000, PaymentStatus::Failed)];
        let summary = settle(&structure, &payments, date(2024, 7, 1));
        assert_eq!(summary.status, PaymentStatus::Failed);
        assert_eq!(summary.total_paid, BigDecimal::from(0));
        assert_eq!(summary.pending, BigDecimal::from(51000));
    }

    #[test]
    fn retried_disbursement_after_failure_is_processing() {
        let structure = salary_structure();
        let payments = vec![
            payment(&structure, 51000, PaymentStatus::Failed),
            payment(&structure, 25000, PaymentStatus::Processing),
        ];
        let summary = settle(&structure, &payments, date(2024, 7, 1));
        assert_eq!(summary.status, PaymentStatus::Processing);
        assert_eq!(summary.total_paid, BigDecimal::from(25000));
    }

    #[test]
    fn salary_never_goes_overdue() {
        let structure = salary_structure();
        // Far in the future; salaries have no due-date clock.
        let summary = settle(&structure, &[], date(2030, 1, 1));
        assert_eq!(summary.status, PaymentStatus::Processing);
    }
}
