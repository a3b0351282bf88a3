//! Structure catalog: what each subject owes, per period

use tracing::debug;
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// Catalog of fee and salary structures
///
/// Guarantees one structure per (subject, period), at most one active salary
/// structure per subject, and freezes a structure once payments reference it.
pub struct StructureCatalog<S: LedgerStore> {
    pub(crate) store: S,
    validator: Box<dyn StructureValidator>,
}

impl<S: LedgerStore> StructureCatalog<S> {
    /// Create a new catalog
    pub fn new(store: S) -> Self {
        Self {
            store,
            validator: Box::new(DefaultStructureValidator),
        }
    }

    /// Create a new catalog with a custom validator
    pub fn with_validator(store: S, validator: Box<dyn StructureValidator>) -> Self {
        Self { store, validator }
    }

    /// Create a new structure
    ///
    /// Fails with [`LedgerError::Conflict`] when a structure already covers
    /// the (subject, period), or when a salary structure would become the
    /// subject's second active one. Salary revision goes through
    /// [`StructureCatalog::supersede_structure`] instead.
    pub async fn create_structure(
        &mut self,
        id: String,
        subject_id: String,
        period: Period,
        components: Components,
    ) -> LedgerResult<Structure> {
        let structure = Structure::new(id, subject_id, period, components);
        self.validator.validate_structure(&structure)?;

        if self.store.get_structure(&structure.id).await?.is_some() {
            return Err(LedgerError::Conflict(format!(
                "Structure with id '{}' already exists",
                structure.id
            )));
        }

        if self
            .store
            .find_structure(&structure.subject_id, structure.period)
            .await?
            .is_some()
        {
            return Err(LedgerError::Conflict(format!(
                "Subject '{}' already has a structure for {}",
                structure.subject_id, structure.period
            )));
        }

        if structure.kind() == StructureKind::Salary {
            self.reject_second_active_salary(&structure.subject_id)
                .await?;
        }

        self.store.save_structure(&structure).await?;
        debug!(
            structure = %structure.id,
            subject = %structure.subject_id,
            total = %structure.total(),
            "created structure"
        );

        Ok(structure)
    }

    /// Replace the active salary structure of a subject with a new version
    ///
    /// The old version is deactivated, not mutated: its payment records stay
    /// bound to its id, so historical summaries never shift. The new version
    /// gets a generated id.
    pub async fn supersede_structure(
        &mut self,
        subject_id: String,
        period: Period,
        components: Components,
    ) -> LedgerResult<Structure> {
        if components.kind() != StructureKind::Salary {
            return Err(LedgerError::Validation(
                "Only salary structures are versioned; edit fee structures before payments"
                    .to_string(),
            ));
        }

        let replacement = Structure::new(
            Uuid::new_v4().to_string(),
            subject_id,
            period,
            components,
        );
        self.validator.validate_structure(&replacement)?;

        if let Some(mut active) = self.active_salary_structure(&replacement.subject_id).await? {
            active.active = false;
            active.updated_at = chrono::Utc::now().naive_utc();
            self.store.update_structure(&active).await?;
            debug!(
                superseded = %active.id,
                replacement = %replacement.id,
                "deactivated prior salary structure"
            );
        }

        self.store.save_structure(&replacement).await?;
        Ok(replacement)
    }

    /// Merge a component patch into a structure and persist it
    ///
    /// The derived total follows automatically because totals are never
    /// stored. Fails with [`LedgerError::StructureNotFound`] for an unknown
    /// id, and with [`LedgerError::Conflict`] once payments reference the
    /// structure: referenced structures are immutable, revision must create
    /// a new version.
    pub async fn update_structure(
        &mut self,
        structure_id: &str,
        patch: ComponentPatch,
    ) -> LedgerResult<Structure> {
        let mut structure = self.get_structure_required(structure_id).await?;

        let payments = self.store.payments_for_structure(structure_id).await?;
        if !payments.is_empty() {
            return Err(LedgerError::Conflict(format!(
                "Structure '{}' is referenced by {} payment(s) and can no longer be edited",
                structure_id,
                payments.len()
            )));
        }

        structure.components.apply(patch)?;
        structure.updated_at = chrono::Utc::now().naive_utc();
        self.validator.validate_structure(&structure)?;

        self.store.update_structure(&structure).await?;
        debug!(structure = %structure.id, total = %structure.total(), "updated structure");

        Ok(structure)
    }

    /// Get the structure for a subject and period
    pub async fn get_structure(
        &self,
        subject_id: &str,
        period: Period,
    ) -> LedgerResult<Option<Structure>> {
        self.store.find_structure(subject_id, period).await
    }

    /// Get a structure by id, failing when it does not exist
    pub async fn get_structure_required(&self, structure_id: &str) -> LedgerResult<Structure> {
        self.store
            .get_structure(structure_id)
            .await?
            .ok_or_else(|| LedgerError::StructureNotFound(structure_id.to_string()))
    }

    /// Delete a structure that no payment references yet
    ///
    /// Referenced structures are part of the audit trail and cannot be
    /// removed.
    pub async fn delete_structure(&mut self, structure_id: &str) -> LedgerResult<()> {
        self.get_structure_required(structure_id).await?;

        let payments = self.store.payments_for_structure(structure_id).await?;
        if !payments.is_empty() {
            return Err(LedgerError::Conflict(format!(
                "Structure '{}' is referenced by {} payment(s) and cannot be deleted",
                structure_id,
                payments.len()
            )));
        }

        self.store.delete_structure(structure_id).await?;
        debug!(structure = structure_id, "deleted structure");
        Ok(())
    }

    /// List all structures of a subject
    pub async fn list_structures(&self, subject_id: &str) -> LedgerResult<Vec<Structure>> {
        self.store.list_structures(Some(subject_id), None).await
    }

    /// List all structures of one kind across subjects
    pub async fn list_structures_by_kind(
        &self,
        kind: StructureKind,
    ) -> LedgerResult<Vec<Structure>> {
        self.store.list_structures(None, Some(kind)).await
    }

    /// The active salary structure of a subject, if any
    pub async fn active_salary_structure(
        &self,
        subject_id: &str,
    ) -> LedgerResult<Option<Structure>> {
        let salaries = self
            .store
            .list_structures(Some(subject_id), Some(StructureKind::Salary))
            .await?;
        Ok(salaries.into_iter().find(|s| s.active))
    }

    async fn reject_second_active_salary(&self, subject_id: &str) -> LedgerResult<()> {
        if let Some(active) = self.active_salary_structure(subject_id).await? {
            return Err(LedgerError::Conflict(format!(
                "Subject '{}' already has an active salary structure '{}'; supersede it instead",
                subject_id, active.id
            )));
        }
        Ok(())
    }
}
