//! In-memory storage implementation for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Cloned handles share the same underlying maps, so several ledger
/// components (or concurrent tasks) observe one consistent store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    structures: Arc<RwLock<HashMap<String, Structure>>>,
    payments: Arc<RwLock<HashMap<String, PaymentRecord>>>,
}

impl MemoryStore {
    /// Create a new memory store instance
    pub fn new() -> Self {
        Self {
            structures: Arc::new(RwLock::new(HashMap::new())),
            payments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.structures.write().unwrap().clear();
        self.payments.write().unwrap().clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn save_structure(&mut self, structure: &Structure) -> LedgerResult<()> {
        self.structures
            .write()
            .unwrap()
            .insert(structure.id.clone(), structure.clone());
        Ok(())
    }

    async fn get_structure(&self, structure_id: &str) -> LedgerResult<Option<Structure>> {
        Ok(self.structures.read().unwrap().get(structure_id).cloned())
    }

    async fn find_structure(
        &self,
        subject_id: &str,
        period: Period,
    ) -> LedgerResult<Option<Structure>> {
        // Superseded versions stay on disk but no longer answer lookups.
        Ok(self
            .structures
            .read()
            .unwrap()
            .values()
            .find(|s| s.subject_id == subject_id && s.period == period && s.active)
            .cloned())
    }

    async fn list_structures(
        &self,
        subject_id: Option<&str>,
        kind: Option<StructureKind>,
    ) -> LedgerResult<Vec<Structure>> {
        let structures = self.structures.read().unwrap();
        let mut filtered: Vec<Structure> = structures
            .values()
            .filter(|s| {
                subject_id.is_none_or(|subject| s.subject_id == subject)
                    && kind.is_none_or(|k| s.kind() == k)
            })
            .cloned()
            .collect();
        filtered.sort_by(|a, b| {
            a.period
                .cmp(&b.period)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(filtered)
    }

    async fn update_structure(&mut self, structure: &Structure) -> LedgerResult<()> {
        if self.structures.read().unwrap().contains_key(&structure.id) {
            self.structures
                .write()
                .unwrap()
                .insert(structure.id.clone(), structure.clone());
            Ok(())
        } else {
            Err(LedgerError::StructureNotFound(structure.id.clone()))
        }
    }

    async fn delete_structure(&mut self, structure_id: &str) -> LedgerResult<()> {
        if self
            .structures
            .write()
            .unwrap()
            .remove(structure_id)
            .is_some()
        {
            Ok(())
        } else {
            Err(LedgerError::StructureNotFound(structure_id.to_string()))
        }
    }

    async fn save_payment(&mut self, payment: &PaymentRecord) -> LedgerResult<()> {
        self.payments
            .write()
            .unwrap()
            .insert(payment.id.clone(), payment.clone());
        Ok(())
    }

    async fn get_payment(&self, payment_id: &str) -> LedgerResult<Option<PaymentRecord>> {
        Ok(self.payments.read().unwrap().get(payment_id).cloned())
    }

    async fn update_payment(&mut self, payment: &PaymentRecord) -> LedgerResult<()> {
        if self.payments.read().unwrap().contains_key(&payment.id) {
            self.payments
                .write()
                .unwrap()
                .insert(payment.id.clone(), payment.clone());
            Ok(())
        } else {
            Err(LedgerError::PaymentNotFound(payment.id.clone()))
        }
    }

    async fn payments_for_structure(
        &self,
        structure_id: &str,
    ) -> LedgerResult<Vec<PaymentRecord>> {
        let payments = self.payments.read().unwrap();
        let mut filtered: Vec<PaymentRecord> = payments
            .values()
            .filter(|p| p.structure_id == structure_id)
            .cloned()
            .collect();
        filtered.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(filtered)
    }

    async fn list_payments(&self, filter: &PaymentFilter) -> LedgerResult<Vec<PaymentRecord>> {
        let structures = self.structures.read().unwrap();
        let payments = self.payments.read().unwrap();

        let mut filtered: Vec<PaymentRecord> = payments
            .values()
            .filter(|p| {
                let subject = structures
                    .get(&p.structure_id)
                    .map(|s| s.subject_id.as_str())
                    .unwrap_or("");
                filter.matches(p, subject)
            })
            .cloned()
            .collect();

        // Date-descending order is part of the listing contract.
        filtered.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(filtered)
    }
}
