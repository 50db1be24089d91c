//! In-memory case store.
//!
//! Backs the tests and the bundled server binary. DashMap entry locking
//! gives `update_with` its single-row transaction semantics: the mutator
//! runs while the entry's shard is held exclusively, so two racing updates
//! on the same case execute strictly one after the other.

use super::{CaseMutator, CaseStore};
use crate::case::{Case, CaseFilter, CaseId};
use crate::error::{CaseError, CaseResult};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

/// DashMap-backed store with per-case atomic updates.
#[derive(Default)]
pub struct MemoryCaseStore {
    cases: DashMap<CaseId, Case>,
}

impl MemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.cases.len()
    }
}

#[async_trait]
impl CaseStore for MemoryCaseStore {
    async fn get(&self, id: CaseId) -> CaseResult<Case> {
        self.cases
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(CaseError::NotFound(id))
    }

    async fn insert(&self, case: Case) -> CaseResult<()> {
        let id = case.id;
        if self.cases.insert(id, case).is_some() {
            return Err(CaseError::store(format!("duplicate case id: {id}")));
        }
        Ok(())
    }

    async fn update_with(&self, id: CaseId, mutator: CaseMutator) -> CaseResult<Case> {
        let mut entry = self.cases.get_mut(&id).ok_or(CaseError::NotFound(id))?;

        // Mutate a copy and commit only on success, so a failed validation
        // leaves the stored record untouched.
        let mut draft = entry.value().clone();
        mutator(&mut draft)?;
        draft.version += 1;
        draft.updated_at = Utc::now();

        *entry.value_mut() = draft.clone();
        Ok(draft)
    }

    async fn remove(&self, id: CaseId) -> CaseResult<Case> {
        self.cases
            .remove(&id)
            .map(|(_, case)| case)
            .ok_or(CaseError::NotFound(id))
    }

    async fn list(&self, filter: &CaseFilter) -> CaseResult<Vec<Case>> {
        let mut cases: Vec<Case> = self
            .cases
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        // Newest first, the order listings are consumed in.
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cases)
    }
}
