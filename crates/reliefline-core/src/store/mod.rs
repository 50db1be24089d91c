//! Storage seam for case records.
//!
//! The durable store is an external collaborator; the core only specifies
//! the interface it mutates through. The one hard requirement is
//! [`CaseStore::update_with`]: the mutator must run as a single-row
//! transaction, so validate-then-write sequences on the same case never
//! interleave.

mod memory;

pub use memory::MemoryCaseStore;

use crate::case::{Case, CaseFilter, CaseId};
use crate::error::CaseResult;
use async_trait::async_trait;

/// Closure applied to a case under the store's exclusive section.
///
/// Returning an error aborts the update with no observable write.
pub type CaseMutator = Box<dyn FnOnce(&mut Case) -> CaseResult<()> + Send>;

/// Collaborator interface for case persistence.
///
/// Implementations must guarantee that `update_with` is atomic per case id:
/// concurrent calls on the same id serialize, each mutator observing the
/// state the previous one committed. A mutator error must leave the record
/// untouched.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Fetch a case by id. `NotFound` when absent.
    async fn get(&self, id: CaseId) -> CaseResult<Case>;

    /// Store a new case record.
    async fn insert(&self, case: Case) -> CaseResult<()>;

    /// Atomically read-validate-write one case.
    ///
    /// On success the store bumps `version` and `updated_at` and returns
    /// the committed state.
    async fn update_with(&self, id: CaseId, mutator: CaseMutator) -> CaseResult<Case>;

    /// Permanently remove a case, returning its last state.
    async fn remove(&self, id: CaseId) -> CaseResult<Case>;

    /// All cases matching the filter.
    async fn list(&self, filter: &CaseFilter) -> CaseResult<Vec<Case>>;
}
