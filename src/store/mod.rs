//! Record Store Module
//!
//! The synchronous storage interface the policy service sits on, and the
//! bundled in-memory implementation.

mod memory;

pub use memory::InMemoryPolicyStore;

use thiserror::Error;

use crate::filter::PredicateSet;
use crate::models::{PolicyId, PolicyRecord};

// == Store Error ==
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store could not serve the call
    #[error("{0}")]
    Unavailable(String),

    /// Policy numbers are unique across the store
    #[error("duplicate policy number: {0}")]
    DuplicatePolicyNumber(String),

    /// An update targeted an id that is not stored
    #[error("no record with id {0}")]
    MissingRecord(PolicyId),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Policy Store ==
/// Durable keyed storage of policy records.
///
/// Calls are synchronous and are expected to complete or fail within the
/// store's own time bound.
pub trait PolicyStore: Send + Sync {
    fn find_by_id(&self, id: PolicyId) -> StoreResult<Option<PolicyRecord>>;

    fn find_by_policy_number(&self, policy_number: &str) -> StoreResult<Option<PolicyRecord>>;

    /// Every record, ordered by id.
    fn find_all(&self) -> StoreResult<Vec<PolicyRecord>>;

    /// Inserts a record without an id (assigning one), or replaces the record
    /// with the same id.
    fn save(&self, record: PolicyRecord) -> StoreResult<PolicyRecord>;

    /// Inserts all records, or none of them if any would be rejected.
    fn save_all(&self, records: Vec<PolicyRecord>) -> StoreResult<Vec<PolicyRecord>>;

    fn exists_by_id(&self, id: PolicyId) -> StoreResult<bool>;

    fn delete_by_id(&self, id: PolicyId) -> StoreResult<()>;

    /// Records matching every clause of `predicates`, ordered by id.
    fn scan(&self, predicates: &PredicateSet) -> StoreResult<Vec<PolicyRecord>>;
}
