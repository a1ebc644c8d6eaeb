//! Policy Service Module
//!
//! Read-through lookups and write-then-invalidate mutations over the record
//! store and the policy cache regions.

mod policy_service;

pub use policy_service::{PolicyService, MAX_PAGE_SIZE};
