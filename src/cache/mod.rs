//! Cache Module
//!
//! Provides the cache regions in front of the record store, with optional
//! TTL expiration and least-recently-written eviction.

mod entry;
mod region;
mod regions;
mod stats;
mod write_order;


// Re-export public types
pub use entry::CacheEntry;
pub use region::{CacheRegion, Generation, Lookup, RegionPolicy};
pub use regions::{Mutation, PolicyCaches, ALL_POLICIES_KEY};
pub use stats::CacheStats;
pub use write_order::WriteOrder;
