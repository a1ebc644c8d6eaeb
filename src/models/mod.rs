//! Domain and transfer types for the policy service
//!
//! The policy record itself plus the DTOs used for
//! serializing/deserializing HTTP request and response bodies.

pub mod policy;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use policy::{NewPolicy, PolicyId, PolicyPatch, PolicyRecord, PolicyStatus, PolicyType};
pub use requests::{FilterQuery, PageQuery};
pub use responses::{
    ClearResponse, HealthResponse, Page, RegionStatsResponse, StatsResponse,
};
