//! Policy Cache - insurance policy service with read-through cache regions
//!
//! Four cache regions sit in front of a record store: by id, by policy
//! number, the full listing, and filtered listings keyed by a canonical
//! filter signature. Every write invalidates the regions it could affect.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod service;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{PolicyError, Result};
pub use service::PolicyService;
pub use tasks::spawn_cleanup_task;
