//! API Module
//!
//! HTTP handlers and routing for the policy service REST API.
//!
//! # Endpoints
//! - `/api/v1/policies/...` - Policy create, lookup, listing, filter, update, delete
//! - `GET /stats` - Per-region cache statistics
//! - `DELETE /cache` - Clear every cache region
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
