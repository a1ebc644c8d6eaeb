//! Error types for the policy service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

// == Policy Error Enum ==
/// Unified error type for the policy service.
///
/// Cache-internal conditions (eviction, expiration) never surface here; they
/// are only ever observed as a miss.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// No record matches the id or policy number, or the store is empty
    #[error("{0}")]
    NotFound(String),

    /// Malformed or contradictory input, rejected before any cache or store access
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The store rejected a duplicate policy number
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The record store failed; not retried
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl PolicyError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PolicyError::NotFound(_) => StatusCode::NOT_FOUND,
            PolicyError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            PolicyError::Conflict(_) => StatusCode::CONFLICT,
            PolicyError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<StoreError> for PolicyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => PolicyError::StoreUnavailable(msg),
            StoreError::DuplicatePolicyNumber(number) => {
                PolicyError::Conflict(format!("Policy number '{}' already exists", number))
            }
            StoreError::MissingRecord(id) => {
                PolicyError::NotFound(format!("Auto policy not found with ID: {}", id))
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for PolicyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "status": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the policy service.
pub type Result<T> = std::result::Result<T, PolicyError>;
