//! Error types for the cache layer and the clipboard service
//!
//! Provides unified error handling using thiserror. Cache operations never
//! fail; these variants come from the registry's type contract and from the
//! durable store behind the service wrapper.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Record not found in the durable store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unique constraint violated in the durable store
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A cache name was requested with a value type other than the one it was created with
    #[error("Cache '{name}' holds values of type {existing}, requested {requested}")]
    TypeMismatch {
        name: String,
        existing: &'static str,
        requested: &'static str,
    },

    /// Durable store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CacheError {
    /// Returns true if this error means the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Conflict(_) => StatusCode::CONFLICT,
            CacheError::TypeMismatch { .. } | CacheError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
