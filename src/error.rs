//! Error types for the navigation cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Storage Error Enum ==
/// Failures reported by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Writing the value would exceed the backend's quota
    #[error("Quota exceeded writing '{key}': requested {requested} bytes, {available} available")]
    QuotaExceeded {
        key: String,
        requested: usize,
        available: usize,
    },

    /// Storage is disabled or otherwise unusable
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Underlying I/O failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// True for the one failure the cache recovers from by pruning.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

// == Cache Error Enum ==
/// Unified error type for the navigation cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Non-recoverable storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No live entry for the requested key
    #[error("Cache miss: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Serialization(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::Storage(StorageError::QuotaExceeded { .. }) => {
                StatusCode::INSUFFICIENT_STORAGE
            }
            CacheError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the navigation cache.
pub type Result<T> = std::result::Result<T, CacheError>;
