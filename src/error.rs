//! Error types for the distributed cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the distributed cache.
///
/// `Clone` so that one coalesced load result can be handed to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Empty key passed to a lookup
    #[error("key is required")]
    InvalidKey,

    /// The local loader failed; carries the loader's message verbatim
    #[error("{0}")]
    Loader(String),

    /// A remote peer could not be reached or answered with a failure status
    #[error("peer request failed: {0}")]
    PeerTransport(String),

    /// No group is registered under the requested name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// Malformed inbound request
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Programmer or operator error detected during setup
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Returns true for errors that must abort start-up instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CacheError::Config(_))
    }

    /// Status code used when this error reaches an HTTP client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::InvalidKey | CacheError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::PeerTransport(_) => StatusCode::BAD_GATEWAY,
            CacheError::Loader(_) | CacheError::Config(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string()
        }));

        (self.status_code(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the distributed cache.
pub type Result<T> = std::result::Result<T, CacheError>;
