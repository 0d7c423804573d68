//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for groups, peers and the HTTP surfaces.
///
/// Errors are `Clone` because a single failed load is handed to every
/// caller that was coalesced onto it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Invalid setup, e.g. a duplicate group name or bad environment config
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown group, or key absent from the source of truth
    #[error("Not found: {0}")]
    NotFound(String),

    /// Peer network failure, timeout or non-success status
    #[error("Peer transport error: {0}")]
    Transport(String),

    /// Failure reported by a user-supplied loader
    #[error("Loader error: {0}")]
    Loader(String),

    /// Malformed request on the peer or API surface
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CacheError::Transport(format!("request timed out: {}", err))
        } else {
            CacheError::Transport(err.to_string())
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Configuration(_)
            | CacheError::Transport(_)
            | CacheError::Loader(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CacheError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (CacheError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CacheError::Loader("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (CacheError::Transport("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_display_keeps_loader_message() {
        let err = CacheError::Loader("db unavailable".to_string());
        assert_eq!(err.to_string(), "Loader error: db unavailable");
    }
}
