//! Error types for the resilience toolkit
//!
//! Provides tagged error kinds using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Breaker Error Enum ==
/// Outcome of a call that went through a circuit breaker.
///
/// `Open` and `Timeout` are produced by the breaker itself; `Inner` carries
/// the wrapped call's own error unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BreakerError<E> {
    /// The breaker is open and the call was never made
    #[error("circuit breaker '{name}' is open")]
    Open { name: String },

    /// The call did not settle within the breaker's timeout
    #[error("circuit breaker '{name}' timed out after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },

    /// The wrapped call failed
    #[error("{0}")]
    Inner(E),
}

/// Discriminant of a [`BreakerError`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerErrorKind {
    Open,
    Timeout,
    Inner,
}

impl<E> BreakerError<E> {
    pub fn kind(&self) -> BreakerErrorKind {
        match self {
            BreakerError::Open { .. } => BreakerErrorKind::Open,
            BreakerError::Timeout { .. } => BreakerErrorKind::Timeout,
            BreakerError::Inner(_) => BreakerErrorKind::Inner,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BreakerError::Timeout { .. })
    }

    /// Returns the wrapped call's error, if that is what failed.
    pub fn into_inner(self) -> Option<E> {
        match self {
            BreakerError::Inner(err) => Some(err),
            _ => None,
        }
    }
}

// == Api Error Enum ==
/// Errors returned by the diagnostics endpoints.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Named resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the diagnostics handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaker_error_display() {
        let open: BreakerError<String> = BreakerError::Open {
            name: "vendor-api".to_string(),
        };
        assert_eq!(open.to_string(), "circuit breaker 'vendor-api' is open");

        let timeout: BreakerError<String> = BreakerError::Timeout {
            name: "vendor-api".to_string(),
            timeout_ms: 250,
        };
        assert_eq!(
            timeout.to_string(),
            "circuit breaker 'vendor-api' timed out after 250ms"
        );

        let inner: BreakerError<String> = BreakerError::Inner("HTTP 503".to_string());
        assert_eq!(inner.to_string(), "HTTP 503");
    }

    #[test]
    fn test_breaker_error_kind() {
        let open: BreakerError<()> = BreakerError::Open { name: "x".into() };
        assert_eq!(open.kind(), BreakerErrorKind::Open);
        assert!(open.is_open());
        assert_eq!(open.into_inner(), None);

        let inner: BreakerError<u8> = BreakerError::Inner(7);
        assert_eq!(inner.kind(), BreakerErrorKind::Inner);
        assert_eq!(inner.into_inner(), Some(7));
    }

    #[test]
    fn test_api_error_status() {
        let response = ApiError::NotFound("breaker 'x'".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::InvalidRequest("empty prefix".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
