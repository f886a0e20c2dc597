//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dedup_core::error::DedupError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The dedup store could not be opened or closed.
    #[error("store error: {0}")]
    Store(#[from] DedupError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DedupError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DedupError);

impl From<DedupError> for ApiError {
    fn from(err: DedupError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DedupError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DedupError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
            DedupError::StoreClosed => (StatusCode::SERVICE_UNAVAILABLE, "store_closed"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DedupError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn test_startup_failures_convert_into_app_error() {
        let store = AppError::from(DedupError::Store("unable to open database file".into()));
        let server = AppError::from(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "address in use",
        ));

        assert!(matches!(store, AppError::Store(DedupError::Store(_))));
        assert!(matches!(server, AppError::Server(_)));
        assert_eq!(server.to_string(), "server error: address in use");
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(DedupError::Validation("bad timestamp".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_failure_maps_to_500() {
        assert_eq!(
            status_of(DedupError::Store("disk I/O error".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_closed_store_maps_to_503() {
        assert_eq!(
            status_of(DedupError::StoreClosed),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
