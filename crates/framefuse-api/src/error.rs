//! API error types.

use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use framefuse_media::MediaError;
use framefuse_models::CompositionError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Whether server error bodies are redacted; recorded once at startup
/// from [`crate::config::ApiConfig::is_production`].
static PRODUCTION: OnceLock<bool> = OnceLock::new();

pub fn set_production(production: bool) {
    let _ = PRODUCTION.set(production);
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Composition(#[from] CompositionError),

    #[error("{0}")]
    Media(#[from] MediaError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            // Composition errors are caught before any render starts.
            ApiError::BadRequest(_) | ApiError::Composition(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) | ApiError::Media(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::Media(e) => e.diagnostic().map(str::to_string),
            _ => None,
        }
    }

    /// Message and details for the response body, redacting server errors
    /// in production.
    fn body_parts(&self, production: bool) -> (String, Option<String>) {
        if self.status_code().is_server_error() && production {
            ("An internal error occurred".to_string(), None)
        } else {
            (self.to_string(), self.details())
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let production = PRODUCTION.get().copied().unwrap_or(false);
        let (error, details) = self.body_parts(production);

        let body = ErrorResponse { error, details };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::bad_request("no overlay").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CompositionError::InvalidFormat("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(MediaError::download_failed("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_render_stderr_surfaces_as_details() {
        let err = ApiError::from(MediaError::render_failed(
            "FFmpeg exited with non-zero status",
            Some("No such filter: 'frob'".to_string()),
            Some(1),
        ));
        assert_eq!(err.details().as_deref(), Some("No such filter: 'frob'"));
    }

    #[test]
    fn test_production_redacts_server_error_bodies() {
        let err = ApiError::from(MediaError::render_failed(
            "FFmpeg exited with non-zero status",
            Some("No such filter: 'frob'".to_string()),
            Some(1),
        ));

        let (error, details) = err.body_parts(true);
        assert_eq!(error, "An internal error occurred");
        assert!(details.is_none());

        let (error, details) = err.body_parts(false);
        assert!(error.contains("non-zero status"));
        assert_eq!(details.as_deref(), Some("No such filter: 'frob'"));
    }

    #[test]
    fn test_client_errors_are_never_redacted() {
        let (error, _) = ApiError::bad_request("overlayUrl is required").body_parts(true);
        assert!(error.contains("overlayUrl is required"));
    }
}
