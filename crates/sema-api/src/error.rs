//! Mapping of search errors onto HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use sema_core::Error;

/// Error returned by every handler. Body: `{"error": message, "kind": tag}`.
#[derive(Debug)]
pub enum ApiError {
    /// A failure from the query pipeline.
    Search(Error),
    /// The request body was rejected before reaching the pipeline
    /// (malformed JSON, wrong content type, too large).
    Rejected(StatusCode, String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Search(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl ApiError {
    /// Status code, message, and kind tag for this error.
    pub fn parts(&self) -> (StatusCode, String, &'static str) {
        match self {
            ApiError::Rejected(status, msg) => (*status, msg.clone(), "invalid_query"),
            ApiError::Search(err) => {
                let status = match err {
                    Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                    Error::EmbeddingUnavailable(_) | Error::IndexUnavailable(_) => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = match err {
                    Error::InvalidQuery(msg) => msg.clone(),
                    Error::EmbeddingUnavailable(_)
                    | Error::IndexUnavailable(_)
                    | Error::DimensionMismatch { .. } => err.to_string(),
                    _ => "Internal server error".to_string(),
                };
                let kind = match err {
                    Error::InvalidQuery(_)
                    | Error::EmbeddingUnavailable(_)
                    | Error::IndexUnavailable(_)
                    | Error::DimensionMismatch { .. } => err.kind(),
                    _ => "internal",
                };
                (status, message, kind)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, kind) = self.parts();

        match &self {
            ApiError::Search(err @ Error::DimensionMismatch { .. }) => {
                error!(error_kind = kind, error = %err, "Embedder and index disagree on dimension");
            }
            ApiError::Search(err) if status.is_server_error() => {
                warn!(error_kind = err.kind(), error = %err, "Search request failed");
            }
            _ => {}
        }

        let body = Json(serde_json::json!({
            "error": message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(err: Error) -> (StatusCode, String, &'static str) {
        ApiError::from(err).parts()
    }

    #[test]
    fn test_invalid_query_is_bad_request_with_bare_message() {
        let (status, message, kind) =
            parts(Error::InvalidQuery("Please provide a search param!".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Please provide a search param!");
        assert_eq!(kind, "invalid_query");
    }

    #[test]
    fn test_transient_failures_are_service_unavailable() {
        let (status, _, kind) = parts(Error::EmbeddingUnavailable("down".to_string()));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(kind, "embedding_unavailable");

        let (status, _, kind) = parts(Error::IndexUnavailable("down".to_string()));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(kind, "index_unavailable");
    }

    #[test]
    fn test_dimension_mismatch_is_internal_error() {
        let (status, message, kind) = parts(Error::DimensionMismatch {
            expected: 384,
            actual: 768,
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(kind, "dimension_mismatch");
        assert!(message.contains("384"));
    }

    #[test]
    fn test_other_errors_hide_details() {
        let (status, message, kind) = parts(Error::Internal("secret detail".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(kind, "internal");
        assert!(!message.contains("secret"));
    }

    #[test]
    fn test_rejection_keeps_status() {
        let (status, message, kind) =
            ApiError::Rejected(StatusCode::PAYLOAD_TOO_LARGE, "too big".to_string()).parts();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(message, "too big");
        assert_eq!(kind, "invalid_query");
    }
}
