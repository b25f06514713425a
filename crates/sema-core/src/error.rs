//! Error types for sema.

use thiserror::Error;

/// Result type alias using sema's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sema operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Empty or missing search text, or an unusable limit.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The embedding model could not be invoked or timed out
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Query vector and index disagree on dimensionality.
    ///
    /// Indicates model/index version skew; operators should be alerted.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Backing store unreachable or erroring
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable snake_case tag for logs and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidQuery(_) => "invalid_query",
            Error::EmbeddingUnavailable(_) => "embedding_unavailable",
            Error::DimensionMismatch { .. } => "dimension_mismatch",
            Error::IndexUnavailable(_) => "index_unavailable",
            Error::Config(_) => "config",
            Error::Serialization(_) => "serialization",
            Error::Internal(_) => "internal",
        }
    }

    /// Whether a caller may reasonably retry the whole request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::EmbeddingUnavailable(_) | Error::IndexUnavailable(_)
        )
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::IndexUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::EmbeddingUnavailable(e.to_string())
    }
}
