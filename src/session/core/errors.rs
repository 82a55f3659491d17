//! Error types for the session subsystem.

use std::time::Duration;

use thiserror::Error;

/// Session subsystem error type.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Malformed submission (empty content, unknown role, bad payload).
    #[error("invalid submission: {0}")]
    Validation(String),
    /// The addressed resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The summarization backend failed or returned nothing usable.
    #[error("summary generation failed: {0}")]
    Generation(String),
    /// The summarization backend did not answer in time.
    #[error("summary generation timed out after {0:?}")]
    GenerationTimeout(Duration),
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Persisted data could not be interpreted.
    #[error("store error: {0}")]
    Store(String),
    /// The session actor stopped before answering.
    #[error("session actor for {0} is unavailable")]
    ActorUnavailable(String),
    /// `SQLite` storage error (sync).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// HTTP client error from Rig.
    #[error("http client error: {0}")]
    HttpClient(#[from] rig::http_client::Error),
    /// Completion error.
    #[error("completion error: {0}")]
    Completion(#[from] rig::completion::CompletionError),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Coarse classification used when the error crosses the HTTP boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller sent something unusable.
    Client,
    /// Target resource does not exist.
    NotFound,
    /// Anything that went wrong on our side.
    Internal,
}

impl SessionError {
    /// Classify this error for the request/response boundary.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) => ErrorClass::Client,
            Self::NotFound(_) => ErrorClass::NotFound,
            _ => ErrorClass::Internal,
        }
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Generation(_) | Self::GenerationTimeout(_) | Self::Completion(_) => {
                "GENERATION_FAILURE"
            }
            Self::Sqlite(_)
            | Self::TokioSqlite(_)
            | Self::Store(_)
            | Self::Serialization(_) => "STORE_ERROR",
            Self::InvalidConfig(_)
            | Self::ActorUnavailable(_)
            | Self::HttpClient(_)
            | Self::Url(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convenience result alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
