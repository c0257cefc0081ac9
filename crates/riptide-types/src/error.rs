//! Shared error types for the crawl engine.
//!
//! `RiptideError` is the propagating failure type used at crate boundaries
//! (config validation, shared-store connectivity, checkpoint I/O). It is
//! distinct from [`crate::model::ErrorKind`], which is *data* carried inside
//! a `PageRecord` describing why a single fetch failed — that kind never
//! implements `std::error::Error`.

use thiserror::Error;

/// Result type alias using RiptideError
pub type Result<T> = std::result::Result<T, RiptideError>;

/// Main error type for cross-cutting crawl-engine failures.
#[derive(Error, Debug)]
pub enum RiptideError {
    /// Invalid configuration, caught by `validate()`
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// URL failed to parse
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization error (checkpoints, page records)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (checkpoint files, dedup cache)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shared-store adapter unreachable (distributed mode)
    #[error("shared store unavailable: {0}")]
    SharedStoreUnavailable(String),

    /// Checkpoint read/write/schema failure
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// No seed URL survived scope filtering
    #[error("scope too strict: no seed URL is in scope")]
    ScopeTooStrict,

    /// Resource not found (checkpoint id, worker id)
    #[error("not found: {0}")]
    NotFound(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),

    /// Error from anyhow for interoperability at the CLI boundary
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RiptideError {
    /// Create a custom error with a message
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        RiptideError::Custom(msg.into())
    }

    /// Whether this failure should cause the orchestrator to pause and
    /// retry rather than abort the crawl outright.
    pub fn is_transient(&self) -> bool {
        matches!(self, RiptideError::SharedStoreUnavailable(_))
    }
}
