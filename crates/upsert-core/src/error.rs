//! Error types for the upsert service
//!
//! Every failure the workflow can end in is a variant of [`Error`]. The
//! provider-facing variants render as their bare message so the caller-visible
//! failure body is the message text with nothing prepended.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for upsert operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the upsert service
#[derive(Error, Debug)]
pub enum Error {
    /// The DNS provider could not be reached (network or session failure)
    #[error("{0}")]
    Transport(String),

    /// The provider answered but refused the mutation
    /// (bad zone, malformed record, auth failure, throttling)
    #[error("{0}")]
    ProviderRejected(String),

    /// The provider call did not complete in time
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The trigger carried no usable caller address
    #[error("{0}")]
    InvalidTrigger(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`], used in logs and workflow events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Could not reach the provider
    Transport,
    /// Provider refused the change
    ProviderRejected,
    /// Provider call timed out
    Timeout,
    /// Trigger rejected before any provider call
    InvalidTrigger,
    /// Anything else (configuration, serialization, internal)
    Internal,
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a provider rejection
    pub fn provider_rejected(msg: impl Into<String>) -> Self {
        Self::ProviderRejected(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout(after)
    }

    /// Create an invalid trigger error
    pub fn invalid_trigger(msg: impl Into<String>) -> Self {
        Self::InvalidTrigger(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Transport(_) => FailureKind::Transport,
            Error::ProviderRejected(_) => FailureKind::ProviderRejected,
            Error::Timeout(_) => FailureKind::Timeout,
            Error::InvalidTrigger(_) => FailureKind::InvalidTrigger,
            Error::Config(_) | Error::Json(_) | Error::Other(_) => FailureKind::Internal,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
