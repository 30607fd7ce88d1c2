//! Unified error types for the httpout core.
//!
//! Construction-time failures are [`ConfigurationError`]; everything that can
//! go wrong while publishing a batch is a [`PublishError`].

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors that prevent an output from being constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The destination host is empty.
    #[error("missing host")]
    MissingHost,

    /// A capsule was configured without a non-empty signature.
    #[error("missing signature")]
    MissingSignature,

    /// A custom header name or value is not valid HTTP.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader {
        /// The offending header name.
        name: String,
        /// Reason for rejection.
        reason: String,
    },

    /// The request timeout is zero.
    #[error("timeout must be greater than 0")]
    InvalidTimeout,

    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

// =============================================================================
// Publish Errors
// =============================================================================

/// Errors that can occur while publishing a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The payload could not be encoded as JSON.
    #[error("failed to encode payload: {0}")]
    Serialization(String),

    /// The HTTP request could not be built (bad URL, bad scheme).
    #[error("failed to build request: {0}")]
    Request(String),

    /// The request failed in flight.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a status the output does not accept.
    #[error("endpoint returned HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The per-call deadline elapsed.
    #[error("publish timed out")]
    Timeout,

    /// The caller cancelled the publish.
    #[error("publish cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for output construction.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;
