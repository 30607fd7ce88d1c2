//! Runtime error types.

use thiserror::Error;

pub use crate::config::error::{ConfigError, ConfigResult};

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An output could not be constructed.
    #[error("Output '{name}' could not be built: {source}")]
    Output {
        name: String,
        #[source]
        source: httpout_core::ConfigurationError,
    },

    /// Output not found.
    #[error("Output not found: {0}")]
    OutputNotFound(String),

    /// Output already registered.
    #[error("Output already exists: {0}")]
    OutputExists(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
