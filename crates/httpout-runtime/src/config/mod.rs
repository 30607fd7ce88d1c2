//! Configuration module for the httpout runtime.
//!
//! This module provides figment-based configuration loading and validation
//! for logging and the set of named HTTP outputs.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    HttpoutConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, OutputConfig,
};
pub use validation::validate_config;
