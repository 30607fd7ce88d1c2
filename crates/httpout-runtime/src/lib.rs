//! httpout Runtime - configuration, logging and output management.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `HttpoutConfig`)
//! - Logging setup driven by the `logging` section (`LoggingBuilder`)
//! - A registry of named HTTP outputs built from the `outputs` section
//!   (`OutputRegistry`)
//!
//! ```ignore
//! use httpout_runtime::{OutputRegistry, load_config, logging};
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//!
//! let registry = OutputRegistry::from_config(&config)?;
//! let output = registry.outputer("collector")?;
//! ```
//!
//! # Configuration Sources
//!
//! Later sources override earlier ones:
//!
//! 1. Built-in defaults
//! 2. `httpout.toml` / `httpout.yaml` (with `toml-config` / `yaml-config`)
//! 3. Environment variables prefixed with `HTTPOUT_`, nested with `__`

pub mod config;
pub mod error;
pub mod logging;
pub mod registry;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, HttpoutConfig, LogFormat, LogLevel, LogOutput,
    LoggingConfig, OutputConfig, Profile, load_config, load_config_from_file,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use registry::OutputRegistry;
