//! Configuration schema definitions.
//!
//! # Example Configuration
//!
//! ```yaml
//! logging:
//!   level: info
//!   format: compact
//!
//! outputs:
//!   - name: collector
//!     host: http://collector.local
//!     port: 9200
//!     custom_headers:
//!       Authorization: Bearer ${TOKEN}
//!     custom_fields:
//!       env: prod
//!     encapsulation:
//!       type: batch
//!       payload: EVENTS
//!     encapsulation_sign: EVENTS
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use httpout_core::HttpOutputConfig;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HttpoutConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Named HTTP outputs.
    #[serde(default)]
    pub outputs: Vec<OutputConfig>,
}

impl HttpoutConfig {
    /// Returns only the enabled outputs.
    pub fn enabled_outputs(&self) -> impl Iterator<Item = &OutputConfig> {
        self.outputs.iter().filter(|o| o.enabled)
    }
}

/// A named HTTP output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Unique name of this output.
    pub name: String,

    /// Whether this output is built at startup.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Destination, headers, fields and capsule.
    #[serde(flatten)]
    pub http: HttpOutputConfig,
}

fn default_enabled() -> bool {
    true
}

impl OutputConfig {
    /// Creates an enabled output.
    pub fn new(name: impl Into<String>, http: HttpOutputConfig) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            http,
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `full` without it.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
    File,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global level.
    pub level: LogLevel,
    /// Line format.
    pub format: LogFormat,
    /// Destination.
    pub output: LogOutput,
    /// Log file, required when `output` is `file`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// Include thread ids.
    pub thread_ids: bool,
    /// Include source file and line.
    pub file_location: bool,
    /// Per-module levels, e.g. `httpout_transport: debug`.
    pub filters: BTreeMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            file_path: None,
            thread_ids: false,
            file_location: false,
            filters: BTreeMap::new(),
        }
    }
}
