//! Configuration for HTTP outputs.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capsule::Capsule;
use crate::error::{ConfigurationError, ConfigurationResult};
use crate::event::Event;

/// How the output treats the response status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    /// Any non-2xx status fails the publish.
    #[default]
    Strict,
    /// Every response counts as delivered; only transport errors fail.
    Ignore,
}

impl StatusPolicy {
    /// Returns whether a response with `status` counts as delivered.
    pub fn accepts(self, status: u16) -> bool {
        match self {
            Self::Strict => (200..300).contains(&status),
            Self::Ignore => true,
        }
    }
}

/// Configuration of a single HTTP output.
///
/// Keys are snake_case; `customHeaders`, `customFields` and
/// `encapsulationSign` are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpOutputConfig {
    /// Destination host, usually including the scheme.
    #[serde(default)]
    pub host: String,

    /// Destination port; unset or 0 uses `host` as the whole URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Headers set on every request after the defaults.
    #[serde(default, alias = "customHeaders")]
    pub custom_headers: BTreeMap<String, String>,

    /// Fields written into every event before encoding.
    #[serde(default, alias = "customFields")]
    pub custom_fields: Event,

    /// Envelope wrapping every batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encapsulation: Option<Capsule>,

    /// Placeholder inside `encapsulation` replaced by the batch.
    #[serde(
        default,
        alias = "encapsulationSign",
        skip_serializing_if = "Option::is_none"
    )]
    pub encapsulation_sign: Option<String>,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Response status handling.
    #[serde(default)]
    pub status_policy: StatusPolicy,
}

fn default_timeout_ms() -> u64 {
    30000
}

impl Default for HttpOutputConfig {
    fn default() -> Self {
        Self::new("")
    }
}

impl HttpOutputConfig {
    /// Creates a config posting to `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            custom_headers: BTreeMap::new(),
            custom_fields: Event::new(),
            encapsulation: None,
            encapsulation_sign: None,
            timeout_ms: default_timeout_ms(),
            status_policy: StatusPolicy::default(),
        }
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Adds a custom header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(name.into(), value.into());
        self
    }

    /// Adds a custom field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom_fields.insert(name.into(), value.into());
        self
    }

    /// Sets the capsule and its signature.
    pub fn with_capsule(mut self, capsule: Capsule, signature: impl Into<String>) -> Self {
        self.encapsulation = Some(capsule);
        self.encapsulation_sign = Some(signature.into());
        self
    }

    /// Sets the request timeout.
    ///
    /// Sub-millisecond remainders round up; a zero duration stays zero and is
    /// rejected by [`validate`](Self::validate).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    /// Sets the response status policy.
    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Resolves the destination URL.
    ///
    /// The result is not checked for a scheme.
    pub fn url(&self) -> String {
        match self.port {
            Some(port) if port != 0 => format!("{}:{}", self.host, port),
            _ => self.host.clone(),
        }
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the capsule together with its signature, if one is configured.
    pub fn capsule(&self) -> Option<(&Capsule, &str)> {
        match (&self.encapsulation, self.encapsulation_sign.as_deref()) {
            (Some(capsule), Some(sign)) if !sign.is_empty() => Some((capsule, sign)),
            _ => None,
        }
    }

    /// Checks the construction-time invariants.
    pub fn validate(&self) -> ConfigurationResult<()> {
        if self.host.is_empty() {
            return Err(ConfigurationError::MissingHost);
        }
        if self.encapsulation.is_some() && self.capsule().is_none() {
            return Err(ConfigurationError::MissingSignature);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigurationError::InvalidTimeout);
        }
        Ok(())
    }
}
