//! Registry of named HTTP outputs.
//!
//! Every output owns its destination, headers, fields and capsule; the
//! registry only maps names to instances.

use std::collections::BTreeMap;
use std::sync::Arc;

use httpout_core::BoxedOutputer;
use httpout_transport::HttpOutput;
use tracing::{debug, info};

use crate::config::HttpoutConfig;
use crate::error::{RuntimeError, RuntimeResult};

/// Named outputs built from configuration.
#[derive(Default)]
pub struct OutputRegistry {
    outputs: BTreeMap<String, Arc<HttpOutput>>,
}

impl OutputRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every enabled output in `config`.
    pub fn from_config(config: &HttpoutConfig) -> RuntimeResult<Self> {
        let mut registry = Self::new();

        for output in config.enabled_outputs() {
            let http = HttpOutput::new(output.http.clone()).map_err(|source| {
                RuntimeError::Output {
                    name: output.name.clone(),
                    source,
                }
            })?;
            registry.register(output.name.clone(), http)?;
        }

        let skipped = config.outputs.len() - registry.len();
        info!(outputs = registry.len(), skipped, "Output registry ready");
        Ok(registry)
    }

    /// Registers an output under `name`.
    pub fn register(&mut self, name: impl Into<String>, output: HttpOutput) -> RuntimeResult<()> {
        let name = name.into();
        if self.outputs.contains_key(&name) {
            return Err(RuntimeError::OutputExists(name));
        }
        debug!(output = %name, url = %output.url(), "Registered output");
        self.outputs.insert(name, Arc::new(output));
        Ok(())
    }

    /// Gets an output by name.
    pub fn get(&self, name: &str) -> RuntimeResult<Arc<HttpOutput>> {
        self.outputs
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::OutputNotFound(name.to_string()))
    }

    /// Gets an output by name as a type-erased [`Outputer`](httpout_core::Outputer).
    pub fn outputer(&self, name: &str) -> RuntimeResult<BoxedOutputer> {
        Ok(self.get(name)? as BoxedOutputer)
    }

    /// Returns all registered output names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.outputs.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered outputs.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Returns true if no output is registered.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;
    use httpout_core::{ConfigurationError, HttpOutputConfig};

    fn config(outputs: Vec<OutputConfig>) -> HttpoutConfig {
        HttpoutConfig {
            outputs,
            ..Default::default()
        }
    }

    #[test]
    fn test_from_config_skips_disabled() {
        let mut archive = OutputConfig::new("archive", HttpOutputConfig::new("http://archive"));
        archive.enabled = false;
        let registry = OutputRegistry::from_config(&config(vec![
            OutputConfig::new("main", HttpOutputConfig::new("http://main").with_port(8080)),
            archive,
        ]))
        .unwrap();

        assert_eq!(registry.names(), vec!["main"]);
        assert_eq!(registry.get("main").unwrap().url(), "http://main:8080");
        assert!(matches!(
            registry.get("archive"),
            Err(RuntimeError::OutputNotFound(_))
        ));
    }

    #[test]
    fn test_from_config_reports_failing_output() {
        let result = OutputRegistry::from_config(&config(vec![OutputConfig::new(
            "broken",
            HttpOutputConfig::new(""),
        )]));

        match result {
            Err(RuntimeError::Output { name, source }) => {
                assert_eq!(name, "broken");
                assert_eq!(source, ConfigurationError::MissingHost);
            }
            _ => panic!("Expected output construction error"),
        }
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = OutputRegistry::new();
        registry
            .register("main", HttpOutput::new(HttpOutputConfig::new("http://a")).unwrap())
            .unwrap();
        let result =
            registry.register("main", HttpOutput::new(HttpOutputConfig::new("http://b")).unwrap());

        assert!(matches!(result, Err(RuntimeError::OutputExists(_))));
        assert_eq!(registry.get("main").unwrap().url(), "http://a");
        assert!(registry.outputer("main").is_ok());
    }
}
