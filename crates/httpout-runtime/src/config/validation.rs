//! Configuration validation utilities.

use std::collections::HashSet;

use httpout_core::ConfigurationError;

use super::error::{ConfigError, ConfigResult};
use super::schema::{HttpoutConfig, LogOutput, LoggingConfig, OutputConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HttpoutConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_outputs_config(&config.outputs)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}

/// Validates all output configurations.
fn validate_outputs_config(outputs: &[OutputConfig]) -> ConfigResult<()> {
    let mut seen = HashSet::new();

    for output in outputs {
        if !seen.insert(output.name.as_str()) {
            return Err(ConfigError::DuplicateOutput(output.name.clone()));
        }

        validate_output_config(output)?;
    }

    Ok(())
}

/// Validates a single output configuration.
fn validate_output_config(output: &OutputConfig) -> ConfigResult<()> {
    if output.name.is_empty() {
        return Err(ConfigError::missing_field("outputs.name"));
    }

    if output.name.contains(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "Output name '{}' cannot contain whitespace",
            output.name
        )));
    }

    output.http.validate().map_err(|e| match e {
        ConfigurationError::MissingHost => {
            ConfigError::missing_field(format!("outputs.{}.host", output.name))
        }
        ConfigurationError::MissingSignature => {
            ConfigError::missing_field(format!("outputs.{}.encapsulation_sign", output.name))
        }
        other => ConfigError::validation(format!("Output '{}': {other}", output.name)),
    })
}
