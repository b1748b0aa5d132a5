// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks that values are within valid ranges and reports every problem
//! found in one error.

use crate::{ConfigError, ConfigResult, NeurovalConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - `measurement.sample_size >= 1`
/// - `reference.samples_per_summary >= 1`
/// - a known `logging.level`
/// - `logging.max_runs >= 1`
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &NeurovalConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_measurement(config, &mut errors);
    validate_reference(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_measurement(config: &NeurovalConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.measurement.sample_size == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "measurement.sample_size".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_reference(config: &NeurovalConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.reference.samples_per_summary == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "reference.samples_per_summary".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_logging(config: &NeurovalConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!(
                "'{}' is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }
    if config.logging.max_runs == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.max_runs".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&NeurovalConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_are_reported_together() {
        let mut config = NeurovalConfig::default();
        config.measurement.sample_size = 0;
        config.reference.samples_per_summary = 0;
        config.logging.level = "loud".to_string();

        let Err(ConfigError::ValidationError(message)) = validate_config(&config) else {
            panic!("expected a validation error");
        };
        assert!(message.contains("measurement.sample_size"));
        assert!(message.contains("reference.samples_per_summary"));
        assert!(message.contains("logging.level"));
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let mut config = NeurovalConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
