// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, NeurovalConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "neuroval.toml";

/// Find the neuroval configuration file
///
/// Search order:
/// 1. `NEUROVAL_CONFIG_PATH` environment variable
/// 2. Current working directory: `./neuroval.toml`
/// 3. Parent directories, up to 5 levels
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("NEUROVAL_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by NEUROVAL_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|path| path.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "neuroval configuration file '{}' not found in any of these locations:\n{}\n\nSet NEUROVAL_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NeurovalConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NeurovalConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `NEUROVAL_SAMPLE_SIZE` -> `measurement.sample_size`
/// - `NEUROVAL_SAMPLING` -> `measurement.sampling`
/// - `NEUROVAL_PROCESSING` -> `measurement.processing`
/// - `NEUROVAL_REFERENCE_SAMPLES` -> `reference.samples_per_summary`
/// - `NEUROVAL_SEED` -> `reference.seed`
/// - `NEUROVAL_LOG_LEVEL` -> `logging.level`
/// - `NEUROVAL_LOG_DIR` -> `logging.log_dir`
///
/// Values that do not parse are ignored.
pub fn apply_environment_overrides(config: &mut NeurovalConfig) {
    let overrides: HashMap<String, String> = [
        ("NEUROVAL_SAMPLE_SIZE", "sample_size"),
        ("NEUROVAL_SAMPLING", "sampling"),
        ("NEUROVAL_PROCESSING", "processing"),
        ("NEUROVAL_REFERENCE_SAMPLES", "reference_samples"),
        ("NEUROVAL_SEED", "seed"),
        ("NEUROVAL_LOG_LEVEL", "log_level"),
        ("NEUROVAL_LOG_DIR", "log_dir"),
    ]
    .into_iter()
    .filter_map(|(var, key)| env::var(var).ok().map(|value| (key.to_string(), value)))
    .collect();

    apply_cli_overrides(config, &overrides);
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - CLI arguments, e.g. `{"sample_size": "50", "sampling": "exhaustive"}`
pub fn apply_cli_overrides(config: &mut NeurovalConfig, cli_args: &HashMap<String, String>) {
    // Measurement settings
    if let Some(value) = cli_args.get("sample_size") {
        if let Ok(size) = value.parse::<usize>() {
            config.measurement.sample_size = size;
        }
    }
    if let Some(value) = cli_args.get("sampling") {
        if let Ok(sampling) = value.parse() {
            config.measurement.sampling = sampling;
        }
    }
    if let Some(value) = cli_args.get("processing") {
        if let Ok(processing) = value.parse() {
            config.measurement.processing = processing;
        }
    }

    // Reference settings
    if let Some(value) = cli_args.get("reference_samples") {
        if let Ok(samples) = value.parse::<usize>() {
            config.reference.samples_per_summary = samples;
        }
    }
    if let Some(value) = cli_args.get("seed") {
        if let Ok(seed) = value.parse::<u64>() {
            config.reference.seed = Some(seed);
        }
    }

    // Logging settings
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }
}
