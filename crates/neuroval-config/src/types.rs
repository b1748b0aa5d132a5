// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `neuroval.toml`.

use neuroval_structures::{ProcessingMethodology, SamplingMethodology};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeurovalConfig {
    pub measurement: MeasurementConfig,
    pub reference: ReferenceConfig,
    pub logging: LoggingConfig,
}

/// How measurements are taken
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeasurementConfig {
    /// Replicates per parameter set under random sampling
    pub sample_size: usize,
    pub sampling: SamplingMethodology,
    pub processing: ProcessingMethodology,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            sample_size: 20,
            sampling: SamplingMethodology::Random,
            processing: ProcessingMethodology::Batch,
        }
    }
}

/// Reference data handling
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Samples drawn per row when a summary is converted to samples
    pub samples_per_summary: usize,
    /// Seed for those draws; entropy when absent
    pub seed: Option<u64>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            samples_per_summary: 100,
            seed: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for per-run, per-crate log files; console only when absent
    pub log_dir: Option<PathBuf>,
    /// Crates to log at debug level, e.g. `["neuroval-measurement"]`
    pub debug_crates: Vec<String>,
    /// Log run directories older than this many days are removed
    pub retention_days: u64,
    /// At most this many log run directories are kept
    pub max_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            debug_crates: Vec::new(),
            retention_days: 30,
            max_runs: 20,
        }
    }
}
