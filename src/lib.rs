// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neuroval - measurement engine for circuit model validation
//!
//! neuroval measures a model under many parameter combinations and lines the
//! results up with reference data of the same phenomenon, so that model and
//! experiment can be compared row by row.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! neuroval = "0.1"  # Default: console + per-run file logging
//! ```
//!
//! ## Feature Flags
//!
//! - **`file-logging`** (default): per-run JSON log files
//! - **`parallel`**: rayon-backed `MeasurementRunner::batch_parallel`
//!
//! ## Usage
//!
//! ```rust
//! use neuroval::prelude::*;
//!
//! struct Circuit {
//!     name: String,
//! }
//!
//! let source: ParameterSource<Circuit, MeasurementError> = ParameterSource::from_sets(vec![
//!     ParameterSet::new().with("layer", "L1"),
//!     ParameterSet::new().with("layer", "L2"),
//! ]);
//! let method = FnMethod::new(
//!     "Cell density per layer.",
//!     |_: &Circuit, _: &ParameterSet, _: SamplingMethodology| {
//!         Ok::<_, MeasurementError>(MeasurementValue::from(100.0))
//!     },
//! );
//!
//! let config = NeurovalConfig::default();
//! let runner = MeasurementRunner::from_config(&config.measurement, MeasurementCollector::primitive());
//! let circuit = Circuit { name: "O1".to_string() };
//! let measurement = runner.batch(&circuit, &source, &method, &|c: &Circuit| c.name.clone())?;
//!
//! let merger = ReferenceMerger::from_config("density", &config.reference);
//! let summary = merger.summarize(measurement.data.as_table().unwrap())?;
//! assert_eq!(summary.nrows(), 2);
//! # Ok::<(), MeasurementError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: neuroval-structures, neuroval-config       │
//! │  (Scalar, Label, ParameterSet, Table, configuration)    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Parameters: neuroval-parameters                        │
//! │  (table / callable / generator sources, replication)    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Measurement: neuroval-measurement                      │
//! │  (runner, collector, reference merger, cache)           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

use anyhow::Context;

// Re-export foundation
pub use neuroval_config as config;
pub use neuroval_structures as structures;

// Re-export algorithms
pub use neuroval_measurement as measurement;
pub use neuroval_parameters as parameters;

// Re-export infrastructure
pub use neuroval_observability as observability;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{MeasurementConfig, NeurovalConfig, ReferenceConfig};
    pub use crate::measurement::{
        BatchMeasurement, Collected, CollectionStrategy, FixedLabel, FnMethod, LabelProvider,
        MeasurementCache, MeasurementCollector, MeasurementError, MeasurementMethod,
        MeasurementRunner, MeasurementShape, MeasurementValue, ReferenceMerger, RunOutput,
        Series, SerialRecord, Vector,
    };
    pub use crate::parameters::{ParameterError, ParameterSource};
    pub use crate::structures::{
        Label, ParameterSet, ProcessingMethodology, SamplingMethodology, Scalar, Table,
    };
}

/// Validate `config` and install logging as it describes.
///
/// Debug flags from the process arguments and `NEUROVAL_DEBUG` are merged
/// with `config.logging.debug_crates`. Keep the returned guard alive for as
/// long as file logs should be written.
pub fn init(config: &config::NeurovalConfig) -> anyhow::Result<observability::LoggingGuard> {
    config::validate_config(config).context("Invalid neuroval configuration")?;
    let flags = observability::parse_debug_flags();
    let guard = observability::init_logging(&config.logging, &flags)?;
    tracing::info!(
        target: "neuroval",
        "neuroval {} ready: {} sampling of {}, {} processing",
        VERSION,
        config.measurement.sampling,
        config.measurement.sample_size,
        config.measurement.processing
    );
    Ok(guard)
}
