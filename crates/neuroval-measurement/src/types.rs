// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types and error handling for measurements.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::collector::CollectionStrategy;
use neuroval_parameters::ParameterError;
use neuroval_structures::StructureError;
use thiserror::Error;

/// Result type for measurement operations
pub type MeasurementResult<T> = Result<T, MeasurementError>;

/// Error types for measurement collection and reference merging
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    /// A table matched neither (or both) of the sample and summary shapes
    #[error("Ambiguous measurement shape for phenomenon '{phenomenon}': {description}")]
    AmbiguousMeasurementShape {
        phenomenon: String,
        description: String,
    },

    /// Datasets expose different parameter columns after shape conversion
    #[error("Datasets {datasets:?} have different parameter columns: {detail}")]
    ShapeMismatch {
        datasets: Vec<String>,
        detail: String,
    },

    #[error("{strategy} collection cannot assemble a {actual} result")]
    UnexpectedResultShape {
        strategy: CollectionStrategy,
        actual: &'static str,
    },

    #[error("Parameter '{0}' collides with a column reserved for measured values")]
    ReservedColumn(String),

    /// Summary statistics no normal distribution can be drawn from
    #[error("Cannot draw samples of '{phenomenon}' from mean {mean} and std {std}: {reason}")]
    InvalidStatistic {
        phenomenon: String,
        mean: f64,
        std: f64,
        reason: String,
    },

    #[error("Column {column} holds non-numeric statistic {value}")]
    NonNumeric { column: String, value: String },

    #[error(transparent)]
    Parameters(#[from] ParameterError),

    #[error(transparent)]
    Structure(#[from] StructureError),
}
