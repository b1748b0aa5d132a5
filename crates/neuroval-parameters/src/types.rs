// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types and error handling for parameter resolution.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use neuroval_structures::{ParameterSet, StructureError, Table};
use thiserror::Error;

/// Result type for parameter operations
pub type ParameterResult<T> = Result<T, ParameterError>;

/// Error types for parameter resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// `variables` was read before the labels were known, or label
    /// inference is disabled for this source
    #[error("Parameter labels are not available: {0}")]
    LabelsNotAvailable(String),

    #[error("Invalid sample size {0}: must be a positive integer")]
    InvalidSampleSize(usize),

    #[error(transparent)]
    Structure(#[from] StructureError),
}

/// What a parameter callable hands back: a table whose rows are parameter
/// sets, or the parameter sets themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterRows {
    Table(Table),
    Sets(Vec<ParameterSet>),
}

impl From<Table> for ParameterRows {
    fn from(table: Table) -> Self {
        ParameterRows::Table(table)
    }
}

impl From<Vec<ParameterSet>> for ParameterRows {
    fn from(sets: Vec<ParameterSet>) -> Self {
        ParameterRows::Sets(sets)
    }
}

/// Which variant backs a parameter source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A concrete table, known before any model is seen
    Table,
    /// A callable resolved against each model
    Callable,
    /// A callable producing a lazy sequence, materialised once per resolution
    Generator,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Table => write!(f, "table"),
            SourceKind::Callable => write!(f, "callable"),
            SourceKind::Generator => write!(f, "generator"),
        }
    }
}
