// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Error types for the core data structures.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use thiserror::Error;

/// Result type for structure operations
pub type StructureResult<T> = Result<T, StructureError>;

/// Errors raised while building or reshaping labels, parameter trees and tables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructureError {
    /// A nested-mapping key is empty or its depth differs from its siblings
    #[error("Malformed parameter key {key}: {reason}")]
    MalformedParameterKey { key: String, reason: String },

    /// A referenced column does not exist in the table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A referenced index level does not exist in the table
    #[error("Index level not found: {0}")]
    IndexLevelNotFound(String),

    /// The same column label was supplied twice
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// Column or index lengths disagree
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// Tables being combined disagree on their index levels
    #[error("Index mismatch: expected levels [{expected}], got [{actual}]")]
    IndexMismatch { expected: String, actual: String },

    /// A cell expected to be numeric holds something else
    #[error("Non-numeric value {value} in column {column}")]
    NonNumeric { column: String, value: String },

    /// JSON encoding failed while fingerprinting or exporting
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StructureError {
    pub(crate) fn malformed(key: impl ToString, reason: impl Into<String>) -> Self {
        StructureError::MalformedParameterKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for StructureError {
    fn from(err: serde_json::Error) -> Self {
        StructureError::Serialization(err.to_string())
    }
}
