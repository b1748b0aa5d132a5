// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# neuroval-structures

The core data types shared by every neuroval crate:

- [`Scalar`]: a single cell value (null, bool, int, float, text)
- [`Label`]: a plain or hierarchical name for parameters, columns and index levels
- [`Nested`] and [`ParameterSet`]: nested mappings of parameter values
- [`index_tree`]: the codec between nested mappings and flat, path-keyed rows
- [`Table`] and [`Index`]: the tabular structure measurements are assembled into
- [`SamplingMethodology`] and [`ProcessingMethodology`]: measurement policies

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod error;
pub mod index_tree;
mod label;
mod methodology;
mod nested;
mod parameter_set;
mod scalar;
pub mod table;

pub use error::{StructureError, StructureResult};
pub use index_tree::FlatRow;
pub use label::Label;
pub use methodology::{ProcessingMethodology, SamplingMethodology};
pub use nested::Nested;
pub use parameter_set::ParameterSet;
pub use scalar::Scalar;
pub use table::{Column, Index, Table};
