// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Sample and summary measurement shapes.

- A **summary** table has two-level columns, all under the phenomenon name,
  with at least `mean` and `std` among the second-level names.
- A **sample** table has exactly one data column and a fully named row index.

The two predicates exclude each other: a summary has at least two columns.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::types::{MeasurementError, MeasurementResult};
use neuroval_structures::{Label, Table};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const MEAN: &str = "mean";
pub const STD: &str = "std";
pub const SIZE: &str = "size";

/// Representation a measurement table is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementShape {
    /// One row per observed trial
    Samples,
    /// One row per parameter combination with aggregated statistics
    Summary,
}

impl Display for MeasurementShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasurementShape::Samples => write!(f, "samples"),
            MeasurementShape::Summary => write!(f, "summary"),
        }
    }
}

impl FromStr for MeasurementShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "samples" | "sample" => Ok(MeasurementShape::Samples),
            "summary" => Ok(MeasurementShape::Summary),
            other => Err(format!(
                "unknown measurement shape '{}' (expected samples or summary)",
                other
            )),
        }
    }
}

/// True when `table` holds summary statistics of `phenomenon`
pub fn is_summary(table: &Table, phenomenon: &str) -> bool {
    if table.ncols() == 0 {
        return false;
    }
    let uniform = table
        .columns()
        .iter()
        .all(|c| c.label.depth() == 2 && c.label.first() == phenomenon);
    if !uniform {
        return false;
    }
    let statistics = table.column_level(1);
    statistics.contains(&Some(MEAN)) && statistics.contains(&Some(STD))
}

/// True when `table` holds one sample per row
pub fn is_sample(table: &Table) -> bool {
    table.ncols() == 1 && table.index().is_fully_named()
}

/// Classify `table`, failing when it is neither or both shapes
pub fn classify(table: &Table, phenomenon: &str) -> MeasurementResult<MeasurementShape> {
    match (is_sample(table), is_summary(table, phenomenon)) {
        (true, false) => Ok(MeasurementShape::Samples),
        (false, true) => Ok(MeasurementShape::Summary),
        (sample, summary) => Err(MeasurementError::AmbiguousMeasurementShape {
            phenomenon: phenomenon.to_string(),
            description: format!(
                "{} (sample: {}, summary: {})",
                describe(table),
                sample,
                summary
            ),
        }),
    }
}

/// Columns and index levels of `table`, for error messages
pub fn describe(table: &Table) -> String {
    let columns = table
        .column_labels()
        .iter()
        .map(|label| label.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("columns [{}], index {}", columns, table.index().describe())
}

/// Column label of one statistic of `phenomenon`
pub fn statistic_label(phenomenon: &str, statistic: &str) -> Label {
    Label::pair(phenomenon, statistic)
}
