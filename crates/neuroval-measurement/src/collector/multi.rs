// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Mappings of sub-measurements: one table per label.
//!
//! Index columns are the union of the parameters across all pairs, so every
//! label's table shares the same index levels. A pair that does not report a
//! label has no row in that label's table.

use super::{parameter_labels, parameter_rows, primitive, series, CollectionStrategy, MeasurementPair};
use crate::types::{MeasurementError, MeasurementResult};
use crate::value::MeasurementValue;
use indexmap::IndexMap;
use neuroval_structures::{FlatRow, Table};
use tracing::trace;

pub(super) fn collect(pairs: &[MeasurementPair]) -> MeasurementResult<IndexMap<String, Table>> {
    let rows = parameter_rows(pairs.iter().map(|(set, _)| set))?;
    let params = parameter_labels(&rows);

    let mut by_label: IndexMap<&str, (Vec<FlatRow>, Vec<&MeasurementValue>)> = IndexMap::new();
    for (row, (_, result)) in rows.iter().zip(pairs) {
        let MeasurementValue::Multi(entries) = result else {
            return Err(MeasurementError::UnexpectedResultShape {
                strategy: CollectionStrategy::Multi,
                actual: result.shape_name(),
            });
        };
        for (label, value) in entries {
            let (label_rows, label_values) = by_label.entry(label.as_str()).or_default();
            label_rows.push(row.clone());
            label_values.push(value);
        }
    }

    let mut tables = IndexMap::with_capacity(by_label.len());
    for (label, (label_rows, values)) in by_label {
        let table = match values.first() {
            Some(MeasurementValue::Series(_)) => series::assemble(
                CollectionStrategy::Multi,
                &params,
                &label_rows,
                values.iter().copied(),
            )?,
            _ => primitive::assemble(
                CollectionStrategy::Multi,
                &params,
                &label_rows,
                values.iter().copied(),
            )?,
        };
        trace!(
            target: "neuroval-measurement",
            "Sub-measurement '{}': {} rows",
            label,
            table.nrows()
        );
        tables.insert(label.to_string(), table);
    }
    Ok(tables)
}
