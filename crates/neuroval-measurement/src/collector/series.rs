// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Series results: every series entry becomes a row, carrying the parameter
//! columns, the entry's own index values and a `value` column.

use super::{indexed_table, value_label, CollectionStrategy};
use crate::types::{MeasurementError, MeasurementResult};
use crate::value::MeasurementValue;
use indexmap::IndexSet;
use neuroval_structures::{FlatRow, Label, Table};

pub(super) fn assemble<'a, I>(
    strategy: CollectionStrategy,
    params: &[Label],
    rows: &[FlatRow],
    values: I,
) -> MeasurementResult<Table>
where
    I: IntoIterator<Item = &'a MeasurementValue>,
{
    let value = value_label();
    let mut inner_levels: IndexSet<Label> = IndexSet::new();
    let mut records = Vec::new();

    for (row, result) in rows.iter().zip(values) {
        let MeasurementValue::Series(series) = result else {
            return Err(MeasurementError::UnexpectedResultShape {
                strategy,
                actual: result.shape_name(),
            });
        };
        let levels = series.level_labels();
        for level in &levels {
            if level == &value || params.contains(level) {
                return Err(MeasurementError::ReservedColumn(level.to_string()));
            }
            inner_levels.insert(level.clone());
        }
        for (key, entry) in series.entries() {
            let mut record = row.clone();
            for (level, key_value) in levels.iter().zip(key) {
                record.insert(level.clone(), key_value.clone());
            }
            record.insert(value.clone(), entry.clone());
            records.push(record);
        }
    }

    let mut index = params.to_vec();
    index.extend(inner_levels);
    let mut leading = index.clone();
    leading.push(value);
    indexed_table(&leading, &index, &records)
}
