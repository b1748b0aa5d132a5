// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Scalar results: one row per pair with a single `value` column.

use super::{indexed_table, value_label, CollectionStrategy};
use crate::types::{MeasurementError, MeasurementResult};
use crate::value::MeasurementValue;
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
    let mut records = Vec::with_capacity(rows.len());
    for (row, result) in rows.iter().zip(values) {
        let MeasurementValue::Scalar(scalar) = result else {
            return Err(MeasurementError::UnexpectedResultShape {
                strategy,
                actual: result.shape_name(),
            });
        };
        let mut record = row.clone();
        record.insert(value.clone(), scalar.clone());
        records.push(record);
    }

    let mut leading = params.to_vec();
    leading.push(value);
    indexed_table(&leading, params, &records)
}
