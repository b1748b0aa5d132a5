// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Combining tables.

use super::{Column, Index, Table};
use crate::error::{StructureError, StructureResult};
use crate::label::Label;
use crate::scalar::Scalar;

impl Table {
    /// Stack tables vertically.
    ///
    /// All tables must share the same index level names. Columns are the
    /// union of the inputs' columns in first-seen order; rows from a table
    /// lacking a column get `Null` there. Tables with neither rows nor
    /// columns are skipped.
    pub fn concat(tables: &[Table]) -> StructureResult<Table> {
        let parts: Vec<&Table> = tables
            .iter()
            .filter(|t| !(t.is_empty() && t.ncols() == 0 && t.index().nlevels() == 0))
            .collect();

        let Some(first) = parts.first() else {
            return Ok(Table::empty());
        };

        let names = first.index().names().to_vec();
        for part in &parts[1..] {
            if part.index().names() != names.as_slice() {
                return Err(StructureError::IndexMismatch {
                    expected: first.index().describe(),
                    actual: part.index().describe(),
                });
            }
        }

        let mut labels: Vec<Label> = Vec::new();
        for part in &parts {
            for column in part.columns() {
                if !labels.contains(&column.label) {
                    labels.push(column.label.clone());
                }
            }
        }

        let total: usize = parts.iter().map(|p| p.nrows()).sum();
        let mut keys = Vec::with_capacity(total);
        for part in &parts {
            keys.extend(part.index().keys().iter().cloned());
        }

        let columns = labels
            .into_iter()
            .map(|label| {
                let mut values = Vec::with_capacity(total);
                for part in &parts {
                    match part.column(&label) {
                        Some(column) => values.extend(column.values.iter().cloned()),
                        None => values.extend(std::iter::repeat(Scalar::Null).take(part.nrows())),
                    }
                }
                Column { label, values }
            })
            .collect();

        Table::new(Index::new(names, keys)?, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_tree::FlatRow;

    fn table(layer: &str, value: i64, extra: Option<(&str, i64)>) -> Table {
        let mut record = FlatRow::new();
        record.insert(Label::new("layer"), Scalar::from(layer));
        record.insert(Label::new("value"), Scalar::from(value));
        if let Some((label, v)) = extra {
            record.insert(Label::new(label), Scalar::from(v));
        }
        Table::from_records(&[record])
            .set_index(&[Label::new("layer")], false)
            .unwrap()
    }

    #[test]
    fn test_concat_unions_columns() {
        let combined =
            Table::concat(&[table("L1", 1, None), table("L2", 2, Some(("std", 3)))]).unwrap();
        assert_eq!(combined.nrows(), 2);
        assert_eq!(combined.ncols(), 2);
        let std = combined.column(&Label::new("std")).unwrap();
        assert_eq!(std.values, vec![Scalar::Null, Scalar::Int(3)]);
    }

    #[test]
    fn test_concat_rejects_different_index() {
        let other = table("L1", 1, None).reset_index().unwrap();
        let result = Table::concat(&[table("L2", 2, None), other]);
        assert!(matches!(result, Err(StructureError::IndexMismatch { .. })));
    }

    #[test]
    fn test_concat_of_nothing_is_empty() {
        let combined = Table::concat(&[]).unwrap();
        assert!(combined.is_empty());
        assert_eq!(combined.ncols(), 0);
    }
}
