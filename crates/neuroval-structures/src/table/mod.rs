// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Column-major measurement tables.

A [`Table`] pairs a row [`Index`] (zero, one or several levels) with a list of
labelled [`Column`]s. Column labels may be hierarchical, which gives the
two-level `("value", component)` or `(phenomenon, "mean")` column spaces used
by measurements. Tables are built fresh for every measurement and treated as
read-only afterwards, so every reshaping operation returns a new table.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

mod display;
mod index;
mod ops;

pub use index::Index;

use crate::error::{StructureError, StructureResult};
use crate::index_tree::{union_labels, FlatRow};
use crate::label::Label;
use crate::scalar::Scalar;
use indexmap::IndexMap;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::xxh64;

/// One labelled column of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub label: Label,
    pub values: Vec<Scalar>,
}

impl Column {
    pub fn new(label: impl Into<Label>, values: Vec<Scalar>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    index: Index,
    columns: Vec<Column>,
}

#[derive(Deserialize)]
struct RawTable {
    index: Index,
    columns: Vec<Column>,
}

impl TryFrom<RawTable> for Table {
    type Error = StructureError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        Table::new(raw.index, raw.columns)
    }
}

impl Table {
    /// Build a table, checking that every column matches the index length
    /// and that column labels are unique.
    pub fn new(index: Index, columns: Vec<Column>) -> StructureResult<Self> {
        for (position, column) in columns.iter().enumerate() {
            if column.values.len() != index.len() {
                return Err(StructureError::LengthMismatch {
                    what: format!("column {}", column.label),
                    expected: index.len(),
                    actual: column.values.len(),
                });
            }
            if columns[..position].iter().any(|c| c.label == column.label) {
                return Err(StructureError::DuplicateColumn(column.label.to_string()));
            }
        }
        Ok(Self { index, columns })
    }

    /// A table with no rows and no columns
    pub fn empty() -> Self {
        Self::default()
    }

    /// A table with the given columns and no rows
    pub fn with_columns<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        let mut columns: Vec<Column> = Vec::new();
        for label in labels {
            let label = label.into();
            if !columns.iter().any(|c| c.label == label) {
                columns.push(Column::new(label, Vec::new()));
            }
        }
        Self {
            index: Index::positional(0),
            columns,
        }
    }

    /// Build a table from flat records.
    ///
    /// Columns are the union of the records' labels in first-seen order;
    /// cells a record does not provide are `Null`. The index is positional.
    pub fn from_records(records: &[FlatRow]) -> Self {
        Self::from_records_with_columns(&[], records)
    }

    /// Like [`Table::from_records`], but `leading` columns come first, in
    /// the given order, even when no record provides them.
    pub fn from_records_with_columns(leading: &[Label], records: &[FlatRow]) -> Self {
        let mut labels: Vec<Label> = Vec::with_capacity(leading.len());
        for label in leading {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        for label in union_labels(records.iter()) {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }

        let columns = labels
            .into_iter()
            .map(|label| {
                let values = records
                    .iter()
                    .map(|record| record.get(&label).cloned().unwrap_or(Scalar::Null))
                    .collect();
                Column { label, values }
            })
            .collect();

        Self {
            index: Index::positional(records.len()),
            columns,
        }
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.index.len()
    }

    /// Number of data columns
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.nrows() == 0
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_labels(&self) -> Vec<&Label> {
        self.columns.iter().map(|c| &c.label).collect()
    }

    pub fn column(&self, label: &Label) -> Option<&Column> {
        self.columns.iter().find(|c| &c.label == label)
    }

    pub fn column_position(&self, label: &Label) -> Option<usize> {
        self.columns.iter().position(|c| &c.label == label)
    }

    pub fn has_column(&self, label: &Label) -> bool {
        self.column_position(label).is_some()
    }

    /// Segment `level` of every column label (`None` where a label is shallower)
    pub fn column_level(&self, level: usize) -> Vec<Option<&str>> {
        self.columns.iter().map(|c| c.label.level(level)).collect()
    }

    /// Append a column.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate label or a length that differs from the row count.
    pub fn push_column(&mut self, label: impl Into<Label>, values: Vec<Scalar>) -> StructureResult<()> {
        let position = self.columns.len();
        self.insert_column(position, label, values)
    }

    /// Insert a column at `position`
    pub fn insert_column(
        &mut self,
        position: usize,
        label: impl Into<Label>,
        values: Vec<Scalar>,
    ) -> StructureResult<()> {
        let label = label.into();
        if self.has_column(&label) {
            return Err(StructureError::DuplicateColumn(label.to_string()));
        }
        if values.len() != self.nrows() {
            return Err(StructureError::LengthMismatch {
                what: format!("column {}", label),
                expected: self.nrows(),
                actual: values.len(),
            });
        }
        let position = position.min(self.columns.len());
        self.columns.insert(position, Column { label, values });
        Ok(())
    }

    /// Remove a column and return it
    pub fn drop_column(&mut self, label: &Label) -> StructureResult<Column> {
        let position = self
            .column_position(label)
            .ok_or_else(|| StructureError::ColumnNotFound(label.to_string()))?;
        Ok(self.columns.remove(position))
    }

    /// Rename a column in place
    pub fn rename_column(&mut self, from: &Label, to: impl Into<Label>) -> StructureResult<()> {
        let to = to.into();
        if &to == from {
            return Ok(());
        }
        if self.has_column(&to) {
            return Err(StructureError::DuplicateColumn(to.to_string()));
        }
        let position = self
            .column_position(from)
            .ok_or_else(|| StructureError::ColumnNotFound(from.to_string()))?;
        self.columns[position].label = to;
        Ok(())
    }

    /// Move the named columns into the row index.
    ///
    /// With `append == false` the current index levels are discarded, with
    /// `append == true` the new levels go after them.
    pub fn set_index(&self, labels: &[Label], append: bool) -> StructureResult<Table> {
        let mut table = self.clone();
        if !append {
            table.index = Index::positional(self.nrows());
        }
        for label in labels {
            if table.index.level_position(label).is_some() {
                return Err(StructureError::DuplicateColumn(label.to_string()));
            }
            let column = table.drop_column(label)?;
            let position = table.index.nlevels();
            table
                .index
                .insert_level(position, Some(column.label), column.values)?;
        }
        Ok(table)
    }

    /// Move every named index level back into the columns, in front of the
    /// existing columns. Unnamed levels are dropped and the index becomes
    /// positional.
    pub fn reset_index(&self) -> StructureResult<Table> {
        let mut columns = Vec::with_capacity(self.index.nlevels() + self.columns.len());
        for (level, name) in self.index.names().iter().enumerate() {
            if let Some(label) = name {
                columns.push(Column {
                    label: label.clone(),
                    values: self.index.level_values(level),
                });
            }
        }
        columns.extend(self.columns.iter().cloned());
        Table::new(Index::positional(self.nrows()), columns)
    }

    /// Insert a named index level holding one value per row
    pub fn insert_index_level(
        &mut self,
        position: usize,
        label: impl Into<Label>,
        values: Vec<Scalar>,
    ) -> StructureResult<()> {
        let label = label.into();
        if self.index.level_position(&label).is_some() {
            return Err(StructureError::DuplicateColumn(label.to_string()));
        }
        self.index.insert_level(position, Some(label), values)
    }

    /// Remove a named index level and return its values
    pub fn drop_index_level(&mut self, label: &Label) -> StructureResult<Vec<Scalar>> {
        let position = self
            .index
            .level_position(label)
            .ok_or_else(|| StructureError::IndexLevelNotFound(label.to_string()))?;
        self.index
            .remove_level(position)
            .map(|(_, values)| values)
            .ok_or_else(|| StructureError::IndexLevelNotFound(label.to_string()))
    }

    /// Cell values of one row, in column order
    pub fn data_row(&self, row: usize) -> Option<Vec<&Scalar>> {
        if row >= self.nrows() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[row]).collect())
    }

    /// One row as a flat record: named index levels followed by the columns
    pub fn record(&self, row: usize) -> Option<FlatRow> {
        let key = self.index.key(row)?;
        let mut record = FlatRow::with_capacity(key.len() + self.columns.len());
        for (name, value) in self.index.names().iter().zip(key) {
            if let Some(label) = name {
                record.insert(label.clone(), value.clone());
            }
        }
        for column in &self.columns {
            record.insert(column.label.clone(), column.values[row].clone());
        }
        Some(record)
    }

    /// All rows as flat records
    pub fn records(&self) -> Vec<FlatRow> {
        (0..self.nrows()).filter_map(|row| self.record(row)).collect()
    }

    /// Keep only the rows at `rows`, in that order
    pub fn take(&self, rows: &[usize]) -> Table {
        let rows: Vec<usize> = rows.iter().copied().filter(|&r| r < self.nrows()).collect();
        Table {
            index: self.index.take(&rows),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    label: c.label.clone(),
                    values: rows.iter().map(|&r| c.values[r].clone()).collect(),
                })
                .collect(),
        }
    }

    /// Row positions grouped by the values of the given index levels.
    ///
    /// Groups are sorted by key.
    pub fn group_rows(&self, levels: &[Label]) -> StructureResult<IndexMap<Vec<Scalar>, Vec<usize>>> {
        let positions = levels
            .iter()
            .map(|label| {
                self.index
                    .level_position(label)
                    .ok_or_else(|| StructureError::IndexLevelNotFound(label.to_string()))
            })
            .collect::<StructureResult<Vec<usize>>>()?;

        let mut groups: IndexMap<Vec<Scalar>, Vec<usize>> = IndexMap::new();
        for (row, key) in self.index.keys().iter().enumerate() {
            let group_key = positions.iter().map(|&p| key[p].clone()).collect();
            groups.entry(group_key).or_default().push(row);
        }
        groups.sort_keys();
        Ok(groups)
    }

    /// A column as a float array; `Null` cells become NaN.
    ///
    /// # Errors
    ///
    /// Fails when the column is missing or holds text or booleans.
    pub fn numeric_column(&self, label: &Label) -> StructureResult<Array1<f64>> {
        let column = self
            .column(label)
            .ok_or_else(|| StructureError::ColumnNotFound(label.to_string()))?;
        column
            .values
            .iter()
            .map(|value| match value {
                Scalar::Null => Ok(f64::NAN),
                other => other.as_f64().ok_or_else(|| StructureError::NonNumeric {
                    column: label.to_string(),
                    value: other.to_string(),
                }),
            })
            .collect::<StructureResult<Vec<f64>>>()
            .map(Array1::from_vec)
    }

    /// Stable 64-bit hash of the table contents.
    ///
    /// Hashes the JSON encoding, so non-finite floats hash like `Null`.
    pub fn fingerprint(&self) -> StructureResult<u64> {
        let bytes = serde_json::to_vec(self)?;
        Ok(xxh64(&bytes, 0))
    }
}
