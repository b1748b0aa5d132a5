// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Assembly of `(parameter set, result)` pairs into measurement tables.

The caller picks one of four strategies based on the shape the measurement
method returns:

| Strategy | Result | Table |
|----------|--------|-------|
| primitive | scalar | one `value` column |
| vector | named components | `("value", component)` columns |
| series | labelled series | one row per series entry, series levels appended to the index |
| multi | label -> scalar or series | one table per label |

Every strategy indexes rows by the parameter columns (in first-seen order)
and never by `value`. An empty pair list gives an empty table.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

mod multi;
mod primitive;
mod series;
mod vector;

use crate::types::{MeasurementError, MeasurementResult};
use crate::value::MeasurementValue;
use indexmap::IndexMap;
use neuroval_structures::index_tree::union_labels;
use neuroval_structures::{FlatRow, Label, ParameterSet, Table};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::trace;

/// Name of the column measured values are stored under
pub const VALUE_COLUMN: &str = "value";

/// One parameter set with the raw result measured under it
pub type MeasurementPair = (ParameterSet, MeasurementValue);

/// How results are assembled into a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStrategy {
    #[default]
    Primitive,
    Vector,
    Series,
    Multi,
}

impl Display for CollectionStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionStrategy::Primitive => write!(f, "primitive"),
            CollectionStrategy::Vector => write!(f, "vector"),
            CollectionStrategy::Series => write!(f, "series"),
            CollectionStrategy::Multi => write!(f, "multi"),
        }
    }
}

impl FromStr for CollectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primitive" => Ok(CollectionStrategy::Primitive),
            "vector" => Ok(CollectionStrategy::Vector),
            "series" => Ok(CollectionStrategy::Series),
            "multi" => Ok(CollectionStrategy::Multi),
            other => Err(format!(
                "unknown collection strategy '{}' (expected primitive, vector, series or multi)",
                other
            )),
        }
    }
}

/// An assembled measurement
#[derive(Debug, Clone, PartialEq)]
pub enum Collected {
    Table(Table),
    /// One table per sub-measurement label
    Multi(IndexMap<String, Table>),
}

impl Collected {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Collected::Table(table) => Some(table),
            Collected::Multi(_) => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Collected::Table(table) => Some(table),
            Collected::Multi(_) => None,
        }
    }

    pub fn as_multi(&self) -> Option<&IndexMap<String, Table>> {
        match self {
            Collected::Multi(tables) => Some(tables),
            Collected::Table(_) => None,
        }
    }

    /// Table of one sub-measurement
    pub fn get(&self, label: &str) -> Option<&Table> {
        self.as_multi().and_then(|tables| tables.get(label))
    }

    /// Total number of rows across all tables
    pub fn nrows(&self) -> usize {
        match self {
            Collected::Table(table) => table.nrows(),
            Collected::Multi(tables) => tables.values().map(Table::nrows).sum(),
        }
    }

    /// Apply `f` to every table
    pub fn try_map<F>(self, mut f: F) -> MeasurementResult<Collected>
    where
        F: FnMut(Table) -> MeasurementResult<Table>,
    {
        match self {
            Collected::Table(table) => Ok(Collected::Table(f(table)?)),
            Collected::Multi(tables) => tables
                .into_iter()
                .map(|(label, table)| Ok((label, f(table)?)))
                .collect::<MeasurementResult<IndexMap<_, _>>>()
                .map(Collected::Multi),
        }
    }
}

/// Assembles measurement pairs with one strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeasurementCollector {
    strategy: CollectionStrategy,
}

impl MeasurementCollector {
    pub fn new(strategy: CollectionStrategy) -> Self {
        Self { strategy }
    }

    pub fn primitive() -> Self {
        Self::new(CollectionStrategy::Primitive)
    }

    pub fn vector() -> Self {
        Self::new(CollectionStrategy::Vector)
    }

    pub fn series() -> Self {
        Self::new(CollectionStrategy::Series)
    }

    pub fn multi() -> Self {
        Self::new(CollectionStrategy::Multi)
    }

    pub fn strategy(&self) -> CollectionStrategy {
        self.strategy
    }

    /// Assemble `pairs` into a measurement.
    ///
    /// Pairs are used in the given order; nothing is re-sorted.
    pub fn collect(&self, pairs: &[MeasurementPair]) -> MeasurementResult<Collected> {
        trace!(
            target: "neuroval-measurement",
            "Collecting {} pairs with {} strategy",
            pairs.len(),
            self.strategy
        );
        match self.strategy {
            CollectionStrategy::Primitive => {
                let rows = parameter_rows(pairs.iter().map(|(set, _)| set))?;
                let params = parameter_labels(&rows);
                let values = pairs.iter().map(|(_, value)| value);
                primitive::assemble(CollectionStrategy::Primitive, &params, &rows, values)
                    .map(Collected::Table)
            }
            CollectionStrategy::Vector => vector::collect(pairs).map(Collected::Table),
            CollectionStrategy::Series => {
                let rows = parameter_rows(pairs.iter().map(|(set, _)| set))?;
                let params = parameter_labels(&rows);
                let values = pairs.iter().map(|(_, value)| value);
                series::assemble(CollectionStrategy::Series, &params, &rows, values)
                    .map(Collected::Table)
            }
            CollectionStrategy::Multi => multi::collect(pairs).map(Collected::Multi),
        }
    }
}

/// Flattened parameter sets, rejecting names that collide with `value`
pub(crate) fn parameter_rows<'a, I>(sets: I) -> MeasurementResult<Vec<FlatRow>>
where
    I: IntoIterator<Item = &'a ParameterSet>,
{
    sets.into_iter()
        .map(|set| -> MeasurementResult<FlatRow> {
            let row = set.flatten()?;
            if let Some(label) = row.keys().find(|label| label.first() == VALUE_COLUMN) {
                return Err(MeasurementError::ReservedColumn(label.to_string()));
            }
            Ok(row)
        })
        .collect()
}

/// Parameter column labels in first-seen order
pub(crate) fn parameter_labels(rows: &[FlatRow]) -> Vec<Label> {
    union_labels(rows.iter()).into_iter().collect()
}

/// Build a table from records and index it by `index` columns.
///
/// `leading` fixes the position of the index columns and any data columns
/// that must exist even without rows; further record labels follow.
pub(crate) fn indexed_table(
    leading: &[Label],
    index: &[Label],
    records: &[FlatRow],
) -> MeasurementResult<Table> {
    let table = Table::from_records_with_columns(leading, records);
    Ok(table.set_index(index, false)?)
}

pub(crate) fn value_label() -> Label {
    Label::new(VALUE_COLUMN)
}
