// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Parameter sources.

A [`ParameterSource`] turns a parameter specification into the concrete,
ordered list of [`ParameterSet`]s a measurement is taken over. The
specification is one of three tagged variants ([`ParameterSpec`]), decided
once at construction:

- a [`Table`] whose rows are the parameter sets,
- a callable that, given the model, returns a table or a list of sets,
- a callable that returns a lazy iterator of sets, materialised once per
  resolution because every consumer re-iterates the result.

The source also reports its variable labels. Table sources know them
immediately; callable sources learn them from their first resolution whose
rows all share one key set.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::types::{ParameterError, ParameterResult, ParameterRows, SourceKind};
use neuroval_structures::index_tree::{make_index, union_labels};
use neuroval_structures::{FlatRow, Index, Label, ParameterSet, StructureResult, Table};
use once_cell::unsync::OnceCell;
use tracing::{debug, trace};

/// Callable returning the parameter rows for a model
pub type ParameterCallable<M, E> = Box<dyn Fn(&M) -> Result<ParameterRows, E>>;

/// Callable returning a lazy sequence of parameter sets for a model
pub type ParameterGenerator<M, E> =
    Box<dyn Fn(&M) -> Result<Box<dyn Iterator<Item = ParameterSet>>, E>>;

/// How the parameter sets are specified
pub enum ParameterSpec<M: ?Sized, E> {
    Table(Table),
    Callable(ParameterCallable<M, E>),
    Generator(ParameterGenerator<M, E>),
}

impl<M: ?Sized, E> ParameterSpec<M, E> {
    pub fn kind(&self) -> SourceKind {
        match self {
            ParameterSpec::Table(_) => SourceKind::Table,
            ParameterSpec::Callable(_) => SourceKind::Callable,
            ParameterSpec::Generator(_) => SourceKind::Generator,
        }
    }
}

impl<M: ?Sized, E> std::fmt::Debug for ParameterSpec<M, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterSpec::Table(table) => f
                .debug_struct("Table")
                .field("rows", &table.nrows())
                .field("columns", &table.column_labels())
                .finish(),
            ParameterSpec::Callable(_) => f.write_str("Callable"),
            ParameterSpec::Generator(_) => f.write_str("Generator"),
        }
    }
}

/// Resolves a parameter specification into parameter sets.
///
/// `M` is the model handle passed to callable specifications and `E` the
/// error type those callables return. Errors raised by a callable reach the
/// caller unchanged.
pub struct ParameterSource<M: ?Sized, E = ParameterError> {
    spec: ParameterSpec<M, E>,
    with_labels: bool,
    variables: OnceCell<Vec<Label>>,
}

impl<M: ?Sized, E> std::fmt::Debug for ParameterSource<M, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterSource")
            .field("spec", &self.spec)
            .field("with_labels", &self.with_labels)
            .field("variables", &self.variables.get())
            .finish()
    }
}

impl<M: ?Sized, E> ParameterSource<M, E> {
    fn from_spec(spec: ParameterSpec<M, E>) -> Self {
        Self {
            spec,
            with_labels: true,
            variables: OnceCell::new(),
        }
    }

    /// A source backed by a concrete table.
    ///
    /// Named index levels of `table` count as parameter columns.
    pub fn from_table(table: Table) -> StructureResult<Self> {
        let table = table.reset_index()?;
        let labels: Vec<Label> = table.column_labels().into_iter().cloned().collect();
        let source = Self::from_spec(ParameterSpec::Table(table));
        let _ = source.variables.set(labels);
        Ok(source)
    }

    /// A source whose rows are computed from the model
    pub fn from_callable<F, R>(callable: F) -> Self
    where
        F: Fn(&M) -> Result<R, E> + 'static,
        R: Into<ParameterRows> + 'static,
        M: 'static,
        E: 'static,
    {
        Self::from_spec(ParameterSpec::Callable(Box::new(move |model| {
            callable(model).map(Into::into)
        })))
    }

    /// A source whose rows come from a lazy iterator built from the model
    pub fn from_generator<F, I>(generator: F) -> Self
    where
        F: Fn(&M) -> Result<I, E> + 'static,
        I: IntoIterator<Item = ParameterSet> + 'static,
        I::IntoIter: 'static,
        M: 'static,
        E: 'static,
    {
        Self::from_spec(ParameterSpec::Generator(Box::new(move |model| {
            generator(model)
                .map(|rows| Box::new(rows.into_iter()) as Box<dyn Iterator<Item = ParameterSet>>)
        })))
    }

    /// A source over a fixed list of parameter sets, independent of the model
    pub fn from_sets(sets: Vec<ParameterSet>) -> Self
    where
        M: 'static,
        E: 'static,
    {
        Self::from_callable(move |_: &M| Ok::<_, E>(ParameterRows::Sets(sets.clone())))
    }

    /// Fix the variable labels up front instead of inferring them
    pub fn with_labels(self, labels: Vec<Label>) -> Self {
        let source = Self {
            spec: self.spec,
            with_labels: true,
            variables: OnceCell::new(),
        };
        let _ = source.variables.set(labels);
        source
    }

    /// Disable label inference; [`ParameterSource::variables`] always fails.
    ///
    /// For sources whose parameter sets may expose different key sets.
    pub fn without_labels(self) -> Self {
        Self {
            spec: self.spec,
            with_labels: false,
            variables: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.spec.kind()
    }

    pub fn spec(&self) -> &ParameterSpec<M, E> {
        &self.spec
    }

    pub fn labels_enabled(&self) -> bool {
        self.with_labels
    }

    /// Variable labels of this source, in column order.
    ///
    /// # Errors
    ///
    /// [`ParameterError::LabelsNotAvailable`] before the first resolution of
    /// a callable source, after a resolution with heterogeneous rows, or
    /// when label inference is disabled.
    pub fn variables(&self) -> ParameterResult<&[Label]> {
        if !self.with_labels {
            return Err(ParameterError::LabelsNotAvailable(
                "label inference is disabled for this source".to_string(),
            ));
        }
        self.variables.get().map(Vec::as_slice).ok_or_else(|| {
            ParameterError::LabelsNotAvailable(format!(
                "{} source has not produced uniform parameter sets yet",
                self.kind()
            ))
        })
    }

    /// Row index for a list of resolved parameter sets.
    ///
    /// Does not need [`ParameterSource::variables`]; rows with different
    /// key sets give a union index with `Null` where a row lacks a level.
    pub fn get_index(&self, rows: &[ParameterSet]) -> ParameterResult<Index> {
        let flat = flatten_all(rows)?;
        Ok(make_index(&flat))
    }
}

impl<M: ?Sized, E> ParameterSource<M, E>
where
    E: From<ParameterError>,
{
    /// Resolve the source against `model`, without replication
    pub fn resolve(&self, model: &M) -> Result<Vec<ParameterSet>, E> {
        let (sets, flat) = match &self.spec {
            ParameterSpec::Table(table) => table_rows(table).map_err(E::from)?,
            ParameterSpec::Callable(callable) => match callable(model)? {
                ParameterRows::Table(table) => {
                    let table = table
                        .reset_index()
                        .map_err(|e| E::from(ParameterError::from(e)))?;
                    table_rows(&table).map_err(E::from)?
                }
                ParameterRows::Sets(sets) => {
                    let flat = flatten_all(&sets).map_err(E::from)?;
                    (sets, flat)
                }
            },
            ParameterSpec::Generator(generator) => {
                let sets: Vec<ParameterSet> = generator(model)?.collect();
                let flat = flatten_all(&sets).map_err(E::from)?;
                (sets, flat)
            }
        };

        self.infer_labels(&flat);
        debug!(
            target: "neuroval-parameters",
            "Resolved {} parameter sets from {} source",
            sets.len(),
            self.kind()
        );
        Ok(sets)
    }

    /// Parameter sets to measure, each repeated `size` times in a row.
    ///
    /// Row 0 appears `size` times, then row 1, and so on, so that grouping
    /// the results recovers exactly `size` samples per parameter set.
    pub fn for_sampling(&self, model: &M, size: usize) -> Result<Vec<ParameterSet>, E> {
        if size == 0 {
            return Err(E::from(ParameterError::InvalidSampleSize(size)));
        }
        let sets = self.resolve(model)?;
        let mut replicated = Vec::with_capacity(sets.len() * size);
        for set in sets {
            for _ in 1..size {
                replicated.push(set.clone());
            }
            replicated.push(set);
        }
        trace!(
            target: "neuroval-parameters",
            "Replicated parameter sets {} times: {} total",
            size,
            replicated.len()
        );
        Ok(replicated)
    }

    /// The resolved parameter sets as a flat table, one column per label
    pub fn values(&self, model: &M) -> Result<Table, E> {
        let sets = self.resolve(model)?;
        let flat = flatten_all(&sets).map_err(E::from)?;
        let leading = self.variables.get().cloned().unwrap_or_default();
        Ok(Table::from_records_with_columns(&leading, &flat))
    }

    /// Fix the variable labels on the first resolution whose rows all
    /// share one key set
    fn infer_labels(&self, flat: &[FlatRow]) {
        if !self.with_labels || self.variables.get().is_some() {
            return;
        }
        let Some(first) = flat.first() else {
            return;
        };
        let uniform = flat[1..].iter().all(|row| {
            row.len() == first.len() && row.keys().all(|label| first.contains_key(label))
        });
        if uniform {
            let labels: Vec<Label> = first.keys().cloned().collect();
            debug!(
                target: "neuroval-parameters",
                "Inferred parameter labels: {:?}",
                labels.iter().map(ToString::to_string).collect::<Vec<_>>()
            );
            let _ = self.variables.set(labels);
        } else {
            debug!(
                target: "neuroval-parameters",
                "Parameter sets expose {} different labels; variables stay unavailable",
                union_labels(flat.iter()).len()
            );
        }
    }
}

fn flatten_all(sets: &[ParameterSet]) -> ParameterResult<Vec<FlatRow>> {
    sets.iter()
        .map(|set| set.flatten().map_err(ParameterError::from))
        .collect()
}

fn table_rows(table: &Table) -> ParameterResult<(Vec<ParameterSet>, Vec<FlatRow>)> {
    let flat = table.records();
    let sets = flat
        .iter()
        .map(ParameterSet::from_flat)
        .collect::<StructureResult<Vec<_>>>()?;
    Ok((sets, flat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroval_structures::{Nested, Scalar};

    fn layer_table() -> Table {
        let records: Vec<FlatRow> = ["L1", "L2", "L3"]
            .iter()
            .map(|layer| {
                let mut record = FlatRow::new();
                record.insert(Label::new("layer"), Scalar::from(*layer));
                record
            })
            .collect();
        Table::from_records(&records)
    }

    #[test]
    fn test_table_source_knows_labels_immediately() {
        let source: ParameterSource<()> = ParameterSource::from_table(layer_table()).unwrap();
        assert_eq!(source.kind(), SourceKind::Table);
        assert_eq!(source.variables().unwrap(), &[Label::new("layer")]);
    }

    #[test]
    fn test_replication_order() {
        let source: ParameterSource<()> = ParameterSource::from_table(layer_table()).unwrap();
        let sets = source.for_sampling(&(), 4).unwrap();
        assert_eq!(sets.len(), 12);
        for (position, set) in sets.iter().enumerate() {
            let expected = ["L1", "L2", "L3"][position / 4];
            assert_eq!(set.scalar("layer"), Some(&Scalar::from(expected)));
        }
    }

    #[test]
    fn test_zero_sample_size_is_rejected() {
        let source: ParameterSource<()> = ParameterSource::from_table(layer_table()).unwrap();
        assert_eq!(
            source.for_sampling(&(), 0).unwrap_err(),
            ParameterError::InvalidSampleSize(0)
        );
    }

    #[test]
    fn test_callable_labels_are_lazy() {
        let source: ParameterSource<u32> = ParameterSource::from_callable(|n: &u32| {
            Ok::<_, ParameterError>(
                (0..*n)
                    .map(|i| ParameterSet::new().with("depth", i as i64))
                    .collect::<Vec<_>>(),
            )
        });
        assert!(matches!(
            source.variables(),
            Err(ParameterError::LabelsNotAvailable(_))
        ));
        assert_eq!(source.resolve(&3).unwrap().len(), 3);
        assert_eq!(source.variables().unwrap(), &[Label::new("depth")]);
    }

    #[test]
    fn test_heterogeneous_rows_leave_labels_unavailable() {
        let source: ParameterSource<()> = ParameterSource::from_sets(vec![
            ParameterSet::new().with("layer", "L1"),
            ParameterSet::new().with("layer", "L2").with("mtype", "PC"),
        ]);
        let sets = source.resolve(&()).unwrap();
        assert_eq!(sets.len(), 2);
        assert!(source.variables().is_err());

        let index = source.get_index(&sets).unwrap();
        assert_eq!(index.nlevels(), 2);
        assert_eq!(index.level_values(1), vec![Scalar::Null, Scalar::from("PC")]);
    }

    #[test]
    fn test_generator_is_materialised_per_resolution() {
        let source: ParameterSource<()> = ParameterSource::from_generator(|_: &()| {
            Ok::<_, ParameterError>(
                ["SP", "PC"]
                    .into_iter()
                    .map(|mtype| {
                        let pre: Nested = vec![("mtype", mtype)].into_iter().collect();
                        ParameterSet::new().with("pre", pre)
                    }),
            )
        });
        assert_eq!(source.kind(), SourceKind::Generator);
        assert_eq!(source.for_sampling(&(), 2).unwrap().len(), 4);
        assert_eq!(source.for_sampling(&(), 2).unwrap().len(), 4);
        assert_eq!(source.variables().unwrap(), &[Label::pair("pre", "mtype")]);
    }

    #[test]
    fn test_without_labels_always_fails() {
        let source: ParameterSource<()> = ParameterSource::from_table(layer_table())
            .unwrap()
            .without_labels();
        source.resolve(&()).unwrap();
        assert!(source.variables().is_err());
    }
}
