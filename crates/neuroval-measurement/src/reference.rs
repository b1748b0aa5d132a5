// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Normalisation and union of reference datasets with model measurements.

Reference data arrives either as samples (one row per observation) or as
summaries (mean and std per parameter combination). [`ReferenceMerger`]
converts between the two and concatenates several datasets under a
`dataset` index level so model and reference values can be compared
side by side.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::runner::DATASET_LEVEL;
use crate::shape::{classify, describe, is_sample, statistic_label, MeasurementShape, MEAN, SIZE, STD};
use crate::types::{MeasurementError, MeasurementResult};
use indexmap::IndexMap;
use ndarray::Array1;
use neuroval_config::ReferenceConfig;
use neuroval_structures::{Column, Index, Label, Scalar, StructureError, Table};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::{debug, info};

/// Converts and merges measurements of one phenomenon
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceMerger {
    phenomenon: String,
    samples_per_summary: usize,
    seed: Option<u64>,
}

impl ReferenceMerger {
    pub fn new(phenomenon: impl Into<String>) -> Self {
        let defaults = ReferenceConfig::default();
        Self {
            phenomenon: phenomenon.into(),
            samples_per_summary: defaults.samples_per_summary,
            seed: defaults.seed,
        }
    }

    pub fn from_config(phenomenon: impl Into<String>, config: &ReferenceConfig) -> Self {
        Self {
            phenomenon: phenomenon.into(),
            samples_per_summary: config.samples_per_summary,
            seed: config.seed,
        }
    }

    /// Samples drawn per summary row by [`ReferenceMerger::concat`]
    pub fn with_samples_per_summary(mut self, samples: usize) -> Self {
        self.samples_per_summary = samples;
        self
    }

    /// Fix the random draws; entropy is used otherwise
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn phenomenon(&self) -> &str {
        &self.phenomenon
    }

    pub fn samples_per_summary(&self) -> usize {
        self.samples_per_summary
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn classify(&self, table: &Table) -> MeasurementResult<MeasurementShape> {
        classify(table, &self.phenomenon)
    }

    /// `n` draws from N(mean, std^2). A NaN statistic yields NaN draws.
    fn normal_draws<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        mean: f64,
        std: f64,
        n: usize,
    ) -> MeasurementResult<Vec<f64>> {
        if mean.is_nan() || std.is_nan() {
            return Ok(vec![f64::NAN; n]);
        }
        let normal = Normal::new(mean, std).map_err(|error| MeasurementError::InvalidStatistic {
            phenomenon: self.phenomenon.clone(),
            mean,
            std,
            reason: error.to_string(),
        })?;
        Ok((0..n).map(|_| normal.sample(rng)).collect())
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Sample-shaped version of `table`.
    ///
    /// A summary yields `n` normal draws per row from its `mean` and `std`;
    /// `std = 0` gives `n` copies of the mean. Sample tables come back
    /// unchanged.
    pub fn to_samples(&self, table: &Table, n: usize) -> MeasurementResult<Table> {
        let mut rng = self.rng();
        self.to_samples_with_rng(table, n, &mut rng)
    }

    /// [`ReferenceMerger::to_samples`] drawing from `rng`
    pub fn to_samples_with_rng<R: Rng + ?Sized>(
        &self,
        table: &Table,
        n: usize,
        rng: &mut R,
    ) -> MeasurementResult<Table> {
        if self.classify(table)? == MeasurementShape::Samples {
            return Ok(table.clone());
        }
        self.draw_samples(table, n, rng)
    }

    /// Normal draws from every row of a summary table
    fn draw_samples<R: Rng + ?Sized>(
        &self,
        table: &Table,
        n: usize,
        rng: &mut R,
    ) -> MeasurementResult<Table> {
        let means = statistic(table, &statistic_label(&self.phenomenon, MEAN))?;
        let stds = statistic(table, &statistic_label(&self.phenomenon, STD))?;

        let mut keys = Vec::with_capacity(table.nrows() * n);
        let mut values = Vec::with_capacity(table.nrows() * n);
        for (row, key) in table.index().keys().iter().enumerate() {
            let draws = self.normal_draws(rng, means[row], stds[row], n)?;
            keys.extend(std::iter::repeat(key).take(n).cloned());
            values.extend(draws.into_iter().map(Scalar::Float));
        }

        debug!(
            target: "neuroval-measurement",
            "Drew {} samples for each of {} summary rows of {}",
            n,
            table.nrows(),
            self.phenomenon
        );
        let index = Index::new(table.index().names().to_vec(), keys)?;
        Ok(Table::new(
            index,
            vec![Column::new(self.phenomenon.as_str(), values)],
        )?)
    }

    /// Summary-shaped version of `table`.
    ///
    /// Samples are grouped by every index level (groups sorted by key) and
    /// reduced to `size`, `mean` and `std` (one degree of freedom; NaN with
    /// fewer than two values). NaN samples count towards `size` only.
    /// Summary tables come back unchanged.
    pub fn to_summary(&self, table: &Table) -> MeasurementResult<Table> {
        if self.classify(table)? == MeasurementShape::Summary {
            return Ok(table.clone());
        }
        self.reduce_samples(table)
    }

    /// Size, mean and std of every index group of a sample table
    fn reduce_samples(&self, table: &Table) -> MeasurementResult<Table> {
        let levels = table.index().named_levels();
        let sample_label = table.columns()[0].label.clone();
        let samples = table.numeric_column(&sample_label)?;
        let groups = table.group_rows(&levels)?;

        let mut keys = Vec::with_capacity(groups.len());
        let mut sizes = Vec::with_capacity(groups.len());
        let mut means = Vec::with_capacity(groups.len());
        let mut stds = Vec::with_capacity(groups.len());
        for (key, rows) in groups {
            let observed: Array1<f64> = rows
                .iter()
                .map(|&row| samples[row])
                .filter(|value| !value.is_nan())
                .collect();
            let mean = observed.mean().unwrap_or(f64::NAN);
            let std = if observed.len() > 1 {
                observed.std(1.0)
            } else {
                f64::NAN
            };
            keys.push(key);
            sizes.push(Scalar::from(rows.len()));
            means.push(Scalar::Float(mean));
            stds.push(Scalar::Float(std));
        }

        let index = Index::new(levels.into_iter().map(Some).collect(), keys)?;
        Ok(Table::new(
            index,
            vec![
                Column::new(statistic_label(&self.phenomenon, SIZE), sizes),
                Column::new(statistic_label(&self.phenomenon, MEAN), means),
                Column::new(statistic_label(&self.phenomenon, STD), stds),
            ],
        )?)
    }

    /// A collected measurement with its value column named after the
    /// phenomenon.
    ///
    /// # Errors
    ///
    /// [`MeasurementError::AmbiguousMeasurementShape`] unless the measurement
    /// has exactly one data column and a fully named index.
    pub fn as_samples(&self, measurement: &Table) -> MeasurementResult<Table> {
        let mut samples = measurement.clone();
        if let [column] = measurement.columns() {
            samples.rename_column(&column.label, self.phenomenon.as_str())?;
        }
        if !is_sample(&samples) {
            return Err(MeasurementError::AmbiguousMeasurementShape {
                phenomenon: self.phenomenon.clone(),
                description: describe(measurement),
            });
        }
        Ok(samples)
    }

    /// Summary statistics of a collected measurement
    pub fn summarize(&self, measurement: &Table) -> MeasurementResult<Table> {
        self.to_summary(&self.as_samples(measurement)?)
    }

    /// Convert every dataset to `shape` and stack them under a `dataset`
    /// index level, followed by the shared parameter levels.
    ///
    /// An existing `dataset` level in an input is replaced by its key in
    /// `datasets`.
    ///
    /// # Errors
    ///
    /// [`MeasurementError::ShapeMismatch`] when two datasets expose different
    /// parameter columns after conversion.
    pub fn concat(
        &self,
        datasets: &IndexMap<String, Table>,
        shape: MeasurementShape,
    ) -> MeasurementResult<Table> {
        let dataset_label = Label::new(DATASET_LEVEL);
        let phenomenon = Label::new(self.phenomenon.as_str());
        let mut rng = self.rng();
        let mut parts = Vec::with_capacity(datasets.len());
        let mut shared: Option<(&str, Vec<Label>)> = None;

        for (name, table) in datasets {
            // classified with its dataset level, which may be the only one
            let input = self.classify(table)?;
            let mut table = table.clone();
            if table.index().level_position(&dataset_label).is_some() {
                table.drop_index_level(&dataset_label)?;
            }

            let converted = match (input, shape) {
                (MeasurementShape::Summary, MeasurementShape::Samples) => {
                    self.draw_samples(&table, self.samples_per_summary, &mut rng)?
                }
                (MeasurementShape::Samples, MeasurementShape::Summary) => {
                    self.reduce_samples(&table)?
                }
                _ => table,
            };
            let mut flat = converted.reset_index()?;
            let data: Vec<Label> = match shape {
                MeasurementShape::Samples => {
                    let sample_label = converted.columns()[0].label.clone();
                    flat.rename_column(&sample_label, phenomenon.clone())?;
                    vec![phenomenon.clone()]
                }
                MeasurementShape::Summary => converted
                    .column_labels()
                    .into_iter()
                    .cloned()
                    .collect(),
            };
            let params: Vec<Label> = flat
                .column_labels()
                .into_iter()
                .filter(|label| !data.contains(label))
                .cloned()
                .collect();

            match &shared {
                None => shared = Some((name.as_str(), params)),
                Some((first, expected)) => {
                    let same = expected.len() == params.len()
                        && params.iter().all(|label| expected.contains(label));
                    if !same {
                        return Err(MeasurementError::ShapeMismatch {
                            datasets: vec![first.to_string(), name.clone()],
                            detail: format!(
                                "[{}] vs [{}]",
                                join_labels(expected),
                                join_labels(&params)
                            ),
                        });
                    }
                }
            }

            let tags = vec![Scalar::from(name.as_str()); flat.nrows()];
            flat.insert_column(0, dataset_label.clone(), tags)?;
            parts.push(flat);
        }

        let Some((_, params)) = shared else {
            return Ok(Table::empty());
        };

        let combined = Table::concat(&parts)?;
        let mut index = vec![dataset_label];
        index.extend(params);
        let merged = combined.set_index(&index, false)?;
        info!(
            target: "neuroval-measurement",
            "Merged {} datasets of {} as {}: {} rows",
            datasets.len(),
            self.phenomenon,
            shape,
            merged.nrows()
        );
        Ok(merged)
    }
}

/// A statistic column as floats, reporting text cells as non-numeric
fn statistic(table: &Table, label: &Label) -> MeasurementResult<Array1<f64>> {
    table.numeric_column(label).map_err(|error| match error {
        StructureError::NonNumeric { column, value } => {
            MeasurementError::NonNumeric { column, value }
        }
        other => other.into(),
    })
}


fn join_labels(labels: &[Label]) -> String {
    labels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
