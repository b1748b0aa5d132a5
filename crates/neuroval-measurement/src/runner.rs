// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Measurement runs.

A [`MeasurementRunner`] ties a [`ParameterSource`], a [`MeasurementMethod`]
and a [`MeasurementCollector`] together under two independent policies:

- **sampling**: `random` measures every parameter set `sample_size` times,
  `exhaustive` measures it once;
- **processing**: `batch` measures everything and assembles one table,
  `serial` yields one single-row measurement per parameter set, lazily.

Either way the dataset label of the model is folded into the row index as
a leading `dataset` level.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use crate::cache::{parameters_fingerprint, CacheKey, CachedMeasurement, MeasurementCache};
use crate::collector::{Collected, MeasurementCollector, MeasurementPair};
use crate::method::{LabelProvider, MeasurementMethod};
use crate::serial::SerialMeasurements;
use crate::types::{MeasurementError, MeasurementResult};
use neuroval_config::MeasurementConfig;
use neuroval_parameters::{ParameterError, ParameterSource};
use neuroval_structures::{ProcessingMethodology, SamplingMethodology, Scalar};
use tracing::{debug, info};

/// Index level holding the dataset label
pub const DATASET_LEVEL: &str = "dataset";

/// Result of a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchMeasurement {
    pub data: Collected,
    /// Narrative of the measurement method
    pub method: String,
    pub dataset: String,
    /// Number of parameter sets measured, replicates included
    pub parameter_sets: usize,
}

/// Result of [`MeasurementRunner::run`], by processing policy
pub enum RunOutput<'a, M: ?Sized, P> {
    Batch(BatchMeasurement),
    Serial(SerialMeasurements<'a, M, P>),
}

impl<'a, M: ?Sized, P> RunOutput<'a, M, P> {
    pub fn into_batch(self) -> Option<BatchMeasurement> {
        match self {
            RunOutput::Batch(batch) => Some(batch),
            RunOutput::Serial(_) => None,
        }
    }

    pub fn into_serial(self) -> Option<SerialMeasurements<'a, M, P>> {
        match self {
            RunOutput::Serial(serial) => Some(serial),
            RunOutput::Batch(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRunner {
    sampling: SamplingMethodology,
    processing: ProcessingMethodology,
    sample_size: usize,
    collector: MeasurementCollector,
}

impl MeasurementRunner {
    /// A runner with the default policies: random sampling of 20, batch processing
    pub fn new(collector: MeasurementCollector) -> Self {
        Self::from_config(&MeasurementConfig::default(), collector)
    }

    pub fn from_config(config: &MeasurementConfig, collector: MeasurementCollector) -> Self {
        Self {
            sampling: config.sampling,
            processing: config.processing,
            sample_size: config.sample_size,
            collector,
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingMethodology) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_processing(mut self, processing: ProcessingMethodology) -> Self {
        self.processing = processing;
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn sampling(&self) -> SamplingMethodology {
        self.sampling
    }

    pub fn processing(&self) -> ProcessingMethodology {
        self.processing
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn collector(&self) -> &MeasurementCollector {
        &self.collector
    }

    /// Measurements taken per parameter set under the sampling policy
    pub fn replication(&self) -> usize {
        match self.sampling {
            SamplingMethodology::Random => self.sample_size,
            SamplingMethodology::Exhaustive => 1,
        }
    }

    /// Measure with the configured processing policy
    pub fn run<'a, M, P, L, E>(
        &'a self,
        model: &'a M,
        source: &ParameterSource<M, E>,
        method: &'a P,
        labeler: &L,
    ) -> Result<RunOutput<'a, M, P>, E>
    where
        M: ?Sized,
        P: MeasurementMethod<M, Error = E>,
        L: LabelProvider<M> + ?Sized,
        E: From<ParameterError> + From<MeasurementError>,
    {
        match self.processing {
            ProcessingMethodology::Batch => self
                .batch(model, source, method, labeler)
                .map(RunOutput::Batch),
            ProcessingMethodology::Serial => self
                .serial(model, source, method, labeler)
                .map(RunOutput::Serial),
        }
    }

    /// Measure every parameter set and assemble one measurement.
    ///
    /// The first failing measurement aborts the run.
    pub fn batch<M, P, L, E>(
        &self,
        model: &M,
        source: &ParameterSource<M, E>,
        method: &P,
        labeler: &L,
    ) -> Result<BatchMeasurement, E>
    where
        M: ?Sized,
        P: MeasurementMethod<M, Error = E>,
        L: LabelProvider<M> + ?Sized,
        E: From<ParameterError> + From<MeasurementError>,
    {
        let sets = source.for_sampling(model, self.replication())?;
        let dataset = labeler.get_label(model);
        let pairs = sets
            .into_iter()
            .map(|set| -> Result<MeasurementPair, E> {
                let value = method.measure(model, &set, self.sampling)?;
                Ok((set, value))
            })
            .collect::<Result<Vec<MeasurementPair>, E>>()?;
        self.finish(&pairs, method.description(), dataset)
            .map_err(E::from)
    }

    /// [`MeasurementRunner::batch`], reusing a measurement from `cache`
    /// when the same parameter sets were already measured for this dataset
    pub fn batch_cached<M, P, L, E>(
        &self,
        cache: &mut MeasurementCache,
        model: &M,
        source: &ParameterSource<M, E>,
        method: &P,
        labeler: &L,
    ) -> Result<BatchMeasurement, E>
    where
        M: ?Sized,
        P: MeasurementMethod<M, Error = E>,
        L: LabelProvider<M> + ?Sized,
        E: From<ParameterError> + From<MeasurementError>,
    {
        let sets = source.for_sampling(model, self.replication())?;
        let dataset = labeler.get_label(model);
        let description = method.description();
        let key = CacheKey {
            dataset: dataset.clone(),
            method: description.clone(),
            strategy: self.collector.strategy(),
            sampling: self.sampling,
            replication: self.replication(),
            parameters: parameters_fingerprint(&sets).map_err(E::from)?,
        };

        if let Some(cached) = cache.get(&key) {
            debug!(
                target: "neuroval-measurement",
                "Reusing cached measurement of {} parameter sets for {}",
                cached.parameter_sets,
                dataset
            );
            return Ok(BatchMeasurement {
                data: cached.data,
                method: description,
                dataset,
                parameter_sets: cached.parameter_sets,
            });
        }

        let pairs = sets
            .into_iter()
            .map(|set| -> Result<MeasurementPair, E> {
                let value = method.measure(model, &set, self.sampling)?;
                Ok((set, value))
            })
            .collect::<Result<Vec<MeasurementPair>, E>>()?;
        let measurement = self.finish(&pairs, description, dataset).map_err(E::from)?;
        cache.insert(
            key,
            CachedMeasurement {
                data: measurement.data.clone(),
                parameter_sets: measurement.parameter_sets,
            },
        );
        Ok(measurement)
    }

    /// [`MeasurementRunner::batch`] with the measurements spread over the
    /// rayon thread pool. Results are reassembled in parameter-set order.
    #[cfg(feature = "parallel")]
    pub fn batch_parallel<M, P, L, E>(
        &self,
        model: &M,
        source: &ParameterSource<M, E>,
        method: &P,
        labeler: &L,
    ) -> Result<BatchMeasurement, E>
    where
        M: ?Sized + Sync,
        P: MeasurementMethod<M, Error = E> + Sync,
        L: LabelProvider<M> + ?Sized,
        E: From<ParameterError> + From<MeasurementError> + Send,
    {
        use rayon::prelude::*;

        let sets = source.for_sampling(model, self.replication())?;
        let dataset = labeler.get_label(model);
        let sampling = self.sampling;
        let pairs = sets
            .into_par_iter()
            .map(|set| -> Result<MeasurementPair, E> {
                let value = method.measure(model, &set, sampling)?;
                Ok((set, value))
            })
            .collect::<Result<Vec<MeasurementPair>, E>>()?;
        self.finish(&pairs, method.description(), dataset)
            .map_err(E::from)
    }

    /// Lazily measure one parameter set at a time.
    ///
    /// Parameter sets are resolved up front; the method runs only when the
    /// corresponding element is requested.
    pub fn serial<'a, M, P, L, E>(
        &'a self,
        model: &'a M,
        source: &ParameterSource<M, E>,
        method: &'a P,
        labeler: &L,
    ) -> Result<SerialMeasurements<'a, M, P>, E>
    where
        M: ?Sized,
        P: MeasurementMethod<M, Error = E>,
        L: LabelProvider<M> + ?Sized,
        E: From<ParameterError> + From<MeasurementError>,
    {
        let sets = source.for_sampling(model, self.replication())?;
        let dataset = labeler.get_label(model);
        debug!(
            target: "neuroval-measurement",
            "Serial measurement of {} parameter sets for {}",
            sets.len(),
            dataset
        );
        Ok(SerialMeasurements::new(
            model,
            method,
            self.collector,
            self.sampling,
            dataset,
            sets,
        ))
    }

    fn finish(
        &self,
        pairs: &[MeasurementPair],
        method: String,
        dataset: String,
    ) -> MeasurementResult<BatchMeasurement> {
        let data = tag_dataset(self.collector.collect(pairs)?, &dataset)?;
        info!(
            target: "neuroval-measurement",
            "Measured {} parameter sets of {} ({} collection, {} sampling)",
            pairs.len(),
            dataset,
            self.collector.strategy(),
            self.sampling
        );
        Ok(BatchMeasurement {
            data,
            method,
            dataset,
            parameter_sets: pairs.len(),
        })
    }
}

/// Fold the dataset label into every table as the leading index level
pub(crate) fn tag_dataset(collected: Collected, dataset: &str) -> MeasurementResult<Collected> {
    collected.try_map(|mut table| {
        let tags = vec![Scalar::from(dataset); table.nrows()];
        table.insert_index_level(0, DATASET_LEVEL, tags)?;
        Ok(table)
    })
}
