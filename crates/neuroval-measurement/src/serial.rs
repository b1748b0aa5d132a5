// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Lazy, one-parameter-set-at-a-time measurements.

use crate::collector::{Collected, MeasurementCollector};
use crate::method::MeasurementMethod;
use crate::runner::tag_dataset;
use crate::types::MeasurementError;
use neuroval_structures::{ParameterSet, SamplingMethodology};
use std::fmt;
use std::vec::IntoIter;

/// One element of a serial run
#[derive(Debug, Clone, PartialEq)]
pub struct SerialRecord {
    pub parameters: ParameterSet,
    /// Single-parameter-set measurement, indexed like a batch measurement
    pub measurement: Collected,
    /// Narrative of the measurement method
    pub method: String,
}

/// Iterator over the measurements of a serial run.
///
/// The method is called for a parameter set only when its element is
/// requested; dropping the iterator stops the run. A failing measurement
/// is returned at its position and later elements can still be requested.
pub struct SerialMeasurements<'a, M: ?Sized, P> {
    model: &'a M,
    method: &'a P,
    collector: MeasurementCollector,
    sampling: SamplingMethodology,
    dataset: String,
    description: String,
    sets: IntoIter<ParameterSet>,
}

impl<'a, M, P> SerialMeasurements<'a, M, P>
where
    M: ?Sized,
    P: MeasurementMethod<M>,
{
    pub(crate) fn new(
        model: &'a M,
        method: &'a P,
        collector: MeasurementCollector,
        sampling: SamplingMethodology,
        dataset: String,
        sets: Vec<ParameterSet>,
    ) -> Self {
        Self {
            model,
            method,
            collector,
            sampling,
            description: method.description(),
            dataset,
            sets: sets.into_iter(),
        }
    }
}

impl<'a, M: ?Sized, P> SerialMeasurements<'a, M, P> {
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Parameter sets not yet measured
    pub fn remaining(&self) -> usize {
        self.sets.len()
    }
}

impl<'a, M, P> Iterator for SerialMeasurements<'a, M, P>
where
    M: ?Sized,
    P: MeasurementMethod<M>,
    P::Error: From<MeasurementError>,
{
    type Item = Result<SerialRecord, P::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let parameters = self.sets.next()?;
        let value = match self.method.measure(self.model, &parameters, self.sampling) {
            Ok(value) => value,
            Err(error) => return Some(Err(error)),
        };

        let pair = [(parameters, value)];
        let measurement = self
            .collector
            .collect(&pair)
            .and_then(|collected| tag_dataset(collected, &self.dataset));
        let [(parameters, _)] = pair;

        Some(
            measurement
                .map(|measurement| SerialRecord {
                    parameters,
                    measurement,
                    method: self.description.clone(),
                })
                .map_err(<P::Error>::from),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.sets.size_hint()
    }
}

impl<'a, M, P> ExactSizeIterator for SerialMeasurements<'a, M, P>
where
    M: ?Sized,
    P: MeasurementMethod<M>,
    P::Error: From<MeasurementError>,
{
}

impl<'a, M: ?Sized, P> fmt::Debug for SerialMeasurements<'a, M, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialMeasurements")
            .field("dataset", &self.dataset)
            .field("sampling", &self.sampling)
            .field("strategy", &self.collector.strategy())
            .field("remaining", &self.sets.len())
            .finish()
    }
}
