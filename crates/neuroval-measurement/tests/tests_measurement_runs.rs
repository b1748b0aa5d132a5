// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for measurement runs
//!
//! Covers sampling policies, serial laziness, failure propagation and the
//! cached and parallel batch paths against a small circuit model.

use neuroval_measurement::{
    FnMethod, LabelProvider, MeasurementCache, MeasurementCollector, MeasurementError,
    MeasurementMethod, MeasurementRunner, MeasurementValue, Series,
};
use neuroval_parameters::{ParameterError, ParameterSource};
use neuroval_structures::{
    Label, ParameterSet, ProcessingMethodology, SamplingMethodology, Scalar,
};
use std::cell::Cell;

#[derive(Debug, PartialEq)]
enum AnalysisError {
    Parameters(ParameterError),
    Measurement(MeasurementError),
    EmptyLayer(String),
}

impl From<ParameterError> for AnalysisError {
    fn from(error: ParameterError) -> Self {
        AnalysisError::Parameters(error)
    }
}

impl From<MeasurementError> for AnalysisError {
    fn from(error: MeasurementError) -> Self {
        AnalysisError::Measurement(error)
    }
}

struct Circuit {
    name: &'static str,
    layers: Vec<(&'static str, f64)>,
}

fn circuit() -> Circuit {
    Circuit {
        name: "O1",
        layers: vec![("L1", 10.0), ("L2", 20.0), ("L3", 0.0)],
    }
}

fn layers(count: usize) -> ParameterSource<Circuit, AnalysisError> {
    ParameterSource::from_callable(move |circuit: &Circuit| {
        Ok(circuit
            .layers
            .iter()
            .take(count)
            .map(|(layer, _)| ParameterSet::new().with("layer", *layer))
            .collect::<Vec<_>>())
    })
}

fn layer_density(circuit: &Circuit, layer: &str) -> Result<f64, AnalysisError> {
    circuit
        .layers
        .iter()
        .find(|(name, _)| *name == layer)
        .map(|(_, density)| *density)
        .filter(|density| *density > 0.0)
        .ok_or_else(|| AnalysisError::EmptyLayer(layer.to_string()))
}

/// Counts calls so laziness can be observed
struct CountingDensity {
    calls: Cell<usize>,
}

impl MeasurementMethod<Circuit> for CountingDensity {
    type Error = AnalysisError;

    fn measure(
        &self,
        circuit: &Circuit,
        parameters: &ParameterSet,
        _sampling: SamplingMethodology,
    ) -> Result<MeasurementValue, AnalysisError> {
        self.calls.set(self.calls.get() + 1);
        let layer = parameters
            .scalar("layer")
            .and_then(Scalar::as_str)
            .unwrap_or_default();
        layer_density(circuit, layer).map(MeasurementValue::from)
    }

    fn description(&self) -> String {
        "Cell density per layer.".to_string()
    }
}

fn counting() -> CountingDensity {
    CountingDensity {
        calls: Cell::new(0),
    }
}

fn circuit_name(circuit: &Circuit) -> String {
    circuit.name.to_string()
}

#[test]
fn test_random_sampling_replicates_every_parameter_set() {
    let runner = MeasurementRunner::new(MeasurementCollector::primitive());
    let method = counting();
    let measurement = runner
        .batch(&circuit(), &layers(2), &method, &circuit_name)
        .unwrap();

    assert_eq!(runner.sample_size(), 20);
    assert_eq!(measurement.parameter_sets, 40);
    assert_eq!(method.calls.get(), 40);
    let table = measurement.data.as_table().unwrap();
    assert_eq!(table.nrows(), 40);
    assert!(table.index().keys()[..20]
        .iter()
        .all(|key| key == &vec![Scalar::from("O1"), Scalar::from("L1")]));
}

#[test]
fn test_exhaustive_sampling_measures_once() {
    let runner = MeasurementRunner::new(MeasurementCollector::primitive())
        .with_sampling(SamplingMethodology::Exhaustive);
    let measurement = runner
        .batch(&circuit(), &layers(2), &counting(), &circuit_name)
        .unwrap();

    let table = measurement.data.as_table().unwrap();
    assert_eq!(table.nrows(), 2);
    assert_eq!(
        table.columns()[0].values,
        vec![Scalar::Float(10.0), Scalar::Float(20.0)]
    );
    assert_eq!(measurement.method, "Cell density per layer.");
}

#[test]
fn test_serial_measures_only_what_is_consumed() {
    let runner = MeasurementRunner::new(MeasurementCollector::primitive())
        .with_processing(ProcessingMethodology::Serial)
        .with_sample_size(3);
    let model = circuit();
    let source = layers(2);
    let method = counting();

    let mut serial = runner
        .serial(&model, &source, &method, &circuit_name)
        .unwrap();
    assert_eq!(method.calls.get(), 0);
    assert_eq!(serial.len(), 6);

    let first = serial.next().unwrap().unwrap();
    assert_eq!(method.calls.get(), 1);
    assert_eq!(first.parameters, ParameterSet::new().with("layer", "L1"));
    assert_eq!(first.method, "Cell density per layer.");
    let table = first.measurement.as_table().unwrap();
    assert_eq!(table.nrows(), 1);
    assert_eq!(
        table.index().named_levels(),
        vec![Label::new("dataset"), Label::new("layer")]
    );

    drop(serial);
    assert_eq!(method.calls.get(), 1);
}

#[test]
fn test_batch_failure_aborts_run() {
    let runner = MeasurementRunner::new(MeasurementCollector::primitive())
        .with_sampling(SamplingMethodology::Exhaustive);
    let result = runner.batch(&circuit(), &layers(3), &counting(), &circuit_name);
    assert_eq!(result, Err(AnalysisError::EmptyLayer("L3".to_string())));
}

#[test]
fn test_serial_failure_is_reported_in_place() {
    let runner = MeasurementRunner::new(MeasurementCollector::primitive())
        .with_sampling(SamplingMethodology::Exhaustive);
    let model = circuit();
    let source = layers(3);
    let method = counting();

    let results: Vec<_> = runner
        .serial(&model, &source, &method, &circuit_name)
        .unwrap()
        .collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert_eq!(
        results[2].as_ref().unwrap_err(),
        &AnalysisError::EmptyLayer("L3".to_string())
    );
}

#[test]
fn test_parameter_failure_surfaces_before_measuring() {
    let runner = MeasurementRunner::new(MeasurementCollector::primitive());
    let method = counting();
    let result = runner.batch(&circuit(), &layers(2), &method, &circuit_name);
    assert!(result.is_ok());

    let zero = MeasurementRunner::new(MeasurementCollector::primitive()).with_sample_size(0);
    let result = zero.batch(&circuit(), &layers(2), &method, &circuit_name);
    assert_eq!(
        result,
        Err(AnalysisError::Parameters(ParameterError::InvalidSampleSize(0)))
    );
}

#[test]
fn test_multi_measurement_through_runner() {
    let runner = MeasurementRunner::new(MeasurementCollector::multi())
        .with_sampling(SamplingMethodology::Exhaustive);
    let method = FnMethod::new(
        "Density and its depth profile.",
        |circuit: &Circuit, parameters: &ParameterSet, _: SamplingMethodology| {
            let layer = parameters
                .scalar("layer")
                .and_then(Scalar::as_str)
                .unwrap_or_default();
            let density = layer_density(circuit, layer)?;
            Ok::<_, AnalysisError>(MeasurementValue::multi([
                ("density", MeasurementValue::from(density)),
                (
                    "profile",
                    MeasurementValue::from(Series::named(
                        "depth",
                        [(0_i64, density), (100_i64, density / 2.0)],
                    )),
                ),
            ]))
        },
    );

    let measurement = runner
        .batch(&circuit(), &layers(2), &method, &circuit_name)
        .unwrap();
    let density = measurement.data.get("density").unwrap();
    let profile = measurement.data.get("profile").unwrap();
    assert_eq!(density.nrows(), 2);
    assert_eq!(profile.nrows(), 4);
    assert_eq!(
        profile.index().named_levels(),
        vec![Label::new("dataset"), Label::new("layer"), Label::new("depth")]
    );
}

#[test]
fn test_cache_distinguishes_datasets() {
    let runner = MeasurementRunner::new(MeasurementCollector::primitive()).with_sample_size(2);
    let mut cache = MeasurementCache::default();
    let source = layers(1);
    let method = counting();
    let other = |_: &Circuit| "O2".to_string();

    runner
        .batch_cached(&mut cache, &circuit(), &source, &method, &circuit_name)
        .unwrap();
    runner
        .batch_cached(&mut cache, &circuit(), &source, &method, &other)
        .unwrap();
    runner
        .batch_cached(&mut cache, &circuit(), &source, &method, &circuit_name)
        .unwrap();

    assert_eq!(method.calls.get(), 4);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().cache_hits, 1);
}

#[test]
fn test_closure_label_provider_is_used() {
    let label = |circuit: &Circuit| format!("{}-model", circuit.name);
    assert_eq!(label.get_label(&circuit()), "O1-model");
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_batch_matches_sequential_batch() {
    let runner = MeasurementRunner::new(MeasurementCollector::primitive())
        .with_sample_size(5);
    let method = FnMethod::new(
        "Cell density per layer.",
        |circuit: &Circuit, parameters: &ParameterSet, _: SamplingMethodology| {
            let layer = parameters
                .scalar("layer")
                .and_then(Scalar::as_str)
                .unwrap_or_default();
            layer_density(circuit, layer).map(MeasurementValue::from)
        },
    );
    let source = ParameterSource::<Circuit, AnalysisError>::from_sets(vec![
        ParameterSet::new().with("layer", "L1"),
        ParameterSet::new().with("layer", "L2"),
    ]);

    let sequential = runner
        .batch(&circuit(), &source, &method, &circuit_name)
        .unwrap();
    let parallel = runner
        .batch_parallel(&circuit(), &source, &method, &circuit_name)
        .unwrap();
    assert_eq!(sequential, parallel);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_batch_measures_on_pool_workers() {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .build()
        .unwrap();
    let workers = std::sync::Mutex::new(Vec::new());
    let method = FnMethod::new(
        "Records the measuring worker.",
        |_: &Circuit, _: &ParameterSet, _: SamplingMethodology| {
            workers.lock().unwrap().push(rayon::current_thread_index());
            Ok::<_, AnalysisError>(MeasurementValue::from(1.0))
        },
    );
    let runner = MeasurementRunner::new(MeasurementCollector::primitive()).with_sample_size(8);
    let source = layers(2);
    let model = circuit();

    let measurement = pool
        .install(|| runner.batch_parallel(&model, &source, &method, &circuit_name))
        .unwrap();
    assert_eq!(measurement.parameter_sets, 16);

    let workers = workers.lock().unwrap();
    assert_eq!(workers.len(), 16);
    assert!(workers.iter().all(Option::is_some));
}
