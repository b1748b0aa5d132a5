// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests: configuration, parameter resolution, measurement and
//! comparison with reference data through the umbrella crate.

use indexmap::IndexMap;
use neuroval::config::load_config;
use neuroval::prelude::*;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, PartialEq)]
enum ValidationError {
    Parameters(ParameterError),
    Measurement(MeasurementError),
}

impl From<ParameterError> for ValidationError {
    fn from(error: ParameterError) -> Self {
        ValidationError::Parameters(error)
    }
}

impl From<MeasurementError> for ValidationError {
    fn from(error: MeasurementError) -> Self {
        ValidationError::Measurement(error)
    }
}

/// A toy circuit: per-region layer densities
struct Circuit {
    label: String,
    regions: Vec<(&'static str, Vec<(&'static str, f64)>)>,
}

fn circuit() -> Circuit {
    Circuit {
        label: "O1".to_string(),
        regions: vec![
            ("A", vec![("L1", 5.0), ("L2", 7.0)]),
            ("B", vec![("L1", 6.0), ("L2", 8.0)]),
        ],
    }
}

fn circuit_label(circuit: &Circuit) -> String {
    circuit.label.clone()
}

fn regions() -> ParameterSource<Circuit, ValidationError> {
    ParameterSource::from_generator(|circuit: &Circuit| {
        Ok(circuit
            .regions
            .iter()
            .map(|(region, _)| ParameterSet::new().with("region", *region))
            .collect::<Vec<_>>())
    })
}

fn layer_profile(
    circuit: &Circuit,
    parameters: &ParameterSet,
    _: SamplingMethodology,
) -> Result<MeasurementValue, ValidationError> {
    let region = parameters.scalar("region").and_then(Scalar::as_str);
    let layers = circuit
        .regions
        .iter()
        .find(|(name, _)| Some(*name) == region)
        .map(|(_, layers)| layers.clone())
        .unwrap_or_default();
    Ok(MeasurementValue::from(Series::from_pairs(layers)))
}

#[test]
fn test_primitive_layer_values() {
    let source: ParameterSource<Circuit, ValidationError> = ParameterSource::from_sets(vec![
        ParameterSet::new().with("layer", "L1"),
        ParameterSet::new().with("layer", "L2"),
    ]);
    let method = FnMethod::new(
        "Layer number times ten.",
        |_: &Circuit, parameters: &ParameterSet, _: SamplingMethodology| {
            let value = match parameters.scalar("layer").and_then(Scalar::as_str) {
                Some("L1") => 10,
                _ => 20,
            };
            Ok::<_, ValidationError>(MeasurementValue::from(value))
        },
    );
    let runner = MeasurementRunner::new(MeasurementCollector::primitive())
        .with_sampling(SamplingMethodology::Exhaustive);

    let measurement = runner
        .batch(&circuit(), &source, &method, &circuit_label)
        .unwrap();
    let table = measurement.data.as_table().unwrap();
    assert_eq!(
        table.index().named_levels(),
        vec![Label::new("dataset"), Label::new("layer")]
    );
    assert_eq!(
        table.index().level_values(1),
        vec![Scalar::from("L1"), Scalar::from("L2")]
    );
    assert_eq!(table.column_labels(), vec![&Label::new("value")]);
    assert_eq!(
        table.columns()[0].values,
        vec![Scalar::from(10), Scalar::from(20)]
    );
}

#[test]
fn test_series_profile_rows_per_layer() {
    let runner = MeasurementRunner::new(MeasurementCollector::series())
        .with_sampling(SamplingMethodology::Exhaustive);
    let method = FnMethod::new("Density profile over layers.", layer_profile);

    let measurement = runner
        .batch(&circuit(), &regions(), &method, &circuit_label)
        .unwrap();
    let table = measurement.data.as_table().unwrap();
    assert_eq!(table.nrows(), 4);
    assert_eq!(
        table.index().named_levels(),
        vec![Label::new("dataset"), Label::new("region"), Label::new("index")]
    );
    assert_eq!(
        table.index().keys()[1],
        vec![Scalar::from("O1"), Scalar::from("A"), Scalar::from("L2")]
    );
    assert_eq!(table.columns()[0].values[1], Scalar::from(7.0));
}

#[test]
fn test_config_file_drives_runner_and_merger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("neuroval.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[measurement]\nsample_size = 4\n\n[reference]\nsamples_per_summary = 25\nseed = 11"
    )
    .unwrap();

    let mut cli = HashMap::new();
    cli.insert("sampling".to_string(), "random".to_string());
    let config = load_config(Some(&path), Some(&cli)).unwrap();
    assert_eq!(config.measurement.sample_size, 4);

    let runner = MeasurementRunner::from_config(&config.measurement, MeasurementCollector::series());
    let method = FnMethod::new("Density profile over layers.", layer_profile);
    let model = runner
        .batch(&circuit(), &regions(), &method, &circuit_label)
        .unwrap()
        .data
        .into_table()
        .unwrap();
    assert_eq!(model.nrows(), 2 * 4 * 2);

    let merger = ReferenceMerger::from_config("density", &config.reference);
    let mut record = neuroval::structures::FlatRow::new();
    record.insert(Label::new("region"), Scalar::from("A"));
    record.insert(Label::new("index"), Scalar::from("L1"));
    record.insert(Label::pair("density", "mean"), Scalar::from(5.5));
    record.insert(Label::pair("density", "std"), Scalar::from(0.5));
    let reference = Table::from_records(&[record])
        .set_index(&[Label::new("region"), Label::new("index")], false)
        .unwrap();

    let mut datasets = IndexMap::new();
    datasets.insert("O1".to_string(), model.clone());
    datasets.insert("Literature".to_string(), reference.clone());

    let samples = merger.concat(&datasets, MeasurementShape::Samples).unwrap();
    assert_eq!(samples.nrows(), 16 + 25);
    assert_eq!(
        samples.index().named_levels(),
        vec![Label::new("dataset"), Label::new("region"), Label::new("index")]
    );

    let again = merger.concat(&datasets, MeasurementShape::Samples).unwrap();
    assert_eq!(samples, again);

    let summary = merger.concat(&datasets, MeasurementShape::Summary).unwrap();
    assert_eq!(summary.nrows(), 4 + 1);
}

#[test]
fn test_serial_stops_early() {
    let runner = MeasurementRunner::new(MeasurementCollector::primitive())
        .with_processing(ProcessingMethodology::Serial)
        .with_sample_size(20);
    let calls = std::cell::Cell::new(0);
    let method = FnMethod::new(
        "Counted.",
        |_: &Circuit, _: &ParameterSet, _: SamplingMethodology| {
            calls.set(calls.get() + 1);
            Ok::<_, ValidationError>(MeasurementValue::from(1.0))
        },
    );
    let model = circuit();
    let source = regions();

    let output = runner.run(&model, &source, &method, &circuit_label).unwrap();
    let mut serial = match output {
        RunOutput::Serial(serial) => serial,
        RunOutput::Batch(_) => panic!("serial processing was configured"),
    };
    assert_eq!(serial.len(), 40);
    let first: SerialRecord = serial.next().unwrap().unwrap();
    assert_eq!(first.parameters, ParameterSet::new().with("region", "A"));
    drop(serial);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_variables_fixed_after_first_resolution() {
    let source = regions();
    assert!(source.variables().is_err());
    let runner = MeasurementRunner::new(MeasurementCollector::series());
    let method = FnMethod::new("Density profile over layers.", layer_profile);
    runner
        .batch(&circuit(), &source, &method, &circuit_label)
        .unwrap();
    assert_eq!(source.variables().unwrap(), &[Label::new("region")]);
}

#[test]
fn test_init_rejects_invalid_configuration() {
    let mut config = NeurovalConfig::default();
    config.measurement.sample_size = 0;
    let error = neuroval::init(&config).unwrap_err();
    assert!(error.to_string().contains("Invalid neuroval configuration"));
}
