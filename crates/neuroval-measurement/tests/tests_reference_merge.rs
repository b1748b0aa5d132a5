// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for reference merging
//!
//! Model measurements produced by the runner are combined with reference
//! summaries and samples of the same phenomenon.

use indexmap::IndexMap;
use neuroval_measurement::{
    FixedLabel, FnMethod, MeasurementCollector, MeasurementError, MeasurementRunner,
    MeasurementShape, MeasurementValue, ReferenceMerger,
};
use neuroval_parameters::ParameterSource;
use neuroval_structures::{FlatRow, Label, ParameterSet, SamplingMethodology, Scalar, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn reference_summary(rows: &[(&str, f64, f64)]) -> Table {
    let records: Vec<FlatRow> = rows
        .iter()
        .map(|(layer, mean, std)| {
            let mut record = FlatRow::new();
            record.insert(Label::new("layer"), Scalar::from(*layer));
            record.insert(Label::pair("density", "mean"), Scalar::from(*mean));
            record.insert(Label::pair("density", "std"), Scalar::from(*std));
            record
        })
        .collect();
    Table::from_records(&records)
        .set_index(&[Label::new("layer")], false)
        .unwrap()
}

fn model_measurement(sample_size: usize) -> Table {
    let source: ParameterSource<(), MeasurementError> = ParameterSource::from_sets(vec![
        ParameterSet::new().with("layer", "L1"),
        ParameterSet::new().with("layer", "L2"),
    ]);
    let method = FnMethod::new(
        "Constant density.",
        |_: &(), _: &ParameterSet, _: SamplingMethodology| {
            Ok::<_, MeasurementError>(MeasurementValue::from(95.0))
        },
    );
    MeasurementRunner::new(MeasurementCollector::primitive())
        .with_sample_size(sample_size)
        .batch(&(), &source, &method, &FixedLabel("O1".to_string()))
        .unwrap()
        .data
        .into_table()
        .unwrap()
}

#[test]
fn test_summary_draws_follow_mean() {
    let merger = ReferenceMerger::new("density");
    let mut rng = StdRng::seed_from_u64(7);
    let samples = merger
        .to_samples_with_rng(&reference_summary(&[("L1", 100.0, 10.0)]), 1000, &mut rng)
        .unwrap();

    assert_eq!(samples.nrows(), 1000);
    assert_eq!(samples.index().named_levels(), vec![Label::new("layer")]);
    let values = samples.numeric_column(&Label::new("density")).unwrap();
    let mean = values.mean().unwrap();
    let standard_error = 10.0 / (1000.0_f64).sqrt();
    assert!((mean - 100.0).abs() < 3.0 * standard_error, "mean {}", mean);
}

#[test]
fn test_zero_std_gives_copies_of_mean() {
    let merger = ReferenceMerger::new("density").with_seed(1);
    let samples = merger
        .to_samples(&reference_summary(&[("L1", 42.0, 0.0)]), 5)
        .unwrap();
    assert_eq!(samples.columns()[0].values, vec![Scalar::Float(42.0); 5]);
}

#[test]
fn test_model_measurement_summarized() {
    let merger = ReferenceMerger::new("density");
    let summary = merger.summarize(&model_measurement(4)).unwrap();

    assert_eq!(merger.classify(&summary).unwrap(), MeasurementShape::Summary);
    assert_eq!(summary.nrows(), 2);
    assert_eq!(
        summary.index().named_levels(),
        vec![Label::new("dataset"), Label::new("layer")]
    );
    let sizes = summary.column(&Label::pair("density", "size")).unwrap();
    assert_eq!(sizes.values, vec![Scalar::from(4_usize); 2]);
    let stds = summary
        .numeric_column(&Label::pair("density", "std"))
        .unwrap();
    assert!(stds.iter().all(|std| *std == 0.0));
}

#[test]
fn test_concat_model_with_reference_as_samples() {
    let merger = ReferenceMerger::new("density")
        .with_seed(3)
        .with_samples_per_summary(50);
    let mut datasets = IndexMap::new();
    datasets.insert("O1".to_string(), model_measurement(10));
    datasets.insert(
        "Reference".to_string(),
        reference_summary(&[("L1", 100.0, 5.0), ("L2", 80.0, 5.0)]),
    );

    let merged = merger.concat(&datasets, MeasurementShape::Samples).unwrap();
    assert_eq!(merged.nrows(), 20 + 100);
    assert_eq!(
        merged.index().named_levels(),
        vec![Label::new("dataset"), Label::new("layer")]
    );
    assert_eq!(merged.column_labels(), vec![&Label::new("density")]);

    let tags = merged.index().level_values(0);
    assert_eq!(tags.iter().filter(|t| **t == Scalar::from("O1")).count(), 20);
    assert_eq!(
        tags.iter()
            .filter(|t| **t == Scalar::from("Reference"))
            .count(),
        100
    );
}

#[test]
fn test_concat_as_summary() {
    let merger = ReferenceMerger::new("density");
    let mut datasets = IndexMap::new();
    datasets.insert("O1".to_string(), model_measurement(3));
    datasets.insert(
        "Reference".to_string(),
        reference_summary(&[("L1", 100.0, 5.0)]),
    );

    let merged = merger.concat(&datasets, MeasurementShape::Summary).unwrap();
    assert_eq!(merged.nrows(), 3);
    assert!(merged.has_column(&Label::pair("density", "mean")));
    assert!(merged.has_column(&Label::pair("density", "std")));
}

#[test]
fn test_concat_rejects_mismatched_parameters() {
    let merger = ReferenceMerger::new("density");
    let mut record = FlatRow::new();
    record.insert(Label::new("region"), Scalar::from("SSp"));
    record.insert(Label::pair("density", "mean"), Scalar::from(100.0));
    record.insert(Label::pair("density", "std"), Scalar::from(1.0));
    let by_region = Table::from_records(&[record])
        .set_index(&[Label::new("region")], false)
        .unwrap();

    let mut datasets = IndexMap::new();
    datasets.insert("Layers".to_string(), reference_summary(&[("L1", 1.0, 0.1)]));
    datasets.insert("Regions".to_string(), by_region);

    match merger.concat(&datasets, MeasurementShape::Summary) {
        Err(MeasurementError::ShapeMismatch { datasets, .. }) => {
            assert_eq!(datasets, vec!["Layers".to_string(), "Regions".to_string()]);
        }
        other => panic!("expected a shape mismatch, got {:?}", other),
    }
}
