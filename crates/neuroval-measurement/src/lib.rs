// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# neuroval-measurement

Measuring models under resolved parameter sets and shaping the results
into tables that can be compared with reference data.

## Pieces

- [`MeasurementMethod`] and [`LabelProvider`]: what the analysis supplies
- [`MeasurementRunner`]: batch or serial runs under a sampling policy
- [`MeasurementCollector`]: turns `(parameters, value)` pairs into tables
- [`ReferenceMerger`]: converts between sample and summary shapes and
  merges labelled datasets into one table
- [`MeasurementCache`]: caller-owned reuse of batch measurements

## Example

```rust
use neuroval_measurement::{
    FixedLabel, FnMethod, MeasurementCollector, MeasurementError, MeasurementRunner,
    MeasurementValue,
};
use neuroval_parameters::ParameterSource;
use neuroval_structures::{ParameterSet, SamplingMethodology};

let source: ParameterSource<(), MeasurementError> =
    ParameterSource::from_sets(vec![ParameterSet::new().with("layer", "L1")]);
let method = FnMethod::new("Constant.", |_: &(), _: &ParameterSet, _: SamplingMethodology| {
    Ok::<_, MeasurementError>(MeasurementValue::from(1.0))
});

let runner = MeasurementRunner::new(MeasurementCollector::primitive()).with_sample_size(5);
let measurement = runner
    .batch(&(), &source, &method, &FixedLabel("O1".to_string()))
    .unwrap();
assert_eq!(measurement.data.nrows(), 5);
```

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cache;
pub mod collector;
mod method;
pub mod reference;
mod runner;
mod serial;
pub mod shape;
mod types;
mod value;

pub use cache::{CacheConfig, CacheKey, CacheStats, CachedMeasurement, MeasurementCache};
pub use collector::{
    Collected, CollectionStrategy, MeasurementCollector, MeasurementPair, VALUE_COLUMN,
};
pub use method::{FixedLabel, FnMethod, LabelProvider, MeasurementMethod};
pub use reference::ReferenceMerger;
pub use runner::{BatchMeasurement, MeasurementRunner, RunOutput, DATASET_LEVEL};
pub use serial::{SerialMeasurements, SerialRecord};
pub use shape::MeasurementShape;
pub use types::{MeasurementError, MeasurementResult};
pub use value::{MeasurementValue, Series, Vector};
