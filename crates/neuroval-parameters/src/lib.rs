// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# neuroval-parameters

Resolution of measurement parameters.

A [`ParameterSource`] is built once per analysis from a table, a callable,
or a generator, and is then resolved against each model to be measured:

```rust
use neuroval_parameters::ParameterSource;
use neuroval_structures::{FlatRow, Label, Scalar, Table};

let mut record = FlatRow::new();
record.insert(Label::new("layer"), Scalar::from("L1"));
let source: ParameterSource<()> = ParameterSource::from_table(Table::from_records(&[record])).unwrap();

let sets = source.for_sampling(&(), 20).unwrap();
assert_eq!(sets.len(), 20);
```

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod source;
mod types;

pub use source::{ParameterCallable, ParameterGenerator, ParameterSource, ParameterSpec};
pub use types::{ParameterError, ParameterResult, ParameterRows, SourceKind};
