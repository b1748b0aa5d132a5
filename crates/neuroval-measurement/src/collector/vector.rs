// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Vector results: one row per pair, one `("value", component)` column per
//! component.

use super::{
    indexed_table, parameter_labels, parameter_rows, CollectionStrategy, MeasurementPair,
    VALUE_COLUMN,
};
use crate::types::{MeasurementError, MeasurementResult};
use crate::value::MeasurementValue;
use neuroval_structures::{Label, Scalar, Table};

pub(super) fn collect(pairs: &[MeasurementPair]) -> MeasurementResult<Table> {
    let rows = parameter_rows(pairs.iter().map(|(set, _)| set))?;
    let params = parameter_labels(&rows);

    let mut records = Vec::with_capacity(rows.len());
    for (row, (_, result)) in rows.iter().zip(pairs) {
        let MeasurementValue::Vector(vector) = result else {
            return Err(MeasurementError::UnexpectedResultShape {
                strategy: CollectionStrategy::Vector,
                actual: result.shape_name(),
            });
        };
        let mut record = row.clone();
        for (component, value) in vector.iter() {
            record.insert(Label::pair(VALUE_COLUMN, component), Scalar::Float(value));
        }
        records.push(record);
    }

    indexed_table(&params, &params, &records)
}

#[cfg(test)]
mod tests {
    use crate::collector::MeasurementCollector;
    use crate::value::{MeasurementValue, Vector};
    use neuroval_structures::{Label, ParameterSet, Scalar};

    #[test]
    fn test_vector_components_become_two_level_columns() {
        let pairs: Vec<_> = [("SP", 1.0), ("PC", 2.0)]
            .iter()
            .map(|(mtype, offset)| {
                (
                    ParameterSet::new().with("mtype", *mtype),
                    MeasurementValue::from(Vector::from_pairs([
                        ("x", 10.0 + offset),
                        ("y", 20.0 + offset),
                        ("z", 30.0 + offset),
                    ])),
                )
            })
            .collect();

        let table = MeasurementCollector::vector()
            .collect(&pairs)
            .unwrap()
            .into_table()
            .unwrap();
        assert_eq!(table.nrows(), 2);
        assert_eq!(table.index().named_levels(), vec![Label::new("mtype")]);
        assert_eq!(table.column_level(0), vec![Some("value"); 3]);
        assert_eq!(table.column_level(1), vec![Some("x"), Some("y"), Some("z")]);
        assert_eq!(
            table.column(&Label::pair("value", "y")).unwrap().values,
            vec![Scalar::Float(21.0), Scalar::Float(22.0)]
        );
    }
}
