// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Raw results returned by a measurement method for one parameter set.

use crate::types::{MeasurementError, MeasurementResult};
use indexmap::IndexMap;
use ndarray::Array1;
use neuroval_structures::{Label, Scalar, StructureError};

/// A fixed-length vector with named components, e.g. a center of mass
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    components: Vec<String>,
    values: Array1<f64>,
}

impl Vector {
    pub fn new(components: Vec<String>, values: Array1<f64>) -> MeasurementResult<Self> {
        if components.len() != values.len() {
            return Err(MeasurementError::Structure(StructureError::LengthMismatch {
                what: "vector components".to_string(),
                expected: components.len(),
                actual: values.len(),
            }));
        }
        Ok(Self { components, values })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let (components, values): (Vec<String>, Vec<f64>) =
            pairs.into_iter().map(|(name, value)| (name.into(), value)).unzip();
        Self {
            components,
            values: Array1::from_vec(values),
        }
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.components
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// A one-dimensional labelled series, e.g. a trace indexed by an inner variable.
///
/// Every entry carries one key value per index level.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    index_names: Vec<Option<Label>>,
    entries: Vec<(Vec<Scalar>, Scalar)>,
}

impl Series {
    /// Single-level series with an unnamed index
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Scalar>,
        V: Into<Scalar>,
    {
        Self {
            index_names: vec![None],
            entries: pairs
                .into_iter()
                .map(|(key, value)| (vec![key.into()], value.into()))
                .collect(),
        }
    }

    /// Single-level series whose index level is named `name`
    pub fn named<I, K, V>(name: impl Into<Label>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Scalar>,
        V: Into<Scalar>,
    {
        let mut series = Self::from_pairs(pairs);
        series.index_names = vec![Some(name.into())];
        series
    }

    /// Multi-level series; every key must have one value per level
    pub fn with_levels(
        index_names: Vec<Option<Label>>,
        entries: Vec<(Vec<Scalar>, Scalar)>,
    ) -> MeasurementResult<Self> {
        if let Some((key, _)) = entries.iter().find(|(key, _)| key.len() != index_names.len()) {
            return Err(MeasurementError::Structure(StructureError::LengthMismatch {
                what: "series key".to_string(),
                expected: index_names.len(),
                actual: key.len(),
            }));
        }
        Ok(Self {
            index_names,
            entries,
        })
    }

    pub fn index_names(&self) -> &[Option<Label>] {
        &self.index_names
    }

    pub fn nlevels(&self) -> usize {
        self.index_names.len()
    }

    pub fn entries(&self) -> &[(Vec<Scalar>, Scalar)] {
        &self.entries
    }

    pub fn values(&self) -> impl Iterator<Item = &Scalar> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column labels for the index levels.
    ///
    /// Unnamed levels become `index` for a single-level series and
    /// `level_<i>` otherwise.
    pub fn level_labels(&self) -> Vec<Label> {
        let single = self.index_names.len() == 1;
        self.index_names
            .iter()
            .enumerate()
            .map(|(i, name)| match name {
                Some(label) => label.clone(),
                None if single => Label::new("index"),
                None => Label::new(format!("level_{}", i)),
            })
            .collect()
    }
}

/// The result of measuring one parameter set
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementValue {
    Scalar(Scalar),
    Vector(Vector),
    Series(Series),
    /// Sub-measurements by label
    Multi(IndexMap<String, MeasurementValue>),
}

impl MeasurementValue {
    pub fn shape_name(&self) -> &'static str {
        match self {
            MeasurementValue::Scalar(_) => "scalar",
            MeasurementValue::Vector(_) => "vector",
            MeasurementValue::Series(_) => "series",
            MeasurementValue::Multi(_) => "multi",
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            MeasurementValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Collect sub-measurements into a `Multi` value
    pub fn multi<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<MeasurementValue>,
    {
        MeasurementValue::Multi(
            entries
                .into_iter()
                .map(|(label, value)| (label.into(), value.into()))
                .collect(),
        )
    }
}

impl From<Scalar> for MeasurementValue {
    fn from(value: Scalar) -> Self {
        MeasurementValue::Scalar(value)
    }
}

impl From<f64> for MeasurementValue {
    fn from(value: f64) -> Self {
        MeasurementValue::Scalar(Scalar::Float(value))
    }
}

impl From<i64> for MeasurementValue {
    fn from(value: i64) -> Self {
        MeasurementValue::Scalar(Scalar::Int(value))
    }
}

impl From<i32> for MeasurementValue {
    fn from(value: i32) -> Self {
        MeasurementValue::Scalar(Scalar::from(value))
    }
}

impl From<Vector> for MeasurementValue {
    fn from(value: Vector) -> Self {
        MeasurementValue::Vector(value)
    }
}

impl From<Series> for MeasurementValue {
    fn from(value: Series) -> Self {
        MeasurementValue::Series(value)
    }
}

impl From<IndexMap<String, MeasurementValue>> for MeasurementValue {
    fn from(value: IndexMap<String, MeasurementValue>) -> Self {
        MeasurementValue::Multi(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_length_is_checked() {
        let result = Vector::new(vec!["x".into(), "y".into()], Array1::from_vec(vec![1.0]));
        assert!(result.is_err());
        let vector = Vector::from_pairs([("x", 1.0), ("y", 2.0), ("z", 3.0)]);
        assert_eq!(vector.len(), 3);
        assert_eq!(vector.iter().last(), Some(("z", 3.0)));
    }

    #[test]
    fn test_series_level_labels() {
        let series = Series::from_pairs([("L1", 5), ("L2", 7)]);
        assert_eq!(series.level_labels(), vec![Label::new("index")]);

        let series = Series::with_levels(
            vec![Some(Label::new("depth")), None],
            vec![(vec![Scalar::from(0), Scalar::from("a")], Scalar::from(1.5))],
        )
        .unwrap();
        assert_eq!(
            series.level_labels(),
            vec![Label::new("depth"), Label::new("level_1")]
        );
    }

    #[test]
    fn test_series_keys_must_match_levels() {
        let result = Series::with_levels(vec![None], vec![(vec![], Scalar::Null)]);
        assert!(matches!(result, Err(MeasurementError::Structure(_))));
    }
}
