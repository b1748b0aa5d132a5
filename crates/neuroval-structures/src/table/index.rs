// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Row index of a [`Table`](super::Table).
//!
//! An index has zero or more levels. Zero levels is a purely positional
//! index; one level is a flat index; several levels form a multi-level index.
//! Every row carries one key with one value per level.

use crate::error::{StructureError, StructureResult};
use crate::label::Label;
use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawIndex")]
pub struct Index {
    names: Vec<Option<Label>>,
    keys: Vec<Vec<Scalar>>,
}

#[derive(Deserialize)]
struct RawIndex {
    names: Vec<Option<Label>>,
    keys: Vec<Vec<Scalar>>,
}

impl TryFrom<RawIndex> for Index {
    type Error = StructureError;

    fn try_from(raw: RawIndex) -> Result<Self, Self::Error> {
        Index::new(raw.names, raw.keys)
    }
}

impl Index {
    /// A positional index over `len` rows
    pub fn positional(len: usize) -> Self {
        Self {
            names: Vec::new(),
            keys: vec![Vec::new(); len],
        }
    }

    /// An empty index with the given level names
    pub fn with_names(names: Vec<Option<Label>>) -> Self {
        Self {
            names,
            keys: Vec::new(),
        }
    }

    /// Build an index from level names and row keys.
    ///
    /// # Errors
    ///
    /// Returns `StructureError::LengthMismatch` when a key has the wrong number of levels.
    pub fn new(names: Vec<Option<Label>>, keys: Vec<Vec<Scalar>>) -> StructureResult<Self> {
        for key in &keys {
            if key.len() != names.len() {
                return Err(StructureError::LengthMismatch {
                    what: "index key".to_string(),
                    expected: names.len(),
                    actual: key.len(),
                });
            }
        }
        Ok(Self { names, keys })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of levels
    pub fn nlevels(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[Option<Label>] {
        &self.names
    }

    /// Names of the named levels, in level order
    pub fn named_levels(&self) -> Vec<Label> {
        self.names.iter().flatten().cloned().collect()
    }

    /// True when there is at least one level and every level has a name
    pub fn is_fully_named(&self) -> bool {
        !self.names.is_empty() && self.names.iter().all(Option::is_some)
    }

    pub fn keys(&self) -> &[Vec<Scalar>] {
        &self.keys
    }

    pub fn key(&self, row: usize) -> Option<&[Scalar]> {
        self.keys.get(row).map(Vec::as_slice)
    }

    /// Position of the level called `name`
    pub fn level_position(&self, name: &Label) -> Option<usize> {
        self.names
            .iter()
            .position(|level| level.as_ref() == Some(name))
    }

    /// Values of one level across all rows
    pub fn level_values(&self, level: usize) -> Vec<Scalar> {
        self.keys
            .iter()
            .map(|key| key.get(level).cloned().unwrap_or(Scalar::Null))
            .collect()
    }

    /// Append a row key.
    ///
    /// # Errors
    ///
    /// Returns `StructureError::LengthMismatch` when the key has the wrong number of levels.
    pub fn push_key(&mut self, key: Vec<Scalar>) -> StructureResult<()> {
        if key.len() != self.names.len() {
            return Err(StructureError::LengthMismatch {
                what: "index key".to_string(),
                expected: self.names.len(),
                actual: key.len(),
            });
        }
        self.keys.push(key);
        Ok(())
    }

    pub(crate) fn push_key_unchecked(&mut self, key: Vec<Scalar>) {
        debug_assert_eq!(key.len(), self.names.len());
        self.keys.push(key);
    }

    /// Insert a level at `position` with one value per row.
    ///
    /// # Errors
    ///
    /// Returns `StructureError::LengthMismatch` when `values` does not match the row count.
    pub fn insert_level(
        &mut self,
        position: usize,
        name: Option<Label>,
        values: Vec<Scalar>,
    ) -> StructureResult<()> {
        if values.len() != self.keys.len() {
            return Err(StructureError::LengthMismatch {
                what: "index level".to_string(),
                expected: self.keys.len(),
                actual: values.len(),
            });
        }
        let position = position.min(self.names.len());
        self.names.insert(position, name);
        for (key, value) in self.keys.iter_mut().zip(values) {
            key.insert(position, value);
        }
        Ok(())
    }

    /// Remove a level, returning its values
    pub fn remove_level(&mut self, position: usize) -> Option<(Option<Label>, Vec<Scalar>)> {
        if position >= self.names.len() {
            return None;
        }
        let name = self.names.remove(position);
        let values = self.keys.iter_mut().map(|key| key.remove(position)).collect();
        Some((name, values))
    }

    /// Keep only the rows at `rows`, in that order
    pub fn take(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            keys: rows.iter().filter_map(|&row| self.keys.get(row).cloned()).collect(),
        }
    }

    /// Describe the level names for error messages
    pub fn describe(&self) -> String {
        self.names
            .iter()
            .map(|name| match name {
                Some(label) => label.to_string(),
                None => "<unnamed>".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove_level() {
        let mut index = Index::new(
            vec![Some(Label::new("layer"))],
            vec![vec![Scalar::from("L1")], vec![Scalar::from("L2")]],
        )
        .unwrap();

        index
            .insert_level(0, Some(Label::new("dataset")), vec!["model".into(), "model".into()])
            .unwrap();
        assert_eq!(index.nlevels(), 2);
        assert_eq!(index.level_position(&Label::new("layer")), Some(1));
        assert_eq!(
            index.key(1),
            Some(&[Scalar::from("model"), Scalar::from("L2")][..])
        );

        let (name, values) = index.remove_level(0).unwrap();
        assert_eq!(name, Some(Label::new("dataset")));
        assert_eq!(values.len(), 2);
        assert_eq!(index.nlevels(), 1);
    }

    #[test]
    fn test_level_length_is_checked() {
        let mut index = Index::positional(3);
        let result = index.insert_level(0, None, vec![Scalar::Null]);
        assert!(matches!(result, Err(StructureError::LengthMismatch { .. })));
        assert!(Index::new(vec![None], vec![vec![]]).is_err());
    }

    #[test]
    fn test_fully_named() {
        assert!(!Index::positional(2).is_fully_named());
        assert!(Index::with_names(vec![Some(Label::new("a"))]).is_fully_named());
        assert!(!Index::with_names(vec![Some(Label::new("a")), None]).is_fully_named());
    }

    #[test]
    fn test_deserialize_checks_key_lengths() {
        let ragged = r#"{"names":["a"],"keys":[[]]}"#;
        assert!(serde_json::from_str::<Index>(ragged).is_err());

        let index: Index = serde_json::from_str(r#"{"names":["a"],"keys":[["L1"]]}"#).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.level_values(0), vec![Scalar::from("L1")]);
    }
}
