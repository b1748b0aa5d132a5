// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! One named combination of independent-variable values.

use crate::error::StructureResult;
use crate::index_tree::{self, FlatRow};
use crate::label::Label;
use crate::nested::Nested;
use crate::scalar::Scalar;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A mapping from parameter name to (possibly nested) value.
///
/// Names are plain strings or hierarchical labels; values are leaves or
/// sub-trees, e.g. `{"pre_synaptic": {"mtype": "L23_MC"}, "layer": 2}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet {
    values: IndexMap<Label, Nested>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<Label>, value: impl Into<Nested>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<Label>, value: impl Into<Nested>) -> Option<Nested> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Nested> {
        self.values.get(&Label::new(name))
    }

    pub fn get_label(&self, label: &Label) -> Option<&Nested> {
        self.values.get(label)
    }

    /// Leaf value of a top-level parameter
    pub fn scalar(&self, name: &str) -> Option<&Scalar> {
        self.get(name).and_then(Nested::as_scalar)
    }

    /// Leaf value at a hierarchical path, e.g. `["pre_synaptic", "mtype"]`.
    ///
    /// Looks the path up both as nested names and as a single tuple key.
    pub fn lookup(&self, path: &[&str]) -> Option<&Scalar> {
        if path.is_empty() {
            return None;
        }
        if let Ok(label) = Label::from_segments(path.iter().copied()) {
            if let Some(value) = self.values.get(&label).and_then(Nested::as_scalar) {
                return Some(value);
            }
        }
        let mut node = self.values.get(&Label::new(path[0]))?;
        for segment in &path[1..] {
            node = node.child(&Label::new(*segment))?;
        }
        node.as_scalar()
    }

    /// Top-level parameter names
    pub fn names(&self) -> impl Iterator<Item = &Label> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &Nested)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Path-keyed leaves of this parameter set
    pub fn flatten(&self) -> StructureResult<FlatRow> {
        index_tree::flatten_map(&self.values)
    }

    /// Rebuild a parameter set from path-keyed leaves
    pub fn from_flat(flat: &FlatRow) -> StructureResult<Self> {
        Ok(Self::from(index_tree::unflatten(flat)?))
    }

    /// The parameter set as a nested tree
    pub fn to_tree(&self) -> Nested {
        Nested::Branch(self.values.clone())
    }
}

impl From<Nested> for ParameterSet {
    /// A bare leaf becomes `{"": leaf}`, the encoding of a value without sub-structure
    fn from(tree: Nested) -> Self {
        match tree {
            Nested::Branch(values) => Self { values },
            leaf @ Nested::Leaf(_) => {
                let mut values = IndexMap::with_capacity(1);
                values.insert(Label::new(""), leaf);
                Self { values }
            }
        }
    }
}

impl<K: Into<Label>, V: Into<Nested>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl Serialize for ParameterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(&name.to_string(), value)?;
        }
        map.end()
    }
}
