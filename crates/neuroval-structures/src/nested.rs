// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trees of labelled values (nested mappings of parameters or results).

use crate::label::Label;
use crate::scalar::Scalar;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A nested mapping: either a leaf value or a branch of labelled children.
///
/// Branch keys are [`Label`]s, so a level may itself use tuple-like keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested {
    Leaf(Scalar),
    Branch(IndexMap<Label, Nested>),
}

impl Nested {
    /// An empty branch
    pub fn empty() -> Self {
        Nested::Branch(IndexMap::new())
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Nested::Leaf(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Nested::Leaf(value) => Some(value),
            Nested::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&IndexMap<Label, Nested>> {
        match self {
            Nested::Leaf(_) => None,
            Nested::Branch(children) => Some(children),
        }
    }

    /// Child under `key` when this is a branch
    pub fn child(&self, key: &Label) -> Option<&Nested> {
        self.as_branch().and_then(|children| children.get(key))
    }

    /// Number of leaves below this node
    pub fn leaf_count(&self) -> usize {
        match self {
            Nested::Leaf(_) => 1,
            Nested::Branch(children) => children.values().map(Nested::leaf_count).sum(),
        }
    }

    /// Depth of the deepest leaf, 0 for a leaf
    pub fn depth(&self) -> usize {
        match self {
            Nested::Leaf(_) => 0,
            Nested::Branch(children) => children
                .iter()
                .map(|(key, child)| key.depth() + child.depth())
                .max()
                .unwrap_or(0),
        }
    }
}

impl Default for Nested {
    fn default() -> Self {
        Nested::empty()
    }
}

macro_rules! nested_from_scalar {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for Nested {
                fn from(value: $source) -> Self {
                    Nested::Leaf(Scalar::from(value))
                }
            }
        )*
    };
}

nested_from_scalar!(bool, i32, i64, u32, usize, f32, f64, &str, String);

impl From<Scalar> for Nested {
    fn from(value: Scalar) -> Self {
        Nested::Leaf(value)
    }
}

impl From<IndexMap<Label, Nested>> for Nested {
    fn from(children: IndexMap<Label, Nested>) -> Self {
        Nested::Branch(children)
    }
}

impl<K: Into<Label>, V: Into<Nested>> FromIterator<(K, V)> for Nested {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Nested::Branch(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl Serialize for Nested {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nested::Leaf(value) => value.serialize(serializer),
            Nested::Branch(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (key, child) in children {
                    map.serialize_entry(&key.to_string(), child)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_branch() {
        let tree: Nested = vec![("mtype", Nested::from("L5_TPC")), ("count", Nested::from(3))]
            .into_iter()
            .collect();
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(
            tree.child(&Label::new("mtype")).and_then(Nested::as_scalar),
            Some(&Scalar::from("L5_TPC"))
        );
    }

    #[test]
    fn test_serialize_uses_display_keys() {
        let inner: Nested = vec![("mtype", "L23_MC")].into_iter().collect();
        let tree: Nested = vec![(Label::new("pre"), inner)].into_iter().collect();
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"pre":{"mtype":"L23_MC"}}"#);
    }
}
