// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Nesting codec between nested mappings and flat, path-keyed mappings.
//!
//! `flatten` turns `{"pre": {"mtype": "L5"}, "layer": 2}` into
//! `{("pre", "mtype"): "L5", "layer": 2}`; `unflatten` is the inverse. A
//! mapping whose only key is the empty string encodes a value with no
//! sub-structure, so `{"": v}` flattens and unflattens to the bare value.
//!
//! Empty input round-trips to itself on both sides. Callers that treat an
//! empty parameter set specially must check for it themselves.

use crate::error::{StructureError, StructureResult};
use crate::label::Label;
use crate::nested::Nested;
use crate::scalar::Scalar;
use crate::table::Index;
use indexmap::{IndexMap, IndexSet};

/// A flat mapping from label paths to leaf values
pub type FlatRow = IndexMap<Label, Scalar>;

/// Flatten a nested mapping into path-keyed leaves.
///
/// # Errors
///
/// Returns `StructureError::MalformedParameterKey` when sibling keys have
/// different depths or two paths collide after flattening.
pub fn flatten(nested: &Nested) -> StructureResult<FlatRow> {
    let mut flat = FlatRow::new();
    flatten_into(nested, None, &mut flat)?;
    Ok(flat)
}

/// Flatten the children of a branch
pub fn flatten_map(children: &IndexMap<Label, Nested>) -> StructureResult<FlatRow> {
    let mut flat = FlatRow::new();
    flatten_children(children, None, &mut flat)?;
    Ok(flat)
}

fn flatten_into(nested: &Nested, prefix: Option<&Label>, flat: &mut FlatRow) -> StructureResult<()> {
    match nested {
        Nested::Leaf(value) => {
            let key = prefix.cloned().unwrap_or_else(|| Label::new(""));
            if flat.contains_key(&key) {
                return Err(StructureError::malformed(&key, "path occurs twice after flattening"));
            }
            flat.insert(key, value.clone());
            Ok(())
        }
        Nested::Branch(children) => flatten_children(children, prefix, flat),
    }
}

fn flatten_children(
    children: &IndexMap<Label, Nested>,
    prefix: Option<&Label>,
    flat: &mut FlatRow,
) -> StructureResult<()> {
    if children.len() == 1 {
        if let Some((key, child)) = children.first() {
            if key.is_blank() {
                return flatten_into(child, prefix, flat);
            }
        }
    }

    check_uniform_depth(children.keys())?;

    for (key, child) in children {
        let path = match prefix {
            Some(prefix) => prefix.join(key),
            None => key.clone(),
        };
        flatten_into(child, Some(&path), flat)?;
    }
    Ok(())
}

/// Sibling keys must share one depth
pub fn check_uniform_depth<'a, I>(keys: I) -> StructureResult<()>
where
    I: IntoIterator<Item = &'a Label>,
{
    let mut expected: Option<usize> = None;
    for key in keys {
        match expected {
            None => expected = Some(key.depth()),
            Some(depth) if depth != key.depth() => {
                return Err(StructureError::malformed(
                    key,
                    format!(
                        "depth {} differs from sibling depth {}",
                        key.depth(),
                        depth
                    ),
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Rebuild a nested mapping from path-keyed leaves.
pub fn unflatten(flat: &FlatRow) -> StructureResult<Nested> {
    unflatten_pairs(flat.iter())
}

/// Rebuild a nested mapping from any sequence of `(path, value)` pairs,
/// e.g. the cells of a table row.
///
/// # Errors
///
/// Returns `StructureError::MalformedParameterKey` when one path is both a
/// leaf and the prefix of another path.
pub fn unflatten_pairs<'a, I>(pairs: I) -> StructureResult<Nested>
where
    I: IntoIterator<Item = (&'a Label, &'a Scalar)>,
{
    let pairs: Vec<(&Label, &Scalar)> = pairs.into_iter().collect();
    unflatten_slice(&pairs)
}

fn unflatten_slice(pairs: &[(&Label, &Scalar)]) -> StructureResult<Nested> {
    if pairs.len() == 1 && pairs[0].0.is_blank() {
        return Ok(Nested::Leaf(pairs[0].1.clone()));
    }

    let mut groups: IndexMap<&str, Vec<(Option<Label>, &Scalar)>> = IndexMap::new();
    for (label, value) in pairs {
        groups
            .entry(label.first())
            .or_default()
            .push((label.rest(), *value));
    }

    let mut branch = IndexMap::with_capacity(groups.len());
    for (head, members) in groups {
        let leaves = members.iter().filter(|(rest, _)| rest.is_none()).count();
        let node = if leaves == members.len() {
            // Keys are unique, so an all-leaf group has exactly one member
            Nested::Leaf(members[0].1.clone())
        } else if leaves == 0 {
            let suffixes: Vec<(Label, Scalar)> = members
                .into_iter()
                .filter_map(|(rest, value)| rest.map(|rest| (rest, value.clone())))
                .collect();
            let borrowed: Vec<(&Label, &Scalar)> =
                suffixes.iter().map(|(label, value)| (label, value)).collect();
            unflatten_slice(&borrowed)?
        } else {
            return Err(StructureError::malformed(
                head,
                "name is used both as a value and as a parent of nested values",
            ));
        };
        branch.insert(Label::new(head), node);
    }

    Ok(Nested::Branch(branch))
}

/// Union of the labels across `rows`, in first-seen order
pub fn union_labels<'a, I>(rows: I) -> IndexSet<Label>
where
    I: IntoIterator<Item = &'a FlatRow>,
{
    let mut labels = IndexSet::new();
    for row in rows {
        for label in row.keys() {
            if !labels.contains(label) {
                labels.insert(label.clone());
            }
        }
    }
    labels
}

/// Build a row index from flat rows.
///
/// Levels are the union of the rows' labels; rows missing a label get `Null`
/// at that level. A single label yields a flat index, several labels a
/// multi-level index.
pub fn make_index(rows: &[FlatRow]) -> Index {
    let levels = union_labels(rows.iter());
    let mut index = Index::with_names(levels.iter().cloned().map(Some).collect());
    for row in rows {
        let key = levels
            .iter()
            .map(|label| row.get(label).cloned().unwrap_or(Scalar::Null))
            .collect();
        index.push_key_unchecked(key);
    }
    index
}
