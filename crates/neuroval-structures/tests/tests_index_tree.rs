// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tests for the index-tree codec
//!
//! Covers the flatten/unflatten round trip on generated trees, table rows
//! converted back into parameter sets, and multi-level index construction.

use indexmap::IndexMap;
use neuroval_structures::index_tree::{flatten, make_index, unflatten, unflatten_pairs};
use neuroval_structures::{FlatRow, Label, Nested, ParameterSet, Scalar, StructureError, Table};
use proptest::prelude::*;

fn arb_leaf() -> impl Strategy<Value = Nested> {
    prop_oneof![
        any::<i64>().prop_map(Nested::from),
        any::<bool>().prop_map(Nested::from),
        "[a-zA-Z0-9_]{0,8}".prop_map(Nested::from),
    ]
}

fn arb_subtree() -> impl Strategy<Value = Nested> {
    arb_leaf().prop_recursive(3, 32, 4, |inner| {
        prop::collection::vec(("[a-z]{1,6}", inner), 1..4).prop_map(|entries| {
            let mut children = IndexMap::new();
            for (key, child) in entries {
                children.insert(Label::new(key), child);
            }
            Nested::Branch(children)
        })
    })
}

fn arb_parameter_tree() -> impl Strategy<Value = Nested> {
    prop::collection::vec(("[a-z]{1,6}", arb_subtree()), 0..5).prop_map(|entries| {
        let mut children = IndexMap::new();
        for (key, child) in entries {
            children.insert(Label::new(key), child);
        }
        Nested::Branch(children)
    })
}

proptest! {
    #[test]
    fn prop_unflatten_inverts_flatten(tree in arb_parameter_tree()) {
        let flat = flatten(&tree).unwrap();
        prop_assert_eq!(flat.len(), tree.leaf_count());
        prop_assert_eq!(unflatten(&flat).unwrap(), tree);
    }

    #[test]
    fn prop_flat_keys_have_leaf_depth(tree in arb_parameter_tree()) {
        let flat = flatten(&tree).unwrap();
        let deepest = flat.keys().map(Label::depth).max().unwrap_or(0);
        prop_assert_eq!(deepest, tree.depth());
    }
}

#[test]
fn test_table_row_back_to_parameter_set() {
    let parameters = ParameterSet::new()
        .with(
            "pre_synaptic",
            vec![("mtype", "L23_MC"), ("etype", "cAC")]
                .into_iter()
                .collect::<Nested>(),
        )
        .with("layer", 3);
    let table = Table::from_records(&[parameters.flatten().unwrap()]);
    assert_eq!(table.ncols(), 3);

    let row = table.record(0).unwrap();
    let rebuilt = unflatten_pairs(row.iter()).unwrap();
    assert_eq!(ParameterSet::from(rebuilt), parameters);
}

#[test]
fn test_single_blank_column_row_is_a_bare_value() {
    let mut flat = FlatRow::new();
    flat.insert(Label::new(""), Scalar::Float(0.25));
    assert_eq!(unflatten(&flat).unwrap(), Nested::Leaf(Scalar::Float(0.25)));
}

#[test]
fn test_malformed_keys_surface_immediately() {
    let mut children = IndexMap::new();
    children.insert(Label::pair("pre", "mtype"), Nested::from("PC"));
    children.insert(Label::new("layer"), Nested::from(1));
    let error = flatten(&Nested::Branch(children)).unwrap_err();
    match error {
        StructureError::MalformedParameterKey { key, .. } => assert_eq!(key, "layer"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_hierarchical_index_levels() {
    let rows: Vec<FlatRow> = ["L1", "L2"]
        .iter()
        .map(|layer| {
            ParameterSet::new()
                .with("pre", vec![("mtype", *layer)].into_iter().collect::<Nested>())
                .with("post", vec![("mtype", "PC")].into_iter().collect::<Nested>())
                .flatten()
                .unwrap()
        })
        .collect();

    let index = make_index(&rows);
    assert_eq!(
        index.named_levels(),
        vec![Label::pair("pre", "mtype"), Label::pair("post", "mtype")]
    );
    assert_eq!(index.level_values(0), vec![Scalar::from("L1"), Scalar::from("L2")]);
}
