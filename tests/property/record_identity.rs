// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Record Identity and Metadata
//!
//! The EAN of a record depends only on `(kind, id)` and always reads
//! `kind:id`. Flattening metadata is idempotent.

use cim_asset_collector::asset::{flatten, FlatMetadata};
use cim_asset_collector::{AssetKind, AssetRecord, AssetType, Ean};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// ============================================================================
// Strategies
// ============================================================================

fn kind_strategy() -> impl Strategy<Value = AssetKind> {
    prop_oneof![
        Just(AssetKind::Host),
        Just(AssetKind::Network),
        Just(AssetKind::Cluster),
        Just(AssetKind::ContainerGroup),
        Just(AssetKind::Container),
    ]
}

fn type_strategy() -> impl Strategy<Value = AssetType> {
    prop_oneof![
        Just(AssetType::AwsEc2Instance),
        Just(AssetType::AwsSubnet),
        Just(AssetType::GcpVpc),
        Just(AssetType::AzureVmInstance),
        Just(AssetType::K8sCluster),
        Just(AssetType::K8sPod),
        Just(AssetType::K8sContainer),
    ]
}

/// Provider ids, including ARNs and URLs that carry `:`
fn id_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:/._-]{1,40}"
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

/// Nested JSON objects up to three levels deep with scalar leaves
fn nested_strategy() -> impl Strategy<Value = Map<String, Value>> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-z0-9 ]{0,10}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ];
    let tree = leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map(key_strategy(), inner, 1..4)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    });
    prop::collection::btree_map(key_strategy(), tree, 0..5).prop_map(|m| m.into_iter().collect())
}

fn as_object(flat: &FlatMetadata) -> Map<String, Value> {
    flat.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

// ============================================================================
// EAN properties
// ============================================================================

proptest! {
    #[test]
    fn prop_ean_is_kind_colon_id(kind in kind_strategy(), id in id_strategy()) {
        let ean = Ean::new(kind, id.clone());
        prop_assert_eq!(ean.to_string(), format!("{}:{}", kind.as_str(), id));
    }

    #[test]
    fn prop_ean_parses_back(kind in kind_strategy(), id in id_strategy()) {
        let ean = Ean::new(kind, id);
        let parsed: Ean = ean.to_string().parse().unwrap();
        prop_assert_eq!(parsed, ean);
    }

    #[test]
    fn prop_same_record_identity_same_ean(asset_type in type_strategy(), id in id_strategy()) {
        let first = AssetRecord::builder().typed(asset_type, id.clone(), None).build();
        let second = AssetRecord::builder()
            .name("ignored")
            .typed(asset_type, id.clone(), Some("prod"))
            .build();
        prop_assert_eq!(first.ean.clone(), second.ean.clone());
        prop_assert_eq!(first.ean, Some(Ean::new(asset_type.kind(), id)));
    }
}

// ============================================================================
// Flattening properties
// ============================================================================

proptest! {
    #[test]
    fn prop_flatten_is_idempotent(map in nested_strategy()) {
        let once = flatten(&map);
        let twice = flatten(&as_object(&once));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_flattened_values_are_leaves(map in nested_strategy()) {
        for value in flatten(&map).values() {
            prop_assert!(!value.is_object());
        }
    }
}

#[test]
fn test_flatten_nested_example() {
    let map = json!({"a": {"b": "x"}});
    let flat = flatten(map.as_object().unwrap());
    assert_eq!(flat.len(), 1);
    assert_eq!(flat["a.b"], json!("x"));
}
