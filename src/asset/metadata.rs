// Copyright (c) 2025 - Cowboy AI, Inc.
//! Metadata flattening
//!
//! Nested metadata maps are emitted as a single level of dotted keys.
//! The output is a `BTreeMap`, so iteration order is the key order and two
//! flattenings of equal input compare equal.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Flat metadata: dotted key to leaf value
pub type FlatMetadata = BTreeMap<String, Value>;

/// Flatten a nested JSON object into dotted keys.
///
/// `{"a": {"b": 1}}` becomes `{"a.b": 1}`. Arrays and scalars are leaves.
/// Empty nested objects produce no keys. Flattening an already flat map
/// returns it unchanged.
pub fn flatten(map: &Map<String, Value>) -> FlatMetadata {
    let mut out = FlatMetadata::new();
    for (key, value) in map {
        flatten_into(key, value, &mut out);
    }
    out
}

/// Flatten `value` under `prefix`, writing leaves into `out`.
///
/// Later writes to the same dotted key win.
pub fn flatten_into(prefix: &str, value: &Value, out: &mut FlatMetadata) {
    match value {
        Value::Object(children) => {
            for (key, child) in children {
                flatten_into(&join(prefix, key), child, out);
            }
        }
        leaf => {
            out.insert(prefix.to_string(), leaf.clone());
        }
    }
}

/// Flatten a `key -> string` map (tags, labels) under a namespace
pub fn namespaced<'a, I>(namespace: &str, pairs: I) -> FlatMetadata
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (join(namespace, k), Value::String(v.clone())))
        .collect()
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
