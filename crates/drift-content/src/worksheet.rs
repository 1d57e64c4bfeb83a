//! Worksheet flattening support
//!
//! Worksheets store settings under dotted keys (`net.mgmt.mtu: 1500`).
//! They are expanded into nested mappings before diffing so that a
//! worksheet compares against the hierarchical config it produces.

use serde_json::{Map, Value};

/// Expand the dotted top-level keys of a mapping into nested mappings.
///
/// Keys are applied in order; when a dotted key needs to descend through a
/// scalar, the scalar is replaced by a mapping. Non-mapping input is
/// returned unchanged.
pub fn expand_dotted_keys(value: &Value) -> Value {
    let Value::Object(entries) = value else {
        return value.clone();
    };

    let mut root = Map::new();
    for (key, leaf) in entries {
        let segments: Vec<&str> = key.split('.').collect();
        insert_path(&mut root, &segments, leaf.clone());
    }
    Value::Object(root)
}

fn insert_path(map: &mut Map<String, Value>, segments: &[&str], leaf: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), leaf);
        }
        [first, rest @ ..] => {
            let slot = map
                .entry((*first).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(child) = slot {
                insert_path(child, rest, leaf);
            }
        }
    }
}
