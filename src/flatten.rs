use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Flatten a nested attribute tree into a single-level map, joining nested
/// keys with an underscore: `{"a": {"b": 1}}` becomes `{"a_b": 1}`.
///
/// Arrays are passed through as values, not recursed into. If two source
/// paths flatten to the same key, the later one in iteration order wins;
/// `serde_json::Map` iterates in sorted key order, so the winner is the
/// lexicographically later path.
pub fn flatten(tree: &Map<String, Value>) -> BTreeMap<String, Value> {
    let mut flat = BTreeMap::new();
    flatten_into(tree, &mut flat, "");
    flat
}

fn flatten_into(tree: &Map<String, Value>, out: &mut BTreeMap<String, Value>, prefix: &str) {
    for (key, value) in tree {
        let path = format!("{prefix}{key}");
        match value {
            Value::Object(nested) => flatten_into(nested, out, &format!("{path}_")),
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}
