//! Deep merge and dotted-path helpers over JSON configuration trees.

use serde_json::{Map, Value};

/// Merge `source` into `target`
///
/// Objects merge key by key, recursively. Every other kind of value (arrays,
/// strings, numbers, booleans, null) replaces the target outright.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    _ => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Split a dotted path, rejecting empty segments
pub fn segments(path: &str) -> Option<Vec<&str>> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|part| part.is_empty()) {
        None
    } else {
        Some(parts)
    }
}

/// Value at `path`, or `None` when a segment is missing or a non-object is hit
pub fn get_path<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let parts = segments(path)?;
    parts
        .into_iter()
        .try_fold(tree, |node, part| node.as_object()?.get(part))
}

/// Write `value` at `path`, creating intermediate objects
///
/// Non-object values found along the path are replaced by empty objects.
/// Returns `false` (and writes nothing) for a malformed path.
pub fn set_path(tree: &mut Value, path: &str, value: Value) -> bool {
    let Some(parts) = segments(path) else {
        return false;
    };
    let Some((last, parents)) = parts.split_last() else {
        return false;
    };

    let mut node = tree;
    for part in parents {
        node = object_mut(node)
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    object_mut(node).insert(last.to_string(), value);
    true
}

/// Coerce `node` into an object, replacing any non-object value
fn object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}
