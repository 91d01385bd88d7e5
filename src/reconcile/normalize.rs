//! `_id` to `id` rewriting.

use serde_json::Value;

/// Rewrite every object that carries `_id` but no usable `id` so that it
/// carries `id`, recursing into nested objects and arrays.
///
/// An `id` counts as usable when it is a non-empty string or a number.
pub fn normalize_ids(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let has_usable_id = match map.get("id") {
                Some(Value::String(s)) => !s.is_empty(),
                Some(Value::Number(_)) => true,
                _ => false,
            };
            if !has_usable_id {
                if let Some(raw) = map.get("_id").cloned() {
                    match raw {
                        Value::String(ref s) if !s.is_empty() => {
                            map.insert("id".to_string(), raw);
                        }
                        Value::Number(_) => {
                            map.insert("id".to_string(), raw);
                        }
                        _ => {}
                    }
                }
            }
            for child in map.values_mut() {
                normalize_ids(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                normalize_ids(item);
            }
        }
        _ => {}
    }
}

/// Normalized copy of `value`.
pub fn normalized(value: &Value) -> Value {
    let mut copy = value.clone();
    normalize_ids(&mut copy);
    copy
}
