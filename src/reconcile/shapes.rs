//! Locating lists and entities inside heterogeneous response envelopes.
//!
//! The backend is inconsistent about where it puts results. Lists show up
//! as `{"data": {"posts": [...]}}`, `{"posts": [...]}`, `{"data": [...]}`
//! or a bare array; single entities in similar envelopes. Nothing here
//! errors: an unrecognized shape is an empty result.

use serde_json::Value;

/// Find the list named `field` in `payload`.
///
/// Priority: `data.<field>`, `<field>`, `data` as array, bare array.
/// The first candidate that is an array wins.
pub fn extract_list<'a>(payload: &'a Value, field: &str) -> &'a [Value] {
    let data = payload.get("data");
    let candidates = [
        data.and_then(|d| d.get(field)),
        payload.get(field),
        data,
        Some(payload),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|c| c.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Find the single entity named `field` in `payload`.
///
/// Priority: `data.<field>`, `<field>`, `data` as object, the payload
/// itself when it looks like an entity (carries `id` or `_id`).
pub fn extract_entity<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    let data = payload.get("data");
    let nested = [data.and_then(|d| d.get(field)), payload.get(field), data];
    if let Some(found) = nested.into_iter().flatten().find(|c| c.is_object()) {
        return Some(found);
    }
    if payload.get("id").is_some() || payload.get("_id").is_some() {
        return Some(payload);
    }
    None
}

/// Find a scalar string such as `token` or `shareUrl`: `data.<field>`,
/// then `<field>`.
pub fn extract_str<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload
        .get("data")
        .and_then(|d| d.get(field))
        .or_else(|| payload.get(field))
        .and_then(Value::as_str)
}

/// Find a count: `data.<field>`, `<field>`, then `data` as a number.
pub fn extract_count(payload: &Value, field: &str) -> Option<u64> {
    let data = payload.get("data");
    [data.and_then(|d| d.get(field)), payload.get(field), data]
        .into_iter()
        .flatten()
        .find_map(Value::as_u64)
}
