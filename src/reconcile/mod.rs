//! Turns heterogeneous list payloads into canonical entity lists.
//!
//! Raw responses go through three steps: [`shapes`] finds the array (or
//! entity) inside whatever envelope the backend used, [`normalize`]
//! rewrites `_id` to `id`, and the items are decoded one by one so a
//! single bad entry never discards the batch. [`EntityList`] then applies
//! ordering, deduplication and refresh generations.

pub mod list;
pub mod normalize;
pub mod shapes;

pub use list::{EntityList, Generation, SourceOrder};
pub use normalize::normalize_ids;
pub use shapes::{extract_count, extract_entity, extract_list, extract_str};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;

use crate::models::{Post, User};

/// Decode the list named `field` from `payload`.
///
/// Entries that fail to decode are logged and skipped.
pub fn decode_list<T: DeserializeOwned>(payload: &Value, field: &str) -> Vec<T> {
    extract_list(payload, field)
        .iter()
        .filter_map(|raw| {
            let value = normalize::normalized(raw);
            match serde_json::from_value::<T>(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(field, error = %e, "Skipping undecodable list entry");
                    None
                }
            }
        })
        .collect()
}

/// Decode the single entity named `field` from `payload`, if present.
pub fn decode_entity<T: DeserializeOwned>(payload: &Value, field: &str) -> Option<T> {
    let raw = extract_entity(payload, field)?;
    match serde_json::from_value::<T>(normalize::normalized(raw)) {
        Ok(entity) => Some(entity),
        Err(e) => {
            tracing::debug!(field, error = %e, "Response entity did not decode");
            None
        }
    }
}

/// Distinct post authors in first-occurrence order.
///
/// Used as the suggestion fallback when the suggestions endpoint fails or
/// comes back empty.
pub fn distinct_authors(posts: &[Post]) -> Vec<User> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .filter_map(|post| post.user.as_ref())
        .filter(|user| seen.insert(user.id.clone()))
        .cloned()
        .collect()
}
