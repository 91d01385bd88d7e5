//! Locally persisted set of bookmarked post ids.
//!
//! Stored as a JSON array of strings under [`SAVED_POSTS_KEY`]. The most
//! recently saved id comes first.

use std::sync::{Arc, Mutex};

use crate::error::StorageError;
use crate::traits::KeyValueStore;

pub const SAVED_POSTS_KEY: &str = "saved_post_ids";

/// Where the last toggle removed an id from, so an immediate re-toggle
/// puts it back in place.
#[derive(Debug)]
struct Removal {
    id: String,
    index: usize,
    after: Vec<String>,
}

/// Ordered saved-post set on top of a [`KeyValueStore`].
#[derive(Clone)]
pub struct SavedPosts {
    store: Arc<dyn KeyValueStore>,
    /// Guards read-modify-write so concurrent toggles never interleave.
    lock: Arc<Mutex<Option<Removal>>>,
}

impl SavedPosts {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(None)),
        }
    }

    /// Persisted ids, newest first. Empty when absent or unreadable.
    pub fn ids(&self) -> Vec<String> {
        match self.read() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Saved posts unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    pub fn is_saved(&self, post_id: &str) -> bool {
        self.ids().iter().any(|id| id == post_id)
    }

    /// Remove `post_id` when present (every occurrence), otherwise prepend
    /// it. Returns the new contents.
    ///
    /// Toggling the same id twice in a row restores the prior contents and
    /// order: an id re-added right after its removal goes back to where it
    /// was instead of the front.
    pub fn toggle(&self, post_id: &str) -> Result<Vec<String>, StorageError> {
        let mut last_removal = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids = self.read_or_empty();
        let removal = if let Some(index) = ids.iter().position(|id| id == post_id) {
            ids.retain(|id| id != post_id);
            Some(Removal {
                id: post_id.to_string(),
                index,
                after: ids.clone(),
            })
        } else {
            let index = match last_removal.as_ref() {
                Some(r) if r.id == post_id && r.after == ids => r.index,
                _ => 0,
            };
            ids.insert(index, post_id.to_string());
            None
        };
        self.write(&ids)?;
        *last_removal = removal;
        Ok(ids)
    }

    /// Make `post_id` saved or not. Saving an already saved id keeps its
    /// position.
    pub fn set_saved(&self, post_id: &str, saved: bool) -> Result<Vec<String>, StorageError> {
        let mut last_removal = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        *last_removal = None;
        let mut ids = self.read_or_empty();
        let present = ids.iter().any(|id| id == post_id);
        match (saved, present) {
            (true, true) | (false, false) => return Ok(ids),
            (true, false) => ids.insert(0, post_id.to_string()),
            (false, true) => ids.retain(|id| id != post_id),
        }
        self.write(&ids)?;
        Ok(ids)
    }

    fn read(&self) -> Result<Vec<String>, StorageError> {
        match self.store.get(SAVED_POSTS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn read_or_empty(&self) -> Vec<String> {
        self.read().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Saved posts unreadable, starting from empty");
            Vec::new()
        })
    }

    fn write(&self, ids: &[String]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(ids)?;
        self.store.set(SAVED_POSTS_KEY, &raw)
    }
}

impl std::fmt::Debug for SavedPosts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedPosts").finish_non_exhaustive()
    }
}
