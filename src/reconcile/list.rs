use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::models::Identified;

/// Order in which a source delivers a batch.
///
/// Stored lists are always newest first; batches from an `OldestFirst`
/// source are reversed once when ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceOrder {
    NewestFirst,
    #[default]
    OldestFirst,
}

impl SourceOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceOrder::NewestFirst => "newest",
            SourceOrder::OldestFirst => "oldest",
        }
    }
}

impl fmt::Display for SourceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "newest_first" | "desc" => Ok(SourceOrder::NewestFirst),
            "oldest" | "oldest_first" | "asc" => Ok(SourceOrder::OldestFirst),
            other => Err(format!("unknown source order: {}", other)),
        }
    }
}

/// Refresh generation handed out by [`EntityList::begin_refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// A canonical, deduplicated, newest-first list of entities.
#[derive(Debug, Clone)]
pub struct EntityList<T> {
    items: Vec<T>,
    order: SourceOrder,
    requested: u64,
    loaded: bool,
}

impl<T> Default for EntityList<T> {
    fn default() -> Self {
        Self::new(SourceOrder::default())
    }
}

impl<T> EntityList<T> {
    pub fn new(order: SourceOrder) -> Self {
        Self {
            items: Vec::new(),
            order,
            requested: 0,
            loaded: false,
        }
    }

    pub fn order(&self) -> SourceOrder {
        self.order
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether at least one batch has been applied.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Start a refresh. Results tagged with an older generation are
    /// ignored by [`apply_refresh`](Self::apply_refresh).
    pub fn begin_refresh(&mut self) -> Generation {
        self.requested += 1;
        Generation(self.requested)
    }

    /// Generation of the most recently started refresh. Work tagged with
    /// it is discarded once another refresh starts or the list is cleared.
    pub fn current_generation(&self) -> Generation {
        Generation(self.requested)
    }

    /// Whether `generation` is the most recently started refresh.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.requested
    }

    /// Empty the list. Refreshes started before the clear become stale.
    pub fn clear(&mut self) {
        self.items.clear();
        self.loaded = false;
        self.requested += 1;
    }
}

impl<T: Identified> EntityList<T> {
    /// Reverse (for oldest-first sources) and drop duplicate ids, keeping
    /// the first occurrence in the batch's original order.
    fn canonicalize(&self, batch: Vec<T>) -> Vec<T> {
        let mut seen = HashSet::new();
        let mut unique: Vec<T> = batch
            .into_iter()
            .filter(|item| seen.insert(item.id().to_string()))
            .collect();
        if self.order == SourceOrder::OldestFirst {
            unique.reverse();
        }
        unique
    }

    /// Replace the contents with a freshly fetched batch.
    pub fn replace(&mut self, batch: Vec<T>) {
        self.items = self.canonicalize(batch);
        self.loaded = true;
    }

    /// Apply the batch of refresh `generation`. Returns `false` (and leaves
    /// the list untouched) when a newer refresh has been started since.
    pub fn apply_refresh(&mut self, generation: Generation, batch: Vec<T>) -> bool {
        if generation.0 < self.requested {
            tracing::debug!(
                generation = generation.0,
                latest = self.requested,
                "Ignoring stale refresh"
            );
            return false;
        }
        self.replace(batch);
        true
    }

    /// Append an older page below the current items, skipping ids already
    /// present.
    pub fn append_page(&mut self, batch: Vec<T>) {
        let page = self.canonicalize(batch);
        for item in page {
            if !self.contains(item.id()) {
                self.items.push(item);
            }
        }
        self.loaded = true;
    }

    /// Insert a newly created entity at the top, replacing any existing
    /// entry with the same id.
    pub fn insert_newest(&mut self, item: T) {
        self.items.retain(|existing| existing.id() != item.id());
        self.items.insert(0, item);
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Apply `f` to the entity with `id`. Returns whether it was found.
    pub fn update<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        match self.get_mut(id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id().to_string()).collect()
    }
}
