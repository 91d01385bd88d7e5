//! Per-key serialized optimistic toggles.
//!
//! Each key holds a confirmed state (what the server last agreed to), a
//! displayed state (confirmed plus every toggle not yet settled), at most
//! one in-flight operation and a count of queued toggles. Queued toggles
//! are dispatched one at a time, each from the end state of the previous
//! one, so the server sees them in issue order.

use std::collections::HashMap;
use std::fmt;

use super::state::{FlagState, InteractionKey, ToggleTarget};
use crate::error::ApiError;

/// Identifies one dispatched remote mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

/// A remote mutation the caller must issue and later report back through
/// [`InteractionController::settle`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub op: OperationId,
    pub target: ToggleTarget,
    pub from: FlagState,
    pub to: FlagState,
}

/// Outcome of [`InteractionController::settle`].
#[derive(Debug, Clone)]
pub enum Settlement {
    /// The server accepted the operation. `state` is the new confirmed
    /// state; `next` is the following queued toggle, already in flight.
    Confirmed {
        key: InteractionKey,
        target: ToggleTarget,
        state: FlagState,
        next: Option<Dispatch>,
    },
    /// The server refused or was unreachable. The display went back to
    /// `restored` and `dropped` queued toggles were discarded.
    RolledBack {
        key: InteractionKey,
        target: ToggleTarget,
        restored: FlagState,
        dropped: u32,
        error: ApiError,
    },
    /// The operation no longer matters (its entity was forgotten).
    Stale,
}

#[derive(Debug, Clone)]
struct InFlight {
    op: OperationId,
    intended: FlagState,
}

#[derive(Debug, Clone)]
struct Entry {
    target: ToggleTarget,
    confirmed: FlagState,
    displayed: FlagState,
    in_flight: Option<InFlight>,
    queued: u32,
}

impl Entry {
    fn is_busy(&self) -> bool {
        self.in_flight.is_some() || self.queued > 0
    }
}

/// Optimistic toggle bookkeeping for every key in view.
#[derive(Debug, Default)]
pub struct InteractionController {
    entries: HashMap<InteractionKey, Entry>,
    operations: HashMap<OperationId, InteractionKey>,
    next_op: u64,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the server's view of `target`. Ignored while the key has
    /// work in flight or queued, so a refresh can never clobber a pending
    /// optimistic state.
    pub fn seed(&mut self, target: ToggleTarget, baseline: FlagState) {
        let key = target.key();
        if let Some(entry) = self.entries.get(&key) {
            if entry.is_busy() {
                tracing::trace!(%key, "Seed ignored, key busy");
                return;
            }
        }
        self.entries.insert(
            key,
            Entry {
                target,
                confirmed: baseline,
                displayed: baseline,
                in_flight: None,
                queued: 0,
            },
        );
    }

    /// Displayed state for `key`, if the controller knows it.
    pub fn state(&self, key: &InteractionKey) -> Option<FlagState> {
        self.entries.get(key).map(|e| e.displayed)
    }

    /// Displayed state for `key`, or `fallback` when unknown.
    pub fn state_or(&self, key: &InteractionKey, fallback: FlagState) -> FlagState {
        self.state(key).unwrap_or(fallback)
    }

    pub fn confirmed(&self, key: &InteractionKey) -> Option<FlagState> {
        self.entries.get(key).map(|e| e.confirmed)
    }

    pub fn is_in_flight(&self, key: &InteractionKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.in_flight.is_some())
    }

    pub fn queued(&self, key: &InteractionKey) -> u32 {
        self.entries.get(key).map_or(0, |e| e.queued)
    }

    /// Number of operations awaiting settlement.
    pub fn in_flight_count(&self) -> usize {
        self.operations.len()
    }

    /// Toggle `target`.
    ///
    /// The displayed state flips immediately. If nothing is in flight for
    /// the key a [`Dispatch`] is returned for the caller to issue;
    /// otherwise the toggle is queued behind the in-flight operation.
    ///
    /// `baseline` is only used when the key is unknown.
    pub fn request(&mut self, target: ToggleTarget, baseline: FlagState) -> Option<Dispatch> {
        let key = target.key();
        let counted = key.kind.counted();
        let entry = self.entries.entry(key.clone()).or_insert_with(|| Entry {
            target: target.clone(),
            confirmed: baseline,
            displayed: baseline,
            in_flight: None,
            queued: 0,
        });
        entry.displayed = entry.displayed.toggled(counted);

        if entry.in_flight.is_some() {
            entry.queued += 1;
            tracing::debug!(%key, queued = entry.queued, "Toggle queued behind in-flight operation");
            return None;
        }

        let from = entry.confirmed;
        let to = from.toggled(counted);
        let op = OperationId(self.next_op);
        self.next_op += 1;
        entry.in_flight = Some(InFlight { op, intended: to });
        self.operations.insert(op, key.clone());
        tracing::debug!(%key, %op, "Dispatching toggle");
        Some(Dispatch {
            op,
            target: entry.target.clone(),
            from,
            to,
        })
    }

    /// Report the result of a dispatched operation.
    pub fn settle(&mut self, op: OperationId, result: Result<(), ApiError>) -> Settlement {
        let Some(key) = self.operations.remove(&op) else {
            tracing::debug!(%op, "Settlement for unknown operation");
            return Settlement::Stale;
        };
        let Some(entry) = self.entries.get_mut(&key) else {
            return Settlement::Stale;
        };
        let intended = match &entry.in_flight {
            Some(in_flight) if in_flight.op == op => in_flight.intended,
            _ => return Settlement::Stale,
        };
        entry.in_flight = None;

        match result {
            Ok(()) => {
                entry.confirmed = intended;
                let next = if entry.queued > 0 {
                    entry.queued -= 1;
                    let to = intended.toggled(key.kind.counted());
                    let next_op = OperationId(self.next_op);
                    self.next_op += 1;
                    entry.in_flight = Some(InFlight {
                        op: next_op,
                        intended: to,
                    });
                    self.operations.insert(next_op, key.clone());
                    Some(Dispatch {
                        op: next_op,
                        target: entry.target.clone(),
                        from: intended,
                        to,
                    })
                } else {
                    None
                };
                tracing::debug!(%key, %op, "Toggle confirmed");
                Settlement::Confirmed {
                    key,
                    target: entry.target.clone(),
                    state: intended,
                    next,
                }
            }
            Err(error) => {
                let dropped = entry.queued;
                entry.queued = 0;
                entry.displayed = entry.confirmed;
                tracing::warn!(%key, %op, dropped, error = %error, "Toggle rolled back");
                Settlement::RolledBack {
                    key,
                    target: entry.target.clone(),
                    restored: entry.confirmed,
                    dropped,
                    error,
                }
            }
        }
    }

    /// Drop every key for `entity_id`. Later settlements for them are
    /// [`Settlement::Stale`].
    pub fn forget(&mut self, entity_id: &str) {
        self.forget_where(|target| target.entity_id() == entity_id);
    }

    /// Drop every key belonging to `post_id`: its like, its bookmark and
    /// the likes of its comments.
    pub fn forget_post(&mut self, post_id: &str) {
        self.forget_where(|target| target.post_id() == Some(post_id));
    }

    /// Drop every key and every operation in flight. Operation ids keep
    /// increasing, so settlements issued before the reset stay
    /// [`Settlement::Stale`].
    pub fn reset(&mut self) {
        self.entries.clear();
        self.operations.clear();
    }

    /// Drop idle keys whose target `keep` rejects. Keys with an operation
    /// in flight or queued are always kept.
    pub fn retain_idle<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ToggleTarget) -> bool,
    {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.is_busy() || keep(&entry.target));
        let pruned = before - self.entries.len();
        if pruned > 0 {
            tracing::trace!(pruned, "Pruned idle interaction keys");
        }
    }

    fn forget_where<F>(&mut self, predicate: F)
    where
        F: Fn(&ToggleTarget) -> bool,
    {
        self.entries.retain(|_, entry| !predicate(&entry.target));
        let entries = &self.entries;
        self.operations.retain(|_, key| entries.contains_key(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ToggleKind;
    use crate::traits::HttpError;

    fn post(id: &str) -> ToggleTarget {
        ToggleTarget::Post(id.to_string())
    }

    fn network() -> ApiError {
        ApiError::from(HttpError::ConnectionFailed("down".to_string()))
    }

    #[test]
    fn test_request_applies_and_dispatches() {
        let mut c = InteractionController::new();
        let d = c.request(post("p1"), FlagState::new(false, 3)).unwrap();
        assert_eq!(d.from, FlagState::new(false, 3));
        assert_eq!(d.to, FlagState::new(true, 4));
        let key = post("p1").key();
        assert_eq!(c.state(&key), Some(FlagState::new(true, 4)));
        assert!(c.is_in_flight(&key));
    }

    #[test]
    fn test_success_keeps_state() {
        let mut c = InteractionController::new();
        let d = c.request(post("p1"), FlagState::new(false, 3)).unwrap();
        match c.settle(d.op, Ok(())) {
            Settlement::Confirmed { state, next, .. } => {
                assert_eq!(state, FlagState::new(true, 4));
                assert!(next.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(c.state(&post("p1").key()), Some(FlagState::new(true, 4)));
        assert_eq!(c.in_flight_count(), 0);
    }

    #[test]
    fn test_failure_restores_previous_exactly() {
        let mut c = InteractionController::new();
        let d = c.request(post("p1"), FlagState::new(false, 3)).unwrap();
        match c.settle(d.op, Err(network())) {
            Settlement::RolledBack { restored, dropped, .. } => {
                assert_eq!(restored, FlagState::new(false, 3));
                assert_eq!(dropped, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(c.state(&post("p1").key()), Some(FlagState::new(false, 3)));
    }

    #[test]
    fn test_double_toggle_is_serialized() {
        let mut c = InteractionController::new();
        let key = post("p1").key();
        let first = c.request(post("p1"), FlagState::new(false, 0)).unwrap();
        assert!(c.request(post("p1"), FlagState::new(false, 0)).is_none());
        assert_eq!(c.state(&key), Some(FlagState::new(false, 0)));
        assert_eq!(c.queued(&key), 1);

        let second = match c.settle(first.op, Ok(())) {
            Settlement::Confirmed { state, next, .. } => {
                assert_eq!(state, FlagState::new(true, 1));
                next.unwrap()
            }
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(second.from, FlagState::new(true, 1));
        assert_eq!(second.to, FlagState::new(false, 0));

        assert!(matches!(c.settle(second.op, Ok(())), Settlement::Confirmed { next: None, .. }));
        assert_eq!(c.state(&key), Some(FlagState::new(false, 0)));
        assert_eq!(c.confirmed(&key), Some(FlagState::new(false, 0)));
    }

    #[test]
    fn test_failure_drops_queued_toggles() {
        let mut c = InteractionController::new();
        let key = post("p1").key();
        let first = c.request(post("p1"), FlagState::new(true, 5)).unwrap();
        c.request(post("p1"), FlagState::new(true, 5));
        c.request(post("p1"), FlagState::new(true, 5));
        assert_eq!(c.state(&key), Some(FlagState::new(false, 4)));

        match c.settle(first.op, Err(network())) {
            Settlement::RolledBack { restored, dropped, .. } => {
                assert_eq!(restored, FlagState::new(true, 5));
                assert_eq!(dropped, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(c.state(&key), Some(FlagState::new(true, 5)));
        assert!(!c.is_in_flight(&key));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut c = InteractionController::new();
        assert!(c.request(post("p1"), FlagState::default()).is_some());
        assert!(c.request(post("p2"), FlagState::default()).is_some());
        assert!(c
            .request(ToggleTarget::Bookmark("p1".to_string()), FlagState::default())
            .is_some());
        assert_eq!(c.in_flight_count(), 3);
    }

    #[test]
    fn test_forget_makes_settlement_stale() {
        let mut c = InteractionController::new();
        let d = c.request(post("p1"), FlagState::new(false, 0)).unwrap();
        c.forget("p1");
        assert!(matches!(c.settle(d.op, Err(network())), Settlement::Stale));
        assert!(c.state(&post("p1").key()).is_none());
        assert_eq!(c.in_flight_count(), 0);
    }

    #[test]
    fn test_forget_post_covers_comments_and_bookmark() {
        let mut c = InteractionController::new();
        let comment = ToggleTarget::Comment {
            post_id: "p1".to_string(),
            comment_id: "c1".to_string(),
        };
        c.request(comment.clone(), FlagState::default());
        c.request(ToggleTarget::Bookmark("p1".to_string()), FlagState::default());
        c.request(post("p2"), FlagState::default());
        c.forget_post("p1");
        assert!(c.state(&comment.key()).is_none());
        assert!(c.state(&InteractionKey::new("p1", ToggleKind::Bookmark)).is_none());
        assert!(c.state(&post("p2").key()).is_some());
        assert_eq!(c.in_flight_count(), 1);
    }

    #[test]
    fn test_seed_skips_busy_keys() {
        let mut c = InteractionController::new();
        let key = post("p1").key();
        c.seed(post("p1"), FlagState::new(false, 1));
        let d = c.request(post("p1"), FlagState::new(false, 1)).unwrap();
        c.seed(post("p1"), FlagState::new(false, 1));
        assert_eq!(c.state(&key), Some(FlagState::new(true, 2)));

        c.settle(d.op, Ok(()));
        c.seed(post("p1"), FlagState::new(true, 7));
        assert_eq!(c.state(&key), Some(FlagState::new(true, 7)));
    }

    #[test]
    fn test_unknown_operation_is_stale() {
        let mut c = InteractionController::new();
        let d = c.request(post("p1"), FlagState::default()).unwrap();
        c.settle(d.op, Ok(()));
        assert!(matches!(c.settle(d.op, Ok(())), Settlement::Stale));
    }

    #[test]
    fn test_like_count_never_negative() {
        let mut c = InteractionController::new();
        let d = c.request(post("p1"), FlagState::new(true, 0)).unwrap();
        assert_eq!(d.to, FlagState::new(false, 0));
    }

    #[test]
    fn test_reset_keeps_operation_ids_unique() {
        let mut c = InteractionController::new();
        let old = c.request(post("p1"), FlagState::new(false, 0)).unwrap();
        c.reset();
        assert_eq!(c.in_flight_count(), 0);

        let fresh = c.request(post("p5"), FlagState::new(false, 0)).unwrap();
        assert_ne!(old.op, fresh.op);
        assert!(matches!(c.settle(old.op, Err(network())), Settlement::Stale));
        assert!(c.is_in_flight(&post("p5").key()));
        assert_eq!(c.state(&post("p5").key()), Some(FlagState::new(true, 1)));
    }

    #[test]
    fn test_retain_idle_spares_busy_keys() {
        let mut c = InteractionController::new();
        c.seed(post("gone"), FlagState::new(false, 2));
        c.seed(post("kept"), FlagState::new(true, 1));
        let busy = c.request(post("busy"), FlagState::new(false, 0)).unwrap();

        c.retain_idle(|target| target.entity_id() == "kept");

        assert_eq!(c.state(&post("gone").key()), None);
        assert!(c.state(&post("kept").key()).is_some());
        assert!(c.is_in_flight(&post("busy").key()));
        assert!(matches!(c.settle(busy.op, Ok(())), Settlement::Confirmed { .. }));
    }
}
