//! Optimistic interactions and non-optimistic pending actions.
//!
//! Likes, follows and bookmarks are applied locally at once and settled
//! when the server answers ([`InteractionController`]). Deletes, edits,
//! creates and mark-read wait for the server before touching any list
//! ([`PendingActions`]).

mod controller;
mod pending;
mod state;

pub use controller::{Dispatch, InteractionController, OperationId, Settlement};
pub use pending::{ActionKind, PendingAction, PendingActions};
pub use state::{FlagState, InteractionKey, ToggleKind, ToggleTarget};
