//! linkpost - client core for a small social network
//!
//! Posts, comments, follows, notifications and a locally persisted saved
//! list, kept consistent under optimistic updates. Rendering is left to
//! the embedding UI; this library owns state and talks to the backend.

pub mod adapters;
pub mod api;
pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod interaction;
pub mod logging;
pub mod models;
pub mod reconcile;
pub mod saved;
pub mod traits;

pub use app::{App, AppMessage, Envelope};
pub use config::ClientConfig;
