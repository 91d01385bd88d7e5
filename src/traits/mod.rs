//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations against the REST backend
//! - [`KeyValueStore`] - Local persistence (saved posts, auth token)

pub mod http;
pub mod store;

pub use http::{FormPart, Headers, HttpClient, HttpError, Method, RequestBody, Response};
pub use store::KeyValueStore;
