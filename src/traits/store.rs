//! Local key-value storage trait abstraction.
//!
//! Models the browser-style local storage the client persists into: one
//! string value per key. Operations are synchronous so callers can wrap a
//! read-modify-write in a single lock.

use crate::error::StorageError;

/// Trait for local key-value persistence.
///
/// Implementations include the JSON-file store used in production and an
/// in-memory store for tests.
///
/// # Example
///
/// ```ignore
/// use linkpost::traits::KeyValueStore;
///
/// fn remember_token<S: KeyValueStore>(store: &S, token: &str) -> Result<(), StorageError> {
///     store.set("token", token)
/// }
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Returns
    /// - `Ok(Some(value))` if the key exists
    /// - `Ok(None)` if it does not
    /// - `Err(error)` if the backing storage could not be read
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
