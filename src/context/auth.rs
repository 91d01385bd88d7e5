use std::sync::{Arc, RwLock};

use crate::error::StorageError;
use crate::traits::KeyValueStore;

/// Storage key of the session token.
pub const TOKEN_KEY: &str = "token";

/// Holds the session token and persists it.
///
/// Shared between [`ApiClient`](crate::api::ApiClient), which reads the
/// token for every request, and the app, which changes it on sign-in and
/// log-out.
pub struct AuthContext {
    store: Arc<dyn KeyValueStore>,
    token: RwLock<Option<String>>,
}

impl AuthContext {
    /// Context restored from `store`. A read failure starts signed out.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let token = match store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored token");
                None
            }
        };
        Self {
            store,
            token: RwLock::new(token),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store a new token in memory and on disk.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), StorageError> {
        let token = token.into();
        self.store.set(TOKEN_KEY, &token)?;
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
        tracing::info!("Signed in");
        Ok(())
    }

    /// Forget the token. The in-memory token is cleared even when removing
    /// it from storage fails.
    pub fn log_out(&self) -> Result<(), StorageError> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        tracing::info!("Signed out");
        self.store.remove(TOKEN_KEY)
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
