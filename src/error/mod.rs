//! Error handling for linkpost.
//!
//! - **Error Categories**: classification used for logging and notices
//! - **ApiError**: failures of the remote resource client
//! - **StorageError**: failures of the local key-value store
//!
//! Malformed list payloads are not errors: the reconciler turns them into
//! empty lists.
//!
//! | Category | Source | Surfaced as |
//! |----------|--------|-------------|
//! | Network | transport failure | notice with fallback text |
//! | Validation | 4xx rejection | notice with server text |
//! | Auth | 401 rejection | notice with server text |
//! | Server | 5xx rejection | notice with server text |
//! | Malformed | non-JSON body | notice with fallback text |
//! | Storage | local store io | log only |

mod api;
mod category;
mod init;
mod storage;

pub use api::ApiError;
pub use category::ErrorCategory;
pub use init::InitError;
pub use storage::StorageError;

/// Result alias for remote calls.
pub type ApiResult<T> = Result<T, ApiError>;
