use thiserror::Error;

use super::StorageError;
use crate::traits::HttpError;

/// Failure while wiring up the production [`App`](crate::app::App).
#[derive(Debug, Error)]
pub enum InitError {
    #[error("could not open local storage: {0}")]
    Storage(#[from] StorageError),

    #[error("could not build http client: {0}")]
    Http(#[from] HttpError),
}
