//! Errors returned by the remote resource client.

use thiserror::Error;

use super::ErrorCategory;
use crate::traits::HttpError;

/// Failure of a call against the REST backend.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Request never reached the server or never returned.
    #[error("network failure: {message}")]
    Network { message: String },

    /// Server answered with a non-2xx status.
    #[error("request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        /// Human-readable message supplied by the server, if any.
        message: Option<String>,
    },

    /// Body was not JSON at all.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Request payload could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl ApiError {
    /// Build a rejection from a status code and raw response body.
    ///
    /// The backend reports failures as `{"message": ...}` or
    /// `{"error": ...}`; either is kept as the user-facing message.
    pub fn rejected(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| server_message(&value));
        ApiError::Rejected { status, message }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Network { .. } => ErrorCategory::Network,
            ApiError::Rejected { status: 401, .. } => ErrorCategory::Auth,
            ApiError::Rejected { status, .. } if *status >= 500 => ErrorCategory::Server,
            ApiError::Rejected { .. } => ErrorCategory::Validation,
            ApiError::MalformedResponse(_) => ErrorCategory::Malformed,
            ApiError::Encode(_) => ErrorCategory::Validation,
        }
    }

    /// Message provided by the server, when there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text to show the user: the server's message, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn server_message(value: &serde_json::Value) -> Option<String> {
    ["message", "error"].iter().find_map(|key| {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        ApiError::Network {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::MalformedResponse(err.to_string())
    }
}
