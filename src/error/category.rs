//! Error category classification.
//!
//! Categories decide how a failure is surfaced: every category is shown to
//! the user as a notice, none of them is retried automatically.

use std::fmt;

/// High-level categorization of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The request never reached the server or never came back.
    Network,

    /// The server rejected the payload (duplicate account, ownership
    /// violation on delete/edit, bad input).
    Validation,

    /// Missing or rejected credentials (HTTP 401).
    Auth,

    /// Backend failure (HTTP 5xx).
    Server,

    /// Response body could not be interpreted at all.
    Malformed,

    /// Local persistence failure.
    Storage,
}

impl ErrorCategory {
    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Malformed => "malformed",
            ErrorCategory::Storage => "storage",
        }
    }

    /// Returns a user-friendly description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connectivity issue",
            ErrorCategory::Validation => "Request rejected by the server",
            ErrorCategory::Auth => "Authentication problem",
            ErrorCategory::Server => "Server-side issue",
            ErrorCategory::Malformed => "Unexpected server response",
            ErrorCategory::Storage => "Local storage problem",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
