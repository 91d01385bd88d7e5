//! Client configuration.
//!
//! # Example
//!
//! ```ignore
//! use linkpost::config::ClientConfig;
//! use linkpost::reconcile::SourceOrder;
//!
//! let config = ClientConfig::from_env()
//!     .with_feed_order(SourceOrder::NewestFirst)
//!     .with_feed_limit(20);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::reconcile::SourceOrder;

/// Backend the original deployment talks to.
pub const DEFAULT_API_BASE_URL: &str = "https://route-posts.routemisr.com";

pub const ENV_API_URL: &str = "LINKPOST_API_URL";
pub const ENV_DATA_DIR: &str = "LINKPOST_DATA_DIR";
pub const ENV_FEED_ORDER: &str = "LINKPOST_FEED_ORDER";

/// Configuration for [`App`](crate::app::App) and the API client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without trailing slash
    pub api_base_url: String,
    /// Public site root used to build share links the server did not
    /// provide (`<web_base_url>/post/<id>`)
    pub web_base_url: Option<String>,
    /// Directory for `storage.json` (default: `~/.linkpost`)
    pub data_dir: Option<PathBuf>,
    /// Order the feed endpoint delivers posts in
    pub feed_order: SourceOrder,
    /// Page size for feed requests
    pub feed_limit: u32,
    /// How many suggestions to ask for
    pub suggestion_limit: u32,
    /// Page size for notification requests
    pub notifications_limit: u32,
    /// Per-request timeout. `None` means the core imposes none.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            web_base_url: None,
            data_dir: None,
            feed_order: SourceOrder::OldestFirst,
            feed_limit: 50,
            suggestion_limit: 15,
            notifications_limit: 50,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend base URL. Trailing slashes are stripped.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_web_base_url(mut self, url: impl Into<String>) -> Self {
        self.web_base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Link to `post_id` on the public site.
    pub fn post_link(&self, post_id: &str) -> String {
        format!("{}/post/{}", self.web_base_url.as_deref().unwrap_or(""), post_id)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_feed_order(mut self, order: SourceOrder) -> Self {
        self.feed_order = order;
        self
    }

    pub fn with_feed_limit(mut self, limit: u32) -> Self {
        self.feed_limit = limit;
        self
    }

    pub fn with_suggestion_limit(mut self, limit: u32) -> Self {
        self.suggestion_limit = limit;
        self
    }

    pub fn with_notifications_limit(mut self, limit: u32) -> Self {
        self.notifications_limit = limit;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Defaults overridden by `LINKPOST_API_URL`, `LINKPOST_DATA_DIR` and
    /// `LINKPOST_FEED_ORDER` (`newest` or `oldest`). Unparseable values are
    /// logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                config = config.with_api_base_url(url.trim());
            }
        }

        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                config = config.with_data_dir(dir.trim());
            }
        }

        if let Ok(order) = std::env::var(ENV_FEED_ORDER) {
            match order.parse::<SourceOrder>() {
                Ok(order) => config = config.with_feed_order(order),
                Err(e) => tracing::warn!("Ignoring {}: {}", ENV_FEED_ORDER, e),
            }
        }

        config
    }
}
