//! Remote resource client for the social REST backend.
//!
//! [`ApiClient`] owns the transport, the base URL and the shared
//! [`AuthContext`]. Resource groups are borrowed views:
//!
//! ```ignore
//! let posts = client.posts().feed(FeedScope::All, 1, 50).await?;
//! client.posts().toggle_like("p1").await?;
//! client.comments().create("p1", &CommentForm::new("nice")).await?;
//! ```
//!
//! Every call maps transport failures to [`ApiError::Network`] and non-2xx
//! statuses to [`ApiError::Rejected`] carrying the server's message. List
//! payloads are reconciled (envelope extraction, `_id` normalization)
//! before they are returned.

mod auth;
mod comments;
mod notifications;
mod posts;
mod users;

pub use auth::AuthApi;
pub use comments::CommentsApi;
pub use notifications::NotificationsApi;
pub use posts::{FeedScope, PostsApi};
pub use users::UsersApi;

use std::sync::Arc;

use serde_json::Value;

use crate::context::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::traits::{Headers, HttpClient, Method, RequestBody};

/// Client for the REST backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    auth: Arc<AuthContext>,
}

impl ApiClient {
    /// Create a client.
    ///
    /// # Arguments
    /// * `http` - Transport implementation
    /// * `base_url` - Backend root, e.g. `https://route-posts.routemisr.com`
    /// * `auth` - Token source for request headers
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>, auth: Arc<AuthContext>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_context(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub fn posts(&self) -> PostsApi<'_> {
        PostsApi::new(self)
    }

    pub fn comments(&self) -> CommentsApi<'_> {
        CommentsApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(self)
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Both header spellings the backend accepts, when signed in.
    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let Some(token) = self.auth.token() {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
            headers.insert("token".to_string(), token);
        }
        headers
    }

    /// Send a request and return the decoded JSON body.
    ///
    /// An empty 2xx body decodes as `Value::Null`.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> ApiResult<Value> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "API request");

        let response = self
            .http
            .send(method, &url, body, &self.headers())
            .await
            .map_err(|e| {
                tracing::warn!(%method, %url, error = %e, "API request failed");
                ApiError::from(e)
            })?;

        if !response.is_success() {
            let error = ApiError::rejected(response.status, &response.body);
            tracing::warn!(%method, %url, status = response.status, error = %error, "API request rejected");
            return Err(error);
        }

        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(response.json::<Value>()?)
    }

    pub(crate) async fn get(&self, path: &str) -> ApiResult<Value> {
        self.request(Method::Get, path, RequestBody::Empty).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Query string from key/value pairs, values percent-encoded.
pub(crate) fn query(pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let encoded: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    format!("?{}", encoded.join("&"))
}

/// Percent-encode one path segment (entity ids come from the server, but
/// are not trusted to be URL-safe).
pub(crate) fn seg(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
