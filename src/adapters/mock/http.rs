//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses or errors for testing purposes.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::traits::{Headers, HttpClient, HttpError, Method, RequestBody, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: RequestBody,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a response (any status)
    Success(Response),
    /// Return a transport error
    Error(HttpError),
}

impl MockResponse {
    /// Response with a JSON body.
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        MockResponse::Success(Response::json_body(status, &value))
    }

    /// 200 response with `{"message": "success"}`.
    pub fn ok() -> Self {
        Self::json(200, serde_json::json!({ "message": "success" }))
    }

    /// Connection failure.
    pub fn network_error() -> Self {
        MockResponse::Error(HttpError::ConnectionFailed("connection refused".to_string()))
    }
}

type RouteKey = (Method, String);

/// Mock HTTP client for testing.
///
/// Responses are looked up by method and URL. One-shot responses queued
/// with [`MockHttpClient::push_response`] are consumed first; then the
/// standing response for the exact URL, then the longest configured URL
/// prefix, then the default.
///
/// # Example
///
/// ```ignore
/// use linkpost::adapters::mock::{MockHttpClient, MockResponse};
/// use linkpost::traits::{HttpClient, Headers, Method, RequestBody};
///
/// let client = MockHttpClient::new();
/// client.set_response(Method::Put, "https://api.test/posts/p1/like", MockResponse::ok());
///
/// client.put("https://api.test/posts/p1/like", RequestBody::Empty, &Headers::new()).await?;
/// assert_eq!(client.count_requests(Method::Put, "https://api.test/posts/p1/like"), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Standing responses by route
    responses: Arc<Mutex<HashMap<RouteKey, MockResponse>>>,
    /// One-shot responses consumed in order
    queued: Arc<Mutex<HashMap<RouteKey, VecDeque<MockResponse>>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            queued: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the standing response for a route.
    ///
    /// The URL matches exactly or as a prefix of the requested URL.
    pub fn set_response(&self, method: Method, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert((method, url.to_string()), response);
    }

    /// Queue a one-shot response for an exact route.
    pub fn push_response(&self, method: Method, url: &str, response: MockResponse) {
        let mut queued = self.queued.lock().unwrap();
        queued
            .entry((method, url.to_string()))
            .or_default()
            .push_back(response);
    }

    /// Set a default response for routes without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of recorded requests for an exact route.
    pub fn count_requests(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Clear all configured responses.
    pub fn clear_responses(&self) {
        self.responses.lock().unwrap().clear();
        self.queued.lock().unwrap().clear();
    }

    fn record_request(&self, method: Method, url: &str, headers: &Headers, body: RequestBody) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method,
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn get_response(&self, method: Method, url: &str) -> Option<MockResponse> {
        let key = (method, url.to_string());
        if let Some(response) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front())
        {
            return Some(response);
        }

        let responses = self.responses.lock().unwrap();
        if let Some(response) = responses.get(&key) {
            return Some(response.clone());
        }

        // Longest matching prefix wins, so "/posts" never shadows "/posts/p1/like"
        let by_prefix = responses
            .iter()
            .filter(|((m, pattern), _)| *m == method && url.starts_with(pattern.as_str()))
            .max_by_key(|((_, pattern), _)| pattern.len())
            .map(|(_, response)| response.clone());
        if by_prefix.is_some() {
            return by_prefix;
        }

        self.default_response.lock().unwrap().clone()
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        self.record_request(method, url, headers, body);

        match self.get_response(method, url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!(
                "No mock response for {} {}",
                method, url
            ))),
        }
    }
}
