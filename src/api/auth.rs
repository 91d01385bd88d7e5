use serde_json::Value;

use super::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::models::{SignInForm, SignUpForm};
use crate::reconcile::extract_str;
use crate::traits::{Method, RequestBody};

/// Sign-in and sign-up. Storing the returned token is up to the caller
/// (see [`App::sign_in`](crate::app::App::sign_in)).
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a session token.
    pub async fn sign_in(&self, form: &SignInForm) -> ApiResult<String> {
        let body = RequestBody::json(form).map_err(|e| ApiError::Encode(e.to_string()))?;
        let payload = self
            .client
            .request(Method::Post, "/users/signin", body)
            .await?;
        extract_str(&payload, "token")
            .map(str::to_string)
            .ok_or_else(|| ApiError::MalformedResponse("sign-in response carried no token".to_string()))
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> ApiResult<Value> {
        let body = RequestBody::json(form).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.client
            .request(Method::Post, "/users/signup", body)
            .await
    }
}
