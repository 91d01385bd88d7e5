use serde_json::Value;

use super::{query, seg, ApiClient};
use crate::error::{ApiError, ApiResult};
use crate::models::{ChangePasswordForm, ImageAttachment, Post, User};
use crate::reconcile::{decode_entity, decode_list, extract_str};
use crate::traits::{Method, RequestBody};

/// `/users` endpoints.
pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The signed-in user.
    pub async fn profile(&self) -> ApiResult<User> {
        let payload = self.client.get("/users/profile-data").await?;
        decode_entity(&payload, "user").ok_or_else(|| {
            ApiError::MalformedResponse("profile response carried no user".to_string())
        })
    }

    /// Posts written by `user_id`.
    pub async fn posts(&self, user_id: &str, page: u32, limit: u32) -> ApiResult<Vec<Post>> {
        let path = format!(
            "/users/{}/posts{}",
            seg(user_id),
            query(&[("page", page.to_string()), ("limit", limit.to_string())])
        );
        let payload = self.client.get(&path).await?;
        Ok(decode_list(&payload, "posts"))
    }

    pub async fn suggestions(&self, limit: u32) -> ApiResult<Vec<User>> {
        let path = format!("/users/suggestions{}", query(&[("limit", limit.to_string())]));
        let payload = self.client.get(&path).await?;
        Ok(decode_list(&payload, "users"))
    }

    /// Follow `user_id`. The backend toggles on the same route as
    /// [`unfollow`](Self::unfollow).
    pub async fn follow(&self, user_id: &str) -> ApiResult<Value> {
        self.toggle_follow(user_id).await
    }

    pub async fn unfollow(&self, user_id: &str) -> ApiResult<Value> {
        self.toggle_follow(user_id).await
    }

    async fn toggle_follow(&self, user_id: &str) -> ApiResult<Value> {
        self.client
            .request(
                Method::Put,
                &format!("/users/{}/follow", seg(user_id)),
                RequestBody::Empty,
            )
            .await
    }

    /// Upload a new profile photo. Returns the new photo URL when the
    /// server reports it.
    pub async fn upload_photo(&self, photo: &ImageAttachment) -> ApiResult<Option<String>> {
        let payload = self
            .client
            .request(Method::Put, "/users/upload-photo", photo.to_photo_body())
            .await?;
        let from_user = decode_entity::<User>(&payload, "user").and_then(|u| u.photo);
        Ok(from_user.or_else(|| extract_str(&payload, "photo").map(str::to_string)))
    }

    /// Change the password. The backend may issue a fresh token, which is
    /// returned when present.
    pub async fn change_password(&self, form: &ChangePasswordForm) -> ApiResult<Option<String>> {
        let body = RequestBody::json(form).map_err(|e| ApiError::Encode(e.to_string()))?;
        let payload = self
            .client
            .request(Method::Post, "/users/change-password", body)
            .await?;
        Ok(extract_str(&payload, "token").map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::adapters::MockResponse;
    use bytes::Bytes;
    use serde_json::json;

    #[tokio::test]
    async fn test_profile_reads_data_user() {
        let (client, http) = client_with_token(Some("t"));
        http.set_response(
            Method::Get,
            &url("/users/profile-data"),
            MockResponse::json(200, json!({"message": "success", "data": {"user": {"_id": "me", "name": "Me"}}})),
        );
        let me = client.users().profile().await.unwrap();
        assert_eq!(me.id, "me");
    }

    #[tokio::test]
    async fn test_profile_without_user_is_malformed() {
        let (client, http) = client_with_token(Some("t"));
        http.set_response(Method::Get, &url("/users/profile-data"), MockResponse::ok());
        assert!(matches!(
            client.users().profile().await.unwrap_err(),
            ApiError::MalformedResponse(_)
        ));
    }

    #[tokio::test]
    async fn test_follow_and_unfollow_share_route() {
        let (client, http) = client_with_token(Some("t"));
        http.set_default_response(MockResponse::ok());
        client.users().follow("u1").await.unwrap();
        client.users().unfollow("u1").await.unwrap();
        assert_eq!(http.count_requests(Method::Put, &url("/users/u1/follow")), 2);
    }

    #[tokio::test]
    async fn test_suggestions_and_user_posts() {
        let (client, http) = client_with_token(Some("t"));
        http.set_response(
            Method::Get,
            &url("/users/suggestions?limit=15"),
            MockResponse::json(200, json!({"data": {"users": [{"_id": "u1"}]}})),
        );
        http.set_response(
            Method::Get,
            &url("/users/u1/posts?page=1&limit=20"),
            MockResponse::json(200, json!({"posts": [{"_id": "p1"}, {"_id": "p2"}]})),
        );
        assert_eq!(client.users().suggestions(15).await.unwrap().len(), 1);
        assert_eq!(client.users().posts("u1", 1, 20).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_change_password_sends_json() {
        let (client, http) = client_with_token(Some("t"));
        http.set_response(
            Method::Post,
            &url("/users/change-password"),
            MockResponse::json(200, json!({"message": "success", "token": "fresh"})),
        );
        let form = ChangePasswordForm {
            password: "old".to_string(),
            new_password: "new".to_string(),
        };
        let token = client.users().change_password(&form).await.unwrap();
        assert_eq!(token.as_deref(), Some("fresh"));

        match &http.get_requests()[0].body {
            RequestBody::Json(raw) => {
                let sent: Value = serde_json::from_str(raw).unwrap();
                assert_eq!(sent["newPassword"], "new");
            }
            other => panic!("expected json, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_photo() {
        let (client, http) = client_with_token(Some("t"));
        http.set_response(
            Method::Put,
            &url("/users/upload-photo"),
            MockResponse::json(200, json!({"data": {"user": {"_id": "me", "photo": "https://cdn/me.png"}}})),
        );
        let photo = ImageAttachment::new("me.png", "image/png", Bytes::from_static(b"img"));
        let url = client.users().upload_photo(&photo).await.unwrap();
        assert_eq!(url.as_deref(), Some("https://cdn/me.png"));
    }
}
