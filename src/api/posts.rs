use serde_json::Value;

use super::{query, seg, ApiClient};
use crate::error::ApiResult;
use crate::models::{Post, PostForm, User};
use crate::reconcile::{decode_entity, decode_list, extract_str};
use crate::traits::{Method, RequestBody};

/// Which posts the feed endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedScope {
    #[default]
    All,
    Following,
}

impl FeedScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedScope::All => "all",
            FeedScope::Following => "following",
        }
    }
}

/// `/posts` endpoints.
pub struct PostsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PostsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Every post, in the order the server sends them.
    pub async fn all(&self) -> ApiResult<Vec<Post>> {
        let payload = self.client.get("/posts").await?;
        Ok(decode_list(&payload, "posts"))
    }

    /// One page of the home feed.
    pub async fn feed(&self, scope: FeedScope, page: u32, limit: u32) -> ApiResult<Vec<Post>> {
        let path = format!(
            "/posts/feed{}",
            query(&[
                ("only", scope.as_str().to_string()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ])
        );
        let payload = self.client.get(&path).await?;
        Ok(decode_list(&payload, "posts"))
    }

    /// A single post. `Ok(None)` when the server answered but the body
    /// carried no recognizable post.
    pub async fn get(&self, post_id: &str) -> ApiResult<Option<Post>> {
        let payload = self.client.get(&format!("/posts/{}", seg(post_id))).await?;
        Ok(decode_entity(&payload, "post"))
    }

    /// Create a post. Returns the created post when the server echoes it.
    pub async fn create(&self, form: &PostForm) -> ApiResult<Option<Post>> {
        let payload = self
            .client
            .request(Method::Post, "/posts", form.to_body())
            .await?;
        Ok(decode_entity(&payload, "post"))
    }

    /// Replace a post's body (and image, when given).
    pub async fn update(&self, post_id: &str, form: &PostForm) -> ApiResult<Option<Post>> {
        let payload = self
            .client
            .request(Method::Put, &format!("/posts/{}", seg(post_id)), form.to_body())
            .await?;
        Ok(decode_entity(&payload, "post"))
    }

    pub async fn delete(&self, post_id: &str) -> ApiResult<()> {
        self.client
            .request(Method::Delete, &format!("/posts/{}", seg(post_id)), RequestBody::Empty)
            .await
            .map(drop)
    }

    /// Flip the viewer's like. The server decides the direction.
    pub async fn toggle_like(&self, post_id: &str) -> ApiResult<Value> {
        self.client
            .request(Method::Put, &format!("/posts/{}/like", seg(post_id)), RequestBody::Empty)
            .await
    }

    /// Users who liked a post.
    pub async fn likes(&self, post_id: &str, page: u32, limit: u32) -> ApiResult<Vec<User>> {
        let path = format!(
            "/posts/{}/likes{}",
            seg(post_id),
            query(&[("page", page.to_string()), ("limit", limit.to_string())])
        );
        let payload = self.client.get(&path).await?;
        Ok(decode_list(&payload, "likes"))
    }

    /// Flip the server-side bookmark.
    pub async fn toggle_bookmark(&self, post_id: &str) -> ApiResult<Value> {
        self.client
            .request(
                Method::Put,
                &format!("/posts/{}/bookmark", seg(post_id)),
                RequestBody::Empty,
            )
            .await
    }

    /// Register a share and return the link the server hands out, if any.
    pub async fn share(&self, post_id: &str) -> ApiResult<Option<String>> {
        let payload = self
            .client
            .request(Method::Post, &format!("/posts/{}/share", seg(post_id)), RequestBody::Empty)
            .await?;
        Ok(extract_str(&payload, "shareUrl").map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::adapters::MockResponse;
    use crate::traits::FormPart;
    use serde_json::json;

    #[tokio::test]
    async fn test_feed_builds_query_and_decodes() {
        let (client, http) = client_with_token(Some("t"));
        http.set_response(
            Method::Get,
            &url("/posts/feed?only=all&page=2&limit=10"),
            MockResponse::json(200, json!({"data": {"posts": [{"_id": "p1"}, {"_id": "p2"}]}})),
        );
        let posts = client.posts().feed(FeedScope::All, 2, 10).await.unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_all_with_unexpected_shape_is_empty() {
        let (client, http) = client_with_token(None);
        http.set_response(Method::Get, &url("/posts"), MockResponse::json(200, json!({"data": 3})));
        assert!(client.posts().all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_sends_multipart_and_reads_echo() {
        let (client, http) = client_with_token(Some("t"));
        http.set_response(
            Method::Post,
            &url("/posts"),
            MockResponse::json(201, json!({"message": "success", "post": {"_id": "new", "body": "hi"}})),
        );
        let created = client.posts().create(&PostForm::new(" hi ")).await.unwrap();
        assert_eq!(created.unwrap().id, "new");

        let request = &http.get_requests()[0];
        match &request.body {
            RequestBody::Multipart(parts) => {
                assert!(matches!(&parts[0], FormPart::Text { name, value } if name == "body" && value == "hi"));
            }
            other => panic!("expected multipart, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_without_echo() {
        let (client, http) = client_with_token(Some("t"));
        http.set_response(Method::Post, &url("/posts"), MockResponse::ok());
        assert!(client.posts().create(&PostForm::new("x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_reads_nested_post() {
        let (client, http) = client_with_token(None);
        http.set_response(
            Method::Get,
            &url("/posts/p7"),
            MockResponse::json(200, json!({"data": {"post": {"_id": "p7", "user": {"_id": "u1"}}}})),
        );
        let post = client.posts().get("p7").await.unwrap().unwrap();
        assert_eq!(post.author_id(), Some("u1"));
    }

    #[tokio::test]
    async fn test_share_url_and_likes() {
        let (client, http) = client_with_token(Some("t"));
        http.set_response(
            Method::Post,
            &url("/posts/p1/share"),
            MockResponse::json(200, json!({"data": {"shareUrl": "https://s/p1"}})),
        );
        http.set_response(
            Method::Get,
            &url("/posts/p1/likes?page=1&limit=20"),
            MockResponse::json(200, json!({"data": {"likes": [{"_id": "u1"}, {"_id": "u2"}]}})),
        );
        assert_eq!(client.posts().share("p1").await.unwrap().as_deref(), Some("https://s/p1"));
        assert_eq!(client.posts().likes("p1", 1, 20).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_like_and_bookmark_use_put() {
        let (client, http) = client_with_token(Some("t"));
        http.set_default_response(MockResponse::ok());
        client.posts().toggle_like("p1").await.unwrap();
        client.posts().toggle_bookmark("p1").await.unwrap();
        assert_eq!(http.count_requests(Method::Put, &url("/posts/p1/like")), 1);
        assert_eq!(http.count_requests(Method::Put, &url("/posts/p1/bookmark")), 1);
    }
}
