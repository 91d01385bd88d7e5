use serde_json::Value;

use super::{seg, ApiClient};
use crate::error::ApiResult;
use crate::models::{Comment, CommentForm};
use crate::reconcile::{decode_entity, decode_list};
use crate::traits::{Method, RequestBody};

/// `/posts/{post}/comments` endpoints, replies included.
pub struct CommentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CommentsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn base(post_id: &str) -> String {
        format!("/posts/{}/comments", seg(post_id))
    }

    fn item(post_id: &str, comment_id: &str) -> String {
        format!("{}/{}", Self::base(post_id), seg(comment_id))
    }

    pub async fn list(&self, post_id: &str) -> ApiResult<Vec<Comment>> {
        let payload = self.client.get(&Self::base(post_id)).await?;
        Ok(decode_list(&payload, "comments"))
    }

    pub async fn create(&self, post_id: &str, form: &CommentForm) -> ApiResult<Option<Comment>> {
        let payload = self
            .client
            .request(Method::Post, &Self::base(post_id), form.to_body())
            .await?;
        Ok(decode_entity(&payload, "comment"))
    }

    pub async fn update(
        &self,
        post_id: &str,
        comment_id: &str,
        form: &CommentForm,
    ) -> ApiResult<Option<Comment>> {
        let payload = self
            .client
            .request(Method::Put, &Self::item(post_id, comment_id), form.to_body())
            .await?;
        Ok(decode_entity(&payload, "comment"))
    }

    pub async fn delete(&self, post_id: &str, comment_id: &str) -> ApiResult<()> {
        self.client
            .request(Method::Delete, &Self::item(post_id, comment_id), RequestBody::Empty)
            .await
            .map(drop)
    }

    pub async fn toggle_like(&self, post_id: &str, comment_id: &str) -> ApiResult<Value> {
        self.client
            .request(
                Method::Put,
                &format!("{}/like", Self::item(post_id, comment_id)),
                RequestBody::Empty,
            )
            .await
    }

    pub async fn replies(&self, post_id: &str, comment_id: &str) -> ApiResult<Vec<Comment>> {
        let payload = self
            .client
            .get(&format!("{}/replies", Self::item(post_id, comment_id)))
            .await?;
        Ok(decode_list(&payload, "replies"))
    }

    pub async fn create_reply(
        &self,
        post_id: &str,
        comment_id: &str,
        form: &CommentForm,
    ) -> ApiResult<Option<Comment>> {
        let payload = self
            .client
            .request(
                Method::Post,
                &format!("{}/replies", Self::item(post_id, comment_id)),
                form.to_body(),
            )
            .await?;
        Ok(decode_entity(&payload, "reply"))
    }
}
