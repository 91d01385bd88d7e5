use serde_json::Value;

use super::{query, seg, ApiClient};
use crate::error::ApiResult;
use crate::models::Notification;
use crate::reconcile::{decode_list, extract_count};
use crate::traits::{Method, RequestBody};

/// `/notifications` endpoints.
pub struct NotificationsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> NotificationsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: u32, limit: u32) -> ApiResult<Vec<Notification>> {
        let path = format!(
            "/notifications{}",
            query(&[("page", page.to_string()), ("limit", limit.to_string())])
        );
        let payload = self.client.get(&path).await?;
        Ok(decode_list(&payload, "notifications"))
    }

    /// Unread count; 0 when the server sends none.
    pub async fn unread_count(&self) -> ApiResult<u64> {
        let payload = self.client.get("/notifications/unread-count").await?;
        Ok(["unreadCount", "count"]
            .iter()
            .find_map(|field| extract_count(&payload, field))
            .unwrap_or(0))
    }

    pub async fn mark_read(&self, notification_id: &str) -> ApiResult<Value> {
        self.client
            .request(
                Method::Patch,
                &format!("/notifications/{}/read", seg(notification_id)),
                RequestBody::Empty,
            )
            .await
    }

    pub async fn mark_all_read(&self) -> ApiResult<Value> {
        self.client
            .request(Method::Patch, "/notifications/read-all", RequestBody::Empty)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::adapters::MockResponse;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_and_unread_count() {
        let (client, http) = client_with_token(Some("t"));
        http.set_response(
            Method::Get,
            &url("/notifications?page=1&limit=50"),
            MockResponse::json(200, json!({"data": {"notifications": [
                {"_id": "n1", "type": "like", "actor": {"_id": "u1"}},
                {"_id": "n2", "type": "follow", "isRead": true}
            ]}})),
        );
        http.set_response(
            Method::Get,
            &url("/notifications/unread-count"),
            MockResponse::json(200, json!({"data": {"unreadCount": 1}})),
        );
        let list = client.notifications().list(1, 50).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].actor.as_ref().unwrap().id, "u1");
        assert_eq!(client.notifications().unread_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_uses_patch() {
        let (client, http) = client_with_token(Some("t"));
        http.set_default_response(MockResponse::ok());
        client.notifications().mark_read("n1").await.unwrap();
        client.notifications().mark_all_read().await.unwrap();
        assert_eq!(http.count_requests(Method::Patch, &url("/notifications/n1/read")), 1);
        assert_eq!(http.count_requests(Method::Patch, &url("/notifications/read-all")), 1);
    }
}
