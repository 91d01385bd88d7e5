use serde::{Deserialize, Serialize};

use super::{deserialize_id, parse_timestamp, Identified, Post, User};

/// The post a notification refers to, sent as an id or an embedded post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostRef {
    Id(String),
    Post(Box<Post>),
    Other(serde_json::Value),
}

/// An activity notification (like, comment, share, follow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Notification type as sent by the backend ("like", "comment", ...)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub actor: Option<User>,
    #[serde(default)]
    pub post: Option<PostRef>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Notification {
    pub fn post_id(&self) -> Option<&str> {
        match self.post.as_ref()? {
            PostRef::Id(id) => Some(id),
            PostRef::Post(post) => Some(&post.id),
            PostRef::Other(_) => None,
        }
    }

    pub fn created_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        parse_timestamp(self.created_at.as_deref())
    }
}

impl Identified for Notification {
    fn id(&self) -> &str {
        &self.id
    }
}
