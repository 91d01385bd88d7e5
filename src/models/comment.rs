use serde::{Deserialize, Serialize};

use super::{deserialize_id, likes_contain, parse_timestamp, Identified, LikeRef, User};

/// A comment on a post. Replies use the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub comment_creator: Option<User>,
    #[serde(default)]
    pub likes: Vec<LikeRef>,
    #[serde(default)]
    pub likes_count: Option<u32>,
    #[serde(default)]
    pub is_liked: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Comment {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: Some(content.into()),
            image: None,
            comment_creator: None,
            likes: Vec::new(),
            likes_count: None,
            is_liked: None,
            created_at: None,
        }
    }

    pub fn liked_by(&self, viewer_id: Option<&str>) -> bool {
        self.is_liked
            .unwrap_or_else(|| viewer_id.is_some_and(|id| likes_contain(&self.likes, id)))
    }

    pub fn like_count(&self) -> u32 {
        self.likes_count
            .unwrap_or_else(|| u32::try_from(self.likes.len()).unwrap_or(u32::MAX))
    }

    pub fn creator_id(&self) -> Option<&str> {
        self.comment_creator.as_ref().map(|u| u.id.as_str())
    }

    pub fn created_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        parse_timestamp(self.created_at.as_deref())
    }
}

impl Identified for Comment {
    fn id(&self) -> &str {
        &self.id
    }
}
