use serde::{Deserialize, Serialize};

use super::{deserialize_id, likes_contain, parse_timestamp, Comment, Identified, User};

/// Entry of a `likes` array: the backend sends either bare user ids or
/// user objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LikeRef {
    Id(String),
    User(User),
    Other(serde_json::Value),
}

impl LikeRef {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            LikeRef::Id(id) => Some(id),
            LikeRef::User(user) => Some(&user.id),
            LikeRef::Other(_) => None,
        }
    }
}

/// A post in the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Author
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub likes: Vec<LikeRef>,
    #[serde(default)]
    pub likes_count: Option<u32>,
    #[serde(default)]
    pub is_liked: Option<bool>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub comments_count: Option<u32>,
}

impl Post {
    /// Post with only an id and body.
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: Some(body.into()),
            image: None,
            user: None,
            created_at: None,
            likes: Vec::new(),
            likes_count: None,
            is_liked: None,
            comments: Vec::new(),
            comments_count: None,
        }
    }

    /// Whether the viewer has liked this post.
    ///
    /// An explicit `isLiked` wins; otherwise the viewer's id is looked up
    /// in `likes`.
    pub fn liked_by(&self, viewer_id: Option<&str>) -> bool {
        self.is_liked
            .unwrap_or_else(|| viewer_id.is_some_and(|id| likes_contain(&self.likes, id)))
    }

    /// Like count: explicit `likesCount`, else the length of `likes`.
    pub fn like_count(&self) -> u32 {
        self.likes_count
            .unwrap_or_else(|| u32::try_from(self.likes.len()).unwrap_or(u32::MAX))
    }

    pub fn comment_count(&self) -> u32 {
        self.comments_count
            .unwrap_or_else(|| u32::try_from(self.comments.len()).unwrap_or(u32::MAX))
    }

    pub fn author_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn created_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        parse_timestamp(self.created_at.as_deref())
    }
}

impl Identified for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_deserialize_full() {
        let json = r#"{
            "id": "p1",
            "body": "hello",
            "user": {"id": "u1", "name": "Ali"},
            "createdAt": "2025-01-02T03:04:05.000Z",
            "likes": ["u2", {"id": "u3"}],
            "comments": [{"id": "c1", "content": "nice"}]
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, "p1");
        assert_eq!(post.author_id(), Some("u1"));
        assert_eq!(post.like_count(), 2);
        assert_eq!(post.comment_count(), 1);
        assert!(post.created_at_utc().is_some());
    }

    #[test]
    fn test_liked_by_from_likes_array() {
        let json = r#"{"id":"p1","likes":["u2",{"id":"u3","name":"x"}]}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert!(post.liked_by(Some("u2")));
        assert!(post.liked_by(Some("u3")));
        assert!(!post.liked_by(Some("u4")));
        assert!(!post.liked_by(None));
    }

    #[test]
    fn test_explicit_fields_win() {
        let json = r#"{"id":"p1","likes":["u2"],"likesCount":7,"isLiked":false}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert!(!post.liked_by(Some("u2")));
        assert_eq!(post.like_count(), 7);
    }

    #[test]
    fn test_unrecognized_like_entries_are_tolerated() {
        let json = r#"{"id":"p1","likes":[{"weird":true}, 5]}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.like_count(), 2);
        assert!(post.likes.iter().all(|l| l.user_id().is_none()));
    }
}
