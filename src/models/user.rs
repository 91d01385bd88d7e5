use serde::{Deserialize, Serialize};

use super::{deserialize_id, Identified};

/// A user profile as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub is_following: Option<bool>,
    /// Older payloads use this spelling
    #[serde(default)]
    pub is_followed: Option<bool>,
    #[serde(default)]
    pub followers_count: Option<u32>,
    #[serde(default)]
    pub following_count: Option<u32>,
}

impl User {
    /// Minimal user with only an id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            username: None,
            email: None,
            photo: None,
            is_following: None,
            is_followed: None,
            followers_count: None,
            following_count: None,
        }
    }

    /// Whether the viewer follows this user, per the server.
    pub fn followed_by_viewer(&self) -> bool {
        self.is_following.or(self.is_followed).unwrap_or(false)
    }

    /// Photo URL, ignoring the backend's placeholder values.
    pub fn photo_url(&self) -> Option<&str> {
        self.photo
            .as_deref()
            .filter(|p| !p.is_empty() && !p.contains("undefined"))
    }

    /// Case-insensitive match on name or username.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [self.name.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

impl Identified for User {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialize_minimal() {
        let user: User = serde_json::from_str(r#"{"id":"u1"}"#).unwrap();
        assert_eq!(user, User::with_id("u1"));
        assert!(!user.followed_by_viewer());
    }

    #[test]
    fn test_followed_by_viewer_either_spelling() {
        let a: User = serde_json::from_str(r#"{"id":"u1","isFollowing":true}"#).unwrap();
        let b: User = serde_json::from_str(r#"{"id":"u2","isFollowed":true}"#).unwrap();
        assert!(a.followed_by_viewer());
        assert!(b.followed_by_viewer());
    }

    #[test]
    fn test_photo_url_filters_placeholder() {
        let mut user = User::with_id("u1");
        user.photo = Some("https://cdn/undefined".to_string());
        assert_eq!(user.photo_url(), None);
        user.photo = Some("https://cdn/me.png".to_string());
        assert_eq!(user.photo_url(), Some("https://cdn/me.png"));
    }

    #[test]
    fn test_matches() {
        let mut user = User::with_id("u1");
        user.name = Some("Mona Adel".to_string());
        user.username = Some("mona_a".to_string());
        assert!(user.matches("adel"));
        assert!(user.matches("MONA_"));
        assert!(user.matches("  "));
        assert!(!user.matches("omar"));
    }
}
