mod comment;
mod form;
mod notification;
mod post;
mod user;

pub use comment::Comment;
pub use form::{
    ChangePasswordForm, CommentForm, ImageAttachment, PostForm, SignInForm, SignUpForm,
};
pub use notification::{Notification, PostRef};
pub use post::{LikeRef, Post};
pub use user::User;

use serde::Deserializer;

/// Entities that carry a canonical string id.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Helper to deserialize id as either string or integer
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer id")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            if value.is_empty() {
                return Err(E::custom("empty id"));
            }
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Whether a likes array contains the viewer, as a bare id or a user object.
pub(crate) fn likes_contain(likes: &[LikeRef], viewer_id: &str) -> bool {
    likes.iter().any(|like| like.user_id() == Some(viewer_id))
}

/// Parse an ISO-8601 timestamp as sent by the backend.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<chrono::DateTime<chrono::Utc>> {
    raw.and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&chrono::Utc))
}
