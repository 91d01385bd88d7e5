//! Messages sent from spawned network tasks back to the [`App`](super::App).

use crate::error::ApiError;
use crate::interaction::{OperationId, PendingAction};
use crate::models::{Comment, Notification, Post, User};
use crate::reconcile::Generation;

/// Result of a non-optimistic action, carrying whatever the handler needs
/// to update state.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// Create or edit answered; the server may or may not echo the post
    Post(Option<Post>),
    /// Create, edit or reply answered; the server may or may not echo it
    Comment(Option<Comment>),
    /// Share link, when the server returned one
    ShareLink(Option<String>),
    /// New photo URL, when the server returned one
    Photo(Option<String>),
    /// Session token (sign-in, or a password change that re-issued one)
    Token(Option<String>),
    /// Nothing to apply beyond the fact of success
    Done,
}

/// A message tagged with the session that spawned its task.
///
/// Messages from a session that has since been logged out are dropped
/// by [`App::handle_envelope`](super::App::handle_envelope).
#[derive(Debug)]
pub struct Envelope {
    pub session: u64,
    pub message: AppMessage,
}

/// Messages for async communication
#[derive(Debug)]
pub enum AppMessage {
    /// An optimistic toggle finished
    ToggleSettled {
        op: OperationId,
        result: Result<(), ApiError>,
    },
    /// Feed refresh finished
    FeedLoaded {
        generation: Generation,
        result: Result<Vec<Post>, ApiError>,
    },
    /// Older feed page loaded
    FeedPageLoaded {
        generation: Generation,
        page: u32,
        result: Result<Vec<Post>, ApiError>,
    },
    /// Comments for a post loaded
    CommentsLoaded {
        post_id: String,
        generation: Generation,
        result: Result<Vec<Comment>, ApiError>,
    },
    /// Replies for a comment loaded
    RepliesLoaded {
        comment_id: String,
        generation: Generation,
        result: Result<Vec<Comment>, ApiError>,
    },
    /// Suggestions resolved, fallback already applied
    SuggestionsLoaded {
        generation: Generation,
        users: Vec<User>,
    },
    /// Notifications loaded
    NotificationsLoaded {
        generation: Generation,
        result: Result<Vec<Notification>, ApiError>,
    },
    /// Unread notification count loaded
    UnreadCountLoaded(Result<u64, ApiError>),
    /// Saved posts fetched one by one; failures already dropped
    SavedPostsLoaded(Vec<Post>),
    /// Posts of a profile loaded
    ProfilePostsLoaded {
        user_id: String,
        generation: Generation,
        result: Result<Vec<Post>, ApiError>,
    },
    /// Users who liked a post loaded
    LikesLoaded {
        post_id: String,
        result: Result<Vec<User>, ApiError>,
    },
    /// Signed-in user loaded
    ViewerLoaded(Result<User, ApiError>),
    /// A non-optimistic action finished
    ActionSettled {
        action: PendingAction,
        /// Post the action belongs to, for comment and reply actions
        post_id: Option<String>,
        /// Local fallback content for edits the server did not echo
        content: Option<String>,
        result: Result<ActionOutcome, ApiError>,
    },
}
