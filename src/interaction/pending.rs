use std::collections::HashSet;
use std::fmt;

/// Non-optimistic actions: the list changes only once the server agrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CreatePost,
    EditPost,
    DeletePost,
    CreateComment,
    EditComment,
    DeleteComment,
    CreateReply,
    MarkRead,
    MarkAllRead,
    SharePost,
    UploadPhoto,
    ChangePassword,
    SignIn,
    SignUp,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CreatePost => "create_post",
            ActionKind::EditPost => "edit_post",
            ActionKind::DeletePost => "delete_post",
            ActionKind::CreateComment => "create_comment",
            ActionKind::EditComment => "edit_comment",
            ActionKind::DeleteComment => "delete_comment",
            ActionKind::CreateReply => "create_reply",
            ActionKind::MarkRead => "mark_read",
            ActionKind::MarkAllRead => "mark_all_read",
            ActionKind::SharePost => "share_post",
            ActionKind::UploadPhoto => "upload_photo",
            ActionKind::ChangePassword => "change_password",
            ActionKind::SignIn => "sign_in",
            ActionKind::SignUp => "sign_up",
        }
    }

    /// Title of the notice raised when the action fails.
    pub fn failure_title(&self) -> &'static str {
        match self {
            ActionKind::CreatePost => "Post Failed",
            ActionKind::EditPost | ActionKind::EditComment | ActionKind::ChangePassword => {
                "Update Failed"
            }
            ActionKind::DeletePost | ActionKind::DeleteComment => "Delete Failed",
            ActionKind::CreateComment => "Comment Failed",
            ActionKind::CreateReply => "Reply Failed",
            ActionKind::MarkRead | ActionKind::MarkAllRead => "Action Failed",
            ActionKind::SharePost => "Share Failed",
            ActionKind::UploadPhoto => "Upload Failed",
            ActionKind::SignIn => "Sign In Failed",
            ActionKind::SignUp => "Signup Failed",
        }
    }

    /// Notice text used when the server gave no message.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ActionKind::CreatePost => "Failed to create post.",
            ActionKind::EditPost => "You can only edit your own posts.",
            ActionKind::DeletePost => "You can only delete your own posts.",
            ActionKind::CreateComment => "Failed to add comment.",
            ActionKind::EditComment => "You can only edit your own comments.",
            ActionKind::DeleteComment => "You can only delete your own comments.",
            ActionKind::CreateReply => "Failed to add reply.",
            ActionKind::MarkRead => "Failed to mark notification as read.",
            ActionKind::MarkAllRead => "Failed to mark all as read.",
            ActionKind::SharePost => "Failed to share this post.",
            ActionKind::UploadPhoto => "Failed to upload photo.",
            ActionKind::ChangePassword => "Failed to change password.",
            ActionKind::SignIn => "Incorrect email or password.",
            ActionKind::SignUp => "Failed to create account.",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pending action on one entity. Actions without a natural entity
/// (create post, mark all read, sign in) use an empty id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingAction {
    pub kind: ActionKind,
    pub entity_id: String,
}

impl PendingAction {
    pub fn new(kind: ActionKind, entity_id: impl Into<String>) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
        }
    }

    pub fn global(kind: ActionKind) -> Self {
        Self::new(kind, "")
    }
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entity_id.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}:{}", self.kind, self.entity_id)
        }
    }
}

/// Set of actions awaiting the server. A control whose action is pending
/// is disabled: [`begin`](Self::begin) refuses the duplicate.
#[derive(Debug, Default)]
pub struct PendingActions {
    pending: HashSet<PendingAction>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `action` pending. Returns `false` if it already was.
    pub fn begin(&mut self, action: PendingAction) -> bool {
        let inserted = self.pending.insert(action.clone());
        if !inserted {
            tracing::debug!(%action, "Action already pending, ignoring repeat");
        }
        inserted
    }

    /// Clear `action`. Returns whether it was pending.
    pub fn finish(&mut self, action: &PendingAction) -> bool {
        self.pending.remove(action)
    }

    pub fn is_pending(&self, kind: ActionKind, entity_id: &str) -> bool {
        self.pending.contains(&PendingAction::new(kind, entity_id))
    }

    /// Whether any action on `entity_id` is pending.
    pub fn is_busy(&self, entity_id: &str) -> bool {
        self.pending.iter().any(|a| a.entity_id == entity_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
