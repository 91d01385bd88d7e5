use std::fmt;

/// The four toggle interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleKind {
    PostLike,
    CommentLike,
    Follow,
    Bookmark,
}

impl ToggleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleKind::PostLike => "post_like",
            ToggleKind::CommentLike => "comment_like",
            ToggleKind::Follow => "follow",
            ToggleKind::Bookmark => "bookmark",
        }
    }

    /// Whether the toggle moves a visible counter.
    pub fn counted(&self) -> bool {
        matches!(self, ToggleKind::PostLike | ToggleKind::CommentLike)
    }

    /// Title of the notice raised when the toggle is rolled back.
    pub fn failure_title(&self) -> &'static str {
        match self {
            ToggleKind::PostLike | ToggleKind::CommentLike => "Like Failed",
            ToggleKind::Follow => "Follow Failed",
            ToggleKind::Bookmark => "Bookmark Failed",
        }
    }

    /// Notice text used when the server gave no message.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ToggleKind::PostLike => "Failed to update like status.",
            ToggleKind::CommentLike => "Failed to like comment.",
            ToggleKind::Follow => "Failed to update follow status.",
            ToggleKind::Bookmark => "Failed to update saved state.",
        }
    }
}

impl fmt::Display for ToggleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a toggle acts on, with everything needed to issue the remote call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToggleTarget {
    Post(String),
    Comment { post_id: String, comment_id: String },
    User(String),
    Bookmark(String),
}

impl ToggleTarget {
    pub fn kind(&self) -> ToggleKind {
        match self {
            ToggleTarget::Post(_) => ToggleKind::PostLike,
            ToggleTarget::Comment { .. } => ToggleKind::CommentLike,
            ToggleTarget::User(_) => ToggleKind::Follow,
            ToggleTarget::Bookmark(_) => ToggleKind::Bookmark,
        }
    }

    /// Id of the entity whose state is toggled.
    pub fn entity_id(&self) -> &str {
        match self {
            ToggleTarget::Post(id) | ToggleTarget::User(id) | ToggleTarget::Bookmark(id) => id,
            ToggleTarget::Comment { comment_id, .. } => comment_id,
        }
    }

    /// Post the target belongs to, if any.
    pub fn post_id(&self) -> Option<&str> {
        match self {
            ToggleTarget::Post(id) | ToggleTarget::Bookmark(id) => Some(id),
            ToggleTarget::Comment { post_id, .. } => Some(post_id),
            ToggleTarget::User(_) => None,
        }
    }

    pub fn key(&self) -> InteractionKey {
        InteractionKey {
            entity_id: self.entity_id().to_string(),
            kind: self.kind(),
        }
    }
}

/// Serialization key: one in-flight operation per entity and kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InteractionKey {
    pub entity_id: String,
    pub kind: ToggleKind,
}

impl InteractionKey {
    pub fn new(entity_id: impl Into<String>, kind: ToggleKind) -> Self {
        Self {
            entity_id: entity_id.into(),
            kind,
        }
    }
}

impl fmt::Display for InteractionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.entity_id)
    }
}

/// Flag plus counter (`liked`/`likesCount`, `followed`, `saved`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagState {
    pub on: bool,
    pub count: u32,
}

impl FlagState {
    pub fn new(on: bool, count: u32) -> Self {
        Self { on, count }
    }

    /// Flag without a counter.
    pub fn flag(on: bool) -> Self {
        Self { on, count: 0 }
    }

    /// The state after one toggle. Counted kinds move the counter by one,
    /// never below zero.
    pub fn toggled(self, counted: bool) -> Self {
        let on = !self.on;
        let count = match (counted, on) {
            (false, _) => self.count,
            (true, true) => self.count.saturating_add(1),
            (true, false) => self.count.saturating_sub(1),
        };
        Self { on, count }
    }
}
