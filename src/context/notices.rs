//! User-visible alerts raised by actions.

use std::collections::VecDeque;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Queue of notices waiting to be shown by the front end.
#[derive(Debug, Default)]
pub struct Notices {
    queue: VecDeque<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => tracing::warn!(title = %notice.title, "{}", notice.message),
            _ => tracing::debug!(title = %notice.title, "{}", notice.message),
        }
        self.queue.push_back(notice);
    }

    pub fn info(&mut self, title: &str, message: &str) {
        self.push(Notice::new(NoticeKind::Info, title, message));
    }

    pub fn success(&mut self, title: &str, message: &str) {
        self.push(Notice::new(NoticeKind::Success, title, message));
    }

    /// Error notice carrying the server's message, or `fallback` when the
    /// server sent none.
    pub fn error(&mut self, title: &str, error: &ApiError, fallback: &str) {
        self.push(Notice::new(
            NoticeKind::Error,
            title,
            error.user_message(fallback),
        ));
    }

    /// Error notice with a fixed message.
    pub fn error_text(&mut self, title: &str, message: &str) {
        self.push(Notice::new(NoticeKind::Error, title, message));
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.queue.iter()
    }

    /// Take every pending notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.queue.drain(..).collect()
    }
}
