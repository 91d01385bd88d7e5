//! Explicit context objects shared by the API client and the app.

mod auth;
mod notices;

pub use auth::{AuthContext, TOKEN_KEY};
pub use notices::{Notice, NoticeKind, Notices};
