//! User actions.
//!
//! Toggles (like, comment like, follow, bookmark) go through the
//! interaction controller and change what is displayed at once. Every
//! other action is non-optimistic: it is marked pending, refused while
//! pending, and only touches state when the server confirms.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{ActionOutcome, App, AppMessage};
use crate::error::ApiResult;
use crate::interaction::{
    ActionKind, Dispatch, FlagState, PendingAction, PendingActions, ToggleTarget,
};
use crate::models::{
    ChangePasswordForm, Comment, CommentForm, ImageAttachment, Post, PostForm, SignInForm,
    SignUpForm, User,
};

impl App {
    // ========================================================================
    // Optimistic toggles
    // ========================================================================

    /// Like or unlike a post.
    pub fn toggle_post_like(&mut self, post_id: &str) -> bool {
        let viewer = self.viewer_id();
        let baseline = self
            .find_post(post_id)
            .map(|p| FlagState::new(p.liked_by(viewer), p.like_count()));
        self.toggle(ToggleTarget::Post(post_id.to_string()), baseline)
    }

    /// Like or unlike a comment or reply.
    pub fn toggle_comment_like(&mut self, post_id: &str, comment_id: &str) -> bool {
        let viewer = self.viewer_id();
        let baseline = self
            .find_comment(post_id, comment_id)
            .map(|c| FlagState::new(c.liked_by(viewer), c.like_count()));
        self.toggle(
            ToggleTarget::Comment {
                post_id: post_id.to_string(),
                comment_id: comment_id.to_string(),
            },
            baseline,
        )
    }

    /// Follow or unfollow a user. Refused for the viewer's own id.
    pub fn toggle_follow(&mut self, user_id: &str) -> bool {
        if self.viewer_id() == Some(user_id) {
            debug!("Ignoring follow of self");
            return false;
        }
        let baseline = self
            .find_user(user_id)
            .map(|u| FlagState::flag(u.followed_by_viewer()));
        self.toggle(ToggleTarget::User(user_id.to_string()), baseline)
    }

    /// Save or unsave a post. The saved set is updated once the server
    /// confirms.
    pub fn toggle_bookmark(&mut self, post_id: &str) -> bool {
        let baseline = FlagState::flag(self.saved.is_saved(post_id));
        self.toggle(ToggleTarget::Bookmark(post_id.to_string()), Some(baseline))
    }

    fn toggle(&mut self, target: ToggleTarget, baseline: Option<FlagState>) -> bool {
        let key = target.key();
        let Some(baseline) = baseline.or_else(|| self.interactions.state(&key)) else {
            warn!(%key, "Toggle on an entity not in view");
            return false;
        };
        if let Some(dispatch) = self.interactions.request(target, baseline) {
            self.spawn_dispatch(dispatch);
        }
        true
    }

    /// Issue the remote mutation of a toggle.
    pub(super) fn spawn_dispatch(&mut self, dispatch: Dispatch) {
        let client = Arc::clone(&self.client);
        self.spawn_task(async move {
            let Dispatch { op, target, to, .. } = dispatch;
            let result = match &target {
                ToggleTarget::Post(id) => client.posts().toggle_like(id).await,
                ToggleTarget::Comment {
                    post_id,
                    comment_id,
                } => client.comments().toggle_like(post_id, comment_id).await,
                ToggleTarget::User(id) if to.on => client.users().follow(id).await,
                ToggleTarget::User(id) => client.users().unfollow(id).await,
                ToggleTarget::Bookmark(id) => client.posts().toggle_bookmark(id).await,
            };
            AppMessage::ToggleSettled {
                op,
                result: result.map(drop),
            }
        });
    }

    // ========================================================================
    // Posts
    // ========================================================================

    pub fn create_post(&mut self, form: PostForm) -> bool {
        if form.is_empty() {
            self.notices
                .error_text("Invalid Post", "Post content cannot be empty.");
            return false;
        }
        let client = Arc::clone(&self.client);
        self.start_action(PendingAction::global(ActionKind::CreatePost), None, None, async move {
            client.posts().create(&form).await.map(ActionOutcome::Post)
        })
    }

    pub fn edit_post(&mut self, post_id: &str, form: PostForm) -> bool {
        if form.is_empty() {
            self.notices
                .error_text("Invalid Post", "Post content cannot be empty.");
            return false;
        }
        let content = Some(form.trimmed_body().to_string());
        let client = Arc::clone(&self.client);
        let id = post_id.to_string();
        self.start_action(
            PendingAction::new(ActionKind::EditPost, post_id),
            None,
            content,
            async move { client.posts().update(&id, &form).await.map(ActionOutcome::Post) },
        )
    }

    /// Delete a post. It stays listed until the server confirms.
    pub fn delete_post(&mut self, post_id: &str) -> bool {
        let client = Arc::clone(&self.client);
        let id = post_id.to_string();
        self.start_action(
            PendingAction::new(ActionKind::DeletePost, post_id),
            None,
            None,
            async move { client.posts().delete(&id).await.map(|()| ActionOutcome::Done) },
        )
    }

    pub fn share_post(&mut self, post_id: &str) -> bool {
        let client = Arc::clone(&self.client);
        let id = post_id.to_string();
        self.start_action(
            PendingAction::new(ActionKind::SharePost, post_id),
            None,
            None,
            async move { client.posts().share(&id).await.map(ActionOutcome::ShareLink) },
        )
    }

    // ========================================================================
    // Comments and replies
    // ========================================================================

    pub fn create_comment(&mut self, post_id: &str, form: CommentForm) -> bool {
        if form.is_empty() {
            self.notices
                .error_text("Invalid Comment", "Comment cannot be empty.");
            return false;
        }
        let client = Arc::clone(&self.client);
        let id = post_id.to_string();
        self.start_action(
            PendingAction::new(ActionKind::CreateComment, post_id),
            Some(post_id.to_string()),
            None,
            async move { client.comments().create(&id, &form).await.map(ActionOutcome::Comment) },
        )
    }

    pub fn edit_comment(&mut self, post_id: &str, comment_id: &str, form: CommentForm) -> bool {
        if form.is_empty() {
            self.notices
                .error_text("Invalid Comment", "Comment cannot be empty.");
            return false;
        }
        let content = Some(form.trimmed_content().to_string());
        let client = Arc::clone(&self.client);
        let (pid, cid) = (post_id.to_string(), comment_id.to_string());
        self.start_action(
            PendingAction::new(ActionKind::EditComment, comment_id),
            Some(post_id.to_string()),
            content,
            async move {
                client
                    .comments()
                    .update(&pid, &cid, &form)
                    .await
                    .map(ActionOutcome::Comment)
            },
        )
    }

    pub fn delete_comment(&mut self, post_id: &str, comment_id: &str) -> bool {
        let client = Arc::clone(&self.client);
        let (pid, cid) = (post_id.to_string(), comment_id.to_string());
        self.start_action(
            PendingAction::new(ActionKind::DeleteComment, comment_id),
            Some(post_id.to_string()),
            None,
            async move {
                client
                    .comments()
                    .delete(&pid, &cid)
                    .await
                    .map(|()| ActionOutcome::Done)
            },
        )
    }

    /// Reply to a comment. Blank replies are ignored.
    pub fn create_reply(&mut self, post_id: &str, comment_id: &str, form: CommentForm) -> bool {
        if form.is_empty() {
            return false;
        }
        let client = Arc::clone(&self.client);
        let (pid, cid) = (post_id.to_string(), comment_id.to_string());
        self.start_action(
            PendingAction::new(ActionKind::CreateReply, comment_id),
            Some(post_id.to_string()),
            None,
            async move {
                client
                    .comments()
                    .create_reply(&pid, &cid, &form)
                    .await
                    .map(ActionOutcome::Comment)
            },
        )
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub fn mark_notification_read(&mut self, notification_id: &str) -> bool {
        if self
            .notifications
            .get(notification_id)
            .is_some_and(|n| n.is_read)
        {
            return false;
        }
        let client = Arc::clone(&self.client);
        let id = notification_id.to_string();
        self.start_action(
            PendingAction::new(ActionKind::MarkRead, notification_id),
            None,
            None,
            async move {
                client
                    .notifications()
                    .mark_read(&id)
                    .await
                    .map(|_| ActionOutcome::Done)
            },
        )
    }

    pub fn mark_all_notifications_read(&mut self) -> bool {
        let client = Arc::clone(&self.client);
        self.start_action(PendingAction::global(ActionKind::MarkAllRead), None, None, async move {
            client
                .notifications()
                .mark_all_read()
                .await
                .map(|_| ActionOutcome::Done)
        })
    }

    // ========================================================================
    // Account
    // ========================================================================

    pub fn sign_in(&mut self, form: SignInForm) -> bool {
        let client = Arc::clone(&self.client);
        self.start_action(PendingAction::global(ActionKind::SignIn), None, None, async move {
            client
                .auth()
                .sign_in(&form)
                .await
                .map(|token| ActionOutcome::Token(Some(token)))
        })
    }

    pub fn sign_up(&mut self, form: SignUpForm) -> bool {
        let client = Arc::clone(&self.client);
        self.start_action(PendingAction::global(ActionKind::SignUp), None, None, async move {
            client.auth().sign_up(&form).await.map(|_| ActionOutcome::Done)
        })
    }

    pub fn change_password(&mut self, form: ChangePasswordForm) -> bool {
        let client = Arc::clone(&self.client);
        self.start_action(
            PendingAction::global(ActionKind::ChangePassword),
            None,
            None,
            async move {
                client
                    .users()
                    .change_password(&form)
                    .await
                    .map(ActionOutcome::Token)
            },
        )
    }

    pub fn upload_photo(&mut self, photo: ImageAttachment) -> bool {
        let client = Arc::clone(&self.client);
        self.start_action(PendingAction::global(ActionKind::UploadPhoto), None, None, async move {
            client.users().upload_photo(&photo).await.map(ActionOutcome::Photo)
        })
    }

    /// Forget the session and every loaded view. Tasks still in flight
    /// belong to the old session and their results are dropped.
    pub fn log_out(&mut self) {
        self.session += 1;
        if let Err(e) = self.auth.log_out() {
            warn!(error = %e, "Could not remove stored token");
        }
        self.viewer = None;
        self.feed.clear();
        self.comments.clear();
        self.replies.clear();
        self.suggestions.clear();
        self.notifications.clear();
        self.unread_count = 0;
        self.saved_posts.clear();
        self.profile_posts.clear();
        self.profile_user_id = None;
        self.post_likes.clear();
        self.share_links.clear();
        self.feed_page = 0;
        self.interactions.reset();
        self.pending = PendingActions::new();
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Mark `action` pending and run `task`. Returns `false` without doing
    /// anything when the same action is already pending.
    fn start_action<F>(
        &mut self,
        action: PendingAction,
        post_id: Option<String>,
        content: Option<String>,
        task: F,
    ) -> bool
    where
        F: Future<Output = ApiResult<ActionOutcome>> + Send + 'static,
    {
        if !self.pending.begin(action.clone()) {
            return false;
        }
        debug!(%action, "Starting action");
        self.spawn_task(async move {
            let result = task.await;
            AppMessage::ActionSettled {
                action,
                post_id,
                content,
                result,
            }
        });
        true
    }

    /// A post in any loaded list.
    pub fn find_post(&self, post_id: &str) -> Option<&Post> {
        self.feed
            .get(post_id)
            .or_else(|| self.profile_posts.get(post_id))
            .or_else(|| self.saved_posts.get(post_id))
    }

    /// A comment of `post_id`, or a reply anywhere.
    pub fn find_comment(&self, post_id: &str, comment_id: &str) -> Option<&Comment> {
        self.comments
            .get(post_id)
            .and_then(|list| list.get(comment_id))
            .or_else(|| self.replies.values().find_map(|list| list.get(comment_id)))
    }

    /// A user in suggestions, likers or post authors.
    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        let authors = self
            .feed
            .items()
            .iter()
            .chain(self.profile_posts.items())
            .chain(self.saved_posts.items())
            .filter_map(|p| p.user.as_ref());
        self.suggestions
            .items()
            .iter()
            .chain(self.post_likes.values().flatten())
            .chain(authors)
            .find(|u| u.id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::adapters::MockResponse;
    use crate::app::test_support::{app, url};
    use crate::context::{NoticeKind, TOKEN_KEY};
    use crate::interaction::{InteractionKey, ToggleKind};
    use crate::traits::Method;

    #[tokio::test]
    async fn test_empty_post_is_rejected_locally() {
        let (mut app, http, _) = app();
        assert!(!app.create_post(PostForm::new("   ")));
        let notice = app.notices.latest().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.title, "Invalid Post");
        assert!(http.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_create_post_inserts_echo_at_top() {
        let (mut app, http, _) = app();
        app.feed.replace(vec![Post::new("p1", "old")]);
        http.set_response(
            Method::Post,
            &url("/posts"),
            MockResponse::json(200, json!({"data": {"post": {"_id": "p2", "body": "fresh"}}})),
        );

        assert!(app.create_post(PostForm::new("fresh")));
        assert!(!app.create_post(PostForm::new("twice")));
        app.run_until_idle().await;

        assert_eq!(app.feed.ids(), vec!["p2", "p1"]);
        assert_eq!(app.notices.latest().unwrap().title, "Post Created");
    }

    #[tokio::test]
    async fn test_comment_like_found_in_replies() {
        let (mut app, http, _) = app();
        let mut list = crate::reconcile::EntityList::new(crate::reconcile::SourceOrder::NewestFirst);
        list.replace(vec![Comment::new("r1", "reply")]);
        app.replies.insert("c1".to_string(), list);
        http.set_response(
            Method::Put,
            &url("/posts/p1/comments/r1/like"),
            MockResponse::ok(),
        );

        assert!(app.toggle_comment_like("p1", "r1"));
        app.run_until_idle().await;

        let reply = app.replies["c1"].get("r1").unwrap();
        assert_eq!(reply.is_liked, Some(true));
        assert_eq!(reply.likes_count, Some(1));
    }

    #[tokio::test]
    async fn test_sign_in_stores_token_and_loads_viewer() {
        let (mut app, http, store) = app();
        app.log_out();
        assert!(!app.is_authenticated());
        http.set_response(
            Method::Post,
            &url("/users/signin"),
            MockResponse::json(200, json!({"message": "success", "token": "t2"})),
        );
        http.set_response(
            Method::Get,
            &url("/users/profile-data"),
            MockResponse::json(200, json!({"user": {"_id": "me", "name": "Me"}})),
        );

        assert!(app.sign_in(SignInForm {
            email: "me@example.com".to_string(),
            password: "pw".to_string(),
        }));
        app.run_until_idle().await;

        assert_eq!(store.raw(TOKEN_KEY).as_deref(), Some("t2"));
        assert_eq!(app.viewer_id(), Some("me"));
        assert_eq!(app.notices.latest().unwrap().title, "Welcome Back!");
    }

    #[tokio::test]
    async fn test_log_out_forgets_everything() {
        let (mut app, _, store) = app();
        app.feed.replace(vec![Post::new("p1", "x")]);
        app.interactions.seed(
            ToggleTarget::Post("p1".to_string()),
            FlagState::new(false, 0),
        );
        app.unread_count = 3;

        app.log_out();

        assert!(app.viewer.is_none());
        assert!(app.feed.is_empty());
        assert_eq!(app.unread_count, 0);
        assert_eq!(store.raw(TOKEN_KEY), None);
        let key = InteractionKey::new("p1", ToggleKind::PostLike);
        assert_eq!(app.interactions.state(&key), None);
    }

    #[tokio::test]
    async fn test_settlement_from_before_log_out_leaves_new_toggle_alone() {
        let (mut app, http, _) = app();
        app.feed.replace(vec![Post::new("p1", "x")]);
        http.set_response(
            Method::Put,
            &url("/posts/p1/like"),
            MockResponse::json(500, json!({"message": "nope"})),
        );
        assert!(app.toggle_post_like("p1"));
        let old = app.next_message().await.unwrap();

        app.log_out();
        app.feed.replace(vec![Post::new("p5", "y")]);
        http.set_response(Method::Put, &url("/posts/p5/like"), MockResponse::ok());
        assert!(app.toggle_post_like("p5"));

        app.handle_message(old.message);

        let key = InteractionKey::new("p5", ToggleKind::PostLike);
        assert_eq!(app.interactions.state(&key), Some(FlagState::new(true, 1)));
        assert!(app.interactions.is_in_flight(&key));
        assert!(app.notices.is_empty());
    }

    #[tokio::test]
    async fn test_loads_in_flight_at_log_out_are_dropped() {
        let (mut app, http, _) = app();
        http.set_response(
            Method::Get,
            &url("/posts/feed?only=all&page=1&limit=50"),
            MockResponse::json(200, json!({"posts": [{"_id": "private1"}]})),
        );
        http.set_response(
            Method::Get,
            &url("/users/profile-data"),
            MockResponse::json(200, json!({"user": {"_id": "me"}})),
        );
        http.set_response(
            Method::Delete,
            &url("/posts/p1"),
            MockResponse::ok(),
        );
        app.feed.replace(vec![Post::new("p1", "x")]);
        app.refresh_feed();
        app.load_viewer();
        assert!(app.delete_post("p1"));
        let before = app.session();

        app.log_out();
        app.run_until_idle().await;

        assert_eq!(app.session(), before + 1);
        assert!(app.feed.is_empty());
        assert!(app.viewer.is_none());
        assert!(!app.is_deleting("p1"));
        assert_eq!(app.outstanding(), 0);
        assert!(app.notices.is_empty());
    }
}
