//! Applying [`AppMessage`]s to app state.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::{ActionOutcome, App, AppMessage, Envelope};
use crate::error::ApiError;
use crate::interaction::{
    ActionKind, FlagState, PendingAction, Settlement, ToggleKind, ToggleTarget,
};
use crate::models::{Comment, Post, User};

/// Controller baselines carried by a batch of posts: each post's like
/// state, and the follow state of authors whose payload says so.
fn post_seeds(posts: &[Post], viewer: Option<&str>) -> Vec<(ToggleTarget, FlagState)> {
    let mut seeds = Vec::new();
    for post in posts {
        seeds.push((
            ToggleTarget::Post(post.id.clone()),
            FlagState::new(post.liked_by(viewer), post.like_count()),
        ));
        if let Some(author) = &post.user {
            seeds.extend(follow_seed(author));
        }
    }
    seeds
}

fn comment_seeds(
    post_id: &str,
    comments: &[Comment],
    viewer: Option<&str>,
) -> Vec<(ToggleTarget, FlagState)> {
    comments
        .iter()
        .map(|c| {
            (
                ToggleTarget::Comment {
                    post_id: post_id.to_string(),
                    comment_id: c.id.clone(),
                },
                FlagState::new(c.liked_by(viewer), c.like_count()),
            )
        })
        .collect()
}

/// Only users whose payload carries a follow flag seed a follow state.
fn follow_seed(user: &User) -> Option<(ToggleTarget, FlagState)> {
    if user.is_following.is_none() && user.is_followed.is_none() {
        return None;
    }
    Some((
        ToggleTarget::User(user.id.clone()),
        FlagState::flag(user.followed_by_viewer()),
    ))
}

impl App {
    /// Take delivery of a spawned task's message. Messages from a session
    /// that has since been logged out are dropped.
    pub fn handle_envelope(&mut self, envelope: Envelope) {
        self.outstanding = self.outstanding.saturating_sub(1);
        if envelope.session != self.session {
            debug!(
                session = envelope.session,
                current = self.session,
                "Dropping message from an ended session"
            );
            return;
        }
        self.handle_message(envelope.message);
    }

    /// Apply one message of the current session.
    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::ToggleSettled { op, result } => {
                let settlement = self.interactions.settle(op, result);
                self.apply_settlement(settlement);
            }
            AppMessage::FeedLoaded { generation, result } => match result {
                Ok(posts) => {
                    let seeds = post_seeds(&posts, self.viewer_id());
                    if self.feed.apply_refresh(generation, posts) {
                        self.feed_page = 1;
                        self.seed(seeds);
                        self.prune_interactions();
                    }
                }
                Err(e) if self.feed.is_current(generation) => {
                    self.notices
                        .error("Feed Error", &e, "Failed to load posts.");
                }
                Err(e) => debug!(error = %e, "Stale feed refresh failed"),
            },
            AppMessage::FeedPageLoaded {
                generation,
                page,
                result,
            } => {
                if !self.feed.is_current(generation) || page <= self.feed_page {
                    debug!(page, "Dropping outdated feed page");
                    return;
                }
                match result {
                    Ok(posts) => {
                        let seeds = post_seeds(&posts, self.viewer_id());
                        self.feed.append_page(posts);
                        self.feed_page = page;
                        self.seed(seeds);
                    }
                    Err(e) => {
                        self.notices
                            .error("Feed Error", &e, "Failed to load posts.");
                    }
                }
            }
            AppMessage::CommentsLoaded {
                post_id,
                generation,
                result,
            } => {
                let Some(list) = self.comments.get(&post_id) else {
                    debug!(%post_id, "Comments arrived for a closed thread");
                    return;
                };
                if !list.is_current(generation) {
                    debug!(%post_id, "Dropping superseded comments");
                    return;
                }
                match result {
                    Ok(comments) => {
                        let seeds = comment_seeds(&post_id, &comments, self.viewer_id());
                        if let Some(list) = self.comments.get_mut(&post_id) {
                            list.apply_refresh(generation, comments);
                        }
                        self.seed(seeds);
                    }
                    Err(e) => {
                        self.notices
                            .error("Comments Error", &e, "Failed to load comments.");
                    }
                }
            }
            AppMessage::RepliesLoaded {
                comment_id,
                generation,
                result,
            } => {
                let Some(list) = self.replies.get(&comment_id) else {
                    debug!(%comment_id, "Replies arrived for a closed thread");
                    return;
                };
                if !list.is_current(generation) {
                    debug!(%comment_id, "Dropping superseded replies");
                    return;
                }
                let replies = result.unwrap_or_else(|e| {
                    debug!(%comment_id, error = %e, "Replies unavailable");
                    Vec::new()
                });
                let seeds = match self.post_of_comment(&comment_id) {
                    Some(post_id) => comment_seeds(&post_id, &replies, self.viewer_id()),
                    None => Vec::new(),
                };
                if let Some(list) = self.replies.get_mut(&comment_id) {
                    list.apply_refresh(generation, replies);
                }
                self.seed(seeds);
            }
            AppMessage::SuggestionsLoaded { generation, users } => {
                let seeds: Vec<_> = users.iter().filter_map(follow_seed).collect();
                let viewer = self.viewer_id().map(str::to_string);
                let users = users
                    .into_iter()
                    .filter(|u| Some(&u.id) != viewer.as_ref())
                    .collect();
                if self.suggestions.apply_refresh(generation, users) {
                    self.seed(seeds);
                }
            }
            AppMessage::NotificationsLoaded { generation, result } => match result {
                Ok(notifications) => {
                    self.notifications.apply_refresh(generation, notifications);
                }
                Err(e) if self.notifications.is_current(generation) => {
                    self.notices.error(
                        "Notifications Error",
                        &e,
                        "Failed to fetch notifications.",
                    );
                }
                Err(e) => debug!(error = %e, "Stale notifications reload failed"),
            },
            AppMessage::UnreadCountLoaded(result) => match result {
                Ok(count) => self.unread_count = count,
                Err(e) => warn!(error = %e, "Could not load unread count"),
            },
            AppMessage::SavedPostsLoaded(posts) => {
                let seeds = post_seeds(&posts, self.viewer_id());
                self.saved_posts.replace(posts);
                self.seed(seeds);
            }
            AppMessage::ProfilePostsLoaded {
                user_id,
                generation,
                result,
            } => {
                if self.profile_user_id.as_deref() != Some(user_id.as_str()) {
                    debug!(%user_id, "Posts arrived for a profile no longer shown");
                    return;
                }
                match result {
                    Ok(posts) => {
                        let seeds = post_seeds(&posts, self.viewer_id());
                        if self.profile_posts.apply_refresh(generation, posts) {
                            self.seed(seeds);
                            self.prune_interactions();
                        }
                    }
                    Err(e) if self.profile_posts.is_current(generation) => {
                        self.notices
                            .error("Profile Error", &e, "Failed to load posts.");
                    }
                    Err(e) => debug!(error = %e, "Stale profile refresh failed"),
                }
            }
            AppMessage::LikesLoaded { post_id, result } => match result {
                Ok(users) => {
                    let seeds: Vec<_> = users.iter().filter_map(follow_seed).collect();
                    self.post_likes.insert(post_id, users);
                    self.seed(seeds);
                }
                Err(e) => {
                    self.notices
                        .error("Likes Error", &e, "Failed to load likes list.");
                }
            },
            AppMessage::ViewerLoaded(result) => match result {
                Ok(user) => self.viewer = Some(user),
                Err(e) => {
                    warn!(error = %e, "Could not load signed-in user");
                    self.viewer = None;
                }
            },
            AppMessage::ActionSettled {
                action,
                post_id,
                content,
                result,
            } => {
                self.pending.finish(&action);
                match result {
                    Ok(outcome) => self.apply_action(action, post_id, content, outcome),
                    Err(e) => self.action_failed(&action, &e),
                }
            }
        }
    }

    /// Drop idle interaction keys for entities no longer in any view.
    fn prune_interactions(&mut self) {
        let mut visible: HashSet<&str> = HashSet::new();
        let posts = self
            .feed
            .items()
            .iter()
            .chain(self.profile_posts.items())
            .chain(self.saved_posts.items());
        for post in posts {
            visible.insert(&post.id);
            if let Some(author) = &post.user {
                visible.insert(&author.id);
            }
        }
        for list in self.comments.values().chain(self.replies.values()) {
            visible.extend(list.items().iter().map(|c| c.id.as_str()));
        }
        let users = self
            .suggestions
            .items()
            .iter()
            .chain(self.post_likes.values().flatten());
        visible.extend(users.map(|u| u.id.as_str()));
        visible.extend(self.profile_user_id.as_deref());

        let saved = self.saved.ids();
        self.interactions.retain_idle(|target| match target {
            ToggleTarget::Bookmark(id) => saved.contains(id) || visible.contains(id.as_str()),
            other => visible.contains(other.entity_id()),
        });
    }

    fn seed(&mut self, seeds: Vec<(ToggleTarget, FlagState)>) {
        for (target, baseline) in seeds {
            self.interactions.seed(target, baseline);
        }
    }

    fn post_of_comment(&self, comment_id: &str) -> Option<String> {
        self.comments
            .iter()
            .find(|(_, list)| list.contains(comment_id))
            .map(|(post_id, _)| post_id.clone())
    }

    // ========================================================================
    // Toggles
    // ========================================================================

    fn apply_settlement(&mut self, settlement: Settlement) {
        match settlement {
            Settlement::Confirmed {
                target,
                state,
                next,
                ..
            } => {
                let settled = next.is_none();
                if let Some(dispatch) = next {
                    self.spawn_dispatch(dispatch);
                }
                self.write_back(&target, state, settled);
            }
            Settlement::RolledBack {
                key,
                restored,
                error,
                ..
            } => {
                debug!(%key, on = restored.on, "Display restored");
                self.notices.error(
                    key.kind.failure_title(),
                    &error,
                    key.kind.failure_message(),
                );
            }
            Settlement::Stale => debug!("Stale toggle settlement ignored"),
        }
    }

    /// Copy a confirmed toggle state into the loaded entities. `settled`
    /// is false while more toggles for the key are still queued.
    fn write_back(&mut self, target: &ToggleTarget, state: FlagState, settled: bool) {
        match target {
            ToggleTarget::Post(id) => {
                let apply = |post: &mut Post| {
                    post.is_liked = Some(state.on);
                    post.likes_count = Some(state.count);
                };
                self.feed.update(id, apply);
                self.profile_posts.update(id, apply);
                self.saved_posts.update(id, apply);
            }
            ToggleTarget::Comment { comment_id, .. } => {
                let apply = |comment: &mut Comment| {
                    comment.is_liked = Some(state.on);
                    comment.likes_count = Some(state.count);
                };
                for list in self.comments.values_mut().chain(self.replies.values_mut()) {
                    list.update(comment_id, apply);
                }
            }
            ToggleTarget::User(id) => {
                self.suggestions
                    .update(id, |user| user.is_following = Some(state.on));
            }
            ToggleTarget::Bookmark(id) => self.write_back_bookmark(id, state.on, settled),
        }
    }

    fn write_back_bookmark(&mut self, post_id: &str, saved: bool, settled: bool) {
        if let Err(e) = self.saved.set_saved(post_id, saved) {
            warn!(%post_id, error = %e, "Could not persist saved state");
            self.notices.error_text(
                ToggleKind::Bookmark.failure_title(),
                ToggleKind::Bookmark.failure_message(),
            );
            return;
        }
        if saved {
            if let Some(post) = self.find_post(post_id).cloned() {
                if !self.saved_posts.contains(post_id) {
                    self.saved_posts.insert_newest(post);
                }
            }
        } else {
            self.saved_posts.remove(post_id);
        }
        if settled {
            if saved {
                self.notices.success("Saved", "Post saved successfully.");
            } else {
                self.notices
                    .success("Removed", "Post removed from saved list.");
            }
        }
    }

    // ========================================================================
    // Non-optimistic actions
    // ========================================================================

    fn action_failed(&mut self, action: &PendingAction, error: &ApiError) {
        self.notices.error(
            action.kind.failure_title(),
            error,
            action.kind.failure_message(),
        );
    }

    fn apply_action(
        &mut self,
        action: PendingAction,
        post_id: Option<String>,
        content: Option<String>,
        outcome: ActionOutcome,
    ) {
        let id = action.entity_id.as_str();
        match (action.kind, outcome) {
            (ActionKind::CreatePost, ActionOutcome::Post(Some(post))) => {
                let seeds = post_seeds(std::slice::from_ref(&post), self.viewer_id());
                self.feed.insert_newest(post);
                self.seed(seeds);
                self.notices
                    .success("Post Created", "Your post has been created.");
            }
            (ActionKind::CreatePost, _) => {
                self.refresh_feed();
                self.notices
                    .success("Post Created", "Your post has been created.");
            }
            (ActionKind::EditPost, outcome) => {
                let echoed = match outcome {
                    ActionOutcome::Post(post) => post,
                    _ => None,
                };
                self.replace_post(id, echoed, content);
                self.notices
                    .success("Post Updated", "Post updated successfully!");
            }
            (ActionKind::DeletePost, _) => {
                self.remove_post(id);
                self.notices
                    .success("Post Deleted", "Post was deleted successfully.");
            }
            (ActionKind::SharePost, outcome) => {
                let link = match outcome {
                    ActionOutcome::ShareLink(Some(link)) if !link.is_empty() => link,
                    _ => self.config.post_link(id),
                };
                self.share_links.insert(id.to_string(), link);
                self.notices.success("Link Ready", "Share link is ready.");
            }
            (ActionKind::CreateComment, _) => {
                if let Some(post_id) = post_id.as_deref() {
                    self.feed.update(post_id, |p| {
                        p.comments_count = Some(p.comment_count().saturating_add(1));
                    });
                    if self.comments.contains_key(post_id) {
                        self.load_comments(post_id);
                    }
                }
                self.notices
                    .success("Comment Added", "Your comment has been added.");
            }
            (ActionKind::EditComment, outcome) => {
                let echoed = match outcome {
                    ActionOutcome::Comment(comment) => comment,
                    _ => None,
                };
                self.replace_comment(id, echoed, content);
                self.notices
                    .success("Comment Updated", "Comment updated successfully.");
            }
            (ActionKind::DeleteComment, _) => {
                for list in self.comments.values_mut().chain(self.replies.values_mut()) {
                    list.remove(id);
                }
                if let Some(post_id) = post_id.as_deref() {
                    self.feed.update(post_id, |p| {
                        p.comments_count = Some(p.comment_count().saturating_sub(1));
                    });
                }
                self.interactions.forget(id);
                self.close_replies(id);
                self.notices
                    .success("Comment Deleted", "Comment deleted successfully.");
            }
            (ActionKind::CreateReply, _) => {
                if let Some(post_id) = post_id.as_deref() {
                    if self.replies.contains_key(id) {
                        self.load_replies(post_id, id);
                    }
                }
                self.notices.success("Reply Added", "Reply added successfully.");
            }
            (ActionKind::MarkRead, _) => {
                if self.notifications.update(id, |n| n.is_read = true) {
                    self.unread_count = self.unread_count.saturating_sub(1);
                }
            }
            (ActionKind::MarkAllRead, _) => {
                for nid in self.notifications.ids() {
                    self.notifications.update(&nid, |n| n.is_read = true);
                }
                self.unread_count = 0;
                self.notices
                    .success("Done", "All notifications marked as read.");
            }
            (ActionKind::UploadPhoto, outcome) => {
                let photo = match outcome {
                    ActionOutcome::Photo(photo) => photo,
                    _ => None,
                };
                match (photo, self.viewer.is_some()) {
                    (Some(url), true) => {
                        if let Some(viewer) = self.viewer.as_mut() {
                            viewer.photo = Some(url);
                        }
                    }
                    _ => self.load_viewer(),
                }
                self.notices
                    .success("Photo Updated", "Profile photo updated!");
            }
            (ActionKind::ChangePassword, outcome) => {
                if let ActionOutcome::Token(Some(token)) = outcome {
                    if let Err(e) = self.auth.set_token(token) {
                        warn!(error = %e, "Could not store refreshed token");
                    }
                }
                self.notices.success(
                    "Password Updated",
                    "Your password was changed successfully.",
                );
            }
            (ActionKind::SignIn, outcome) => {
                let ActionOutcome::Token(Some(token)) = outcome else {
                    self.notices.error_text(
                        ActionKind::SignIn.failure_title(),
                        ActionKind::SignIn.failure_message(),
                    );
                    return;
                };
                if let Err(e) = self.auth.set_token(token) {
                    warn!(error = %e, "Could not store session token");
                    self.notices
                        .error_text("Sign In Failed", "Could not save your session.");
                    return;
                }
                self.load_viewer();
                self.notices.success("Welcome Back!", "Signed in successfully.");
            }
            (ActionKind::SignUp, _) => {
                self.notices.success(
                    "Account Created",
                    "Your account has been created successfully.",
                );
            }
        }
    }

    /// Put the server's copy of an edited post in every list, or patch the
    /// body locally when the server did not echo it.
    fn replace_post(&mut self, post_id: &str, echoed: Option<Post>, body: Option<String>) {
        let lists = [
            &mut self.feed,
            &mut self.profile_posts,
            &mut self.saved_posts,
        ];
        for list in lists {
            list.update(post_id, |post| match &echoed {
                Some(fresh) => {
                    // Keep what the edit response may omit
                    let mut fresh = fresh.clone();
                    if fresh.user.is_none() {
                        fresh.user = post.user.take();
                    }
                    *post = fresh;
                }
                None => {
                    if let Some(body) = &body {
                        post.body = Some(body.clone());
                    }
                }
            });
        }
    }

    fn replace_comment(&mut self, comment_id: &str, echoed: Option<Comment>, text: Option<String>) {
        for list in self.comments.values_mut().chain(self.replies.values_mut()) {
            list.update(comment_id, |comment| match &echoed {
                Some(fresh) => {
                    let mut fresh = fresh.clone();
                    if fresh.comment_creator.is_none() {
                        fresh.comment_creator = comment.comment_creator.take();
                    }
                    *comment = fresh;
                }
                None => {
                    if let Some(text) = &text {
                        comment.content = Some(text.clone());
                    }
                }
            });
        }
    }

    /// Drop a deleted post from every view and forget its interaction
    /// keys, so settlements still in flight for it become no-ops.
    fn remove_post(&mut self, post_id: &str) {
        self.feed.remove(post_id);
        self.profile_posts.remove(post_id);
        self.saved_posts.remove(post_id);
        self.post_likes.remove(post_id);
        self.share_links.remove(post_id);
        self.close_comments(post_id);
        self.interactions.forget_post(post_id);
        if let Err(e) = self.saved.set_saved(post_id, false) {
            warn!(%post_id, error = %e, "Could not drop deleted post from saved list");
        }
    }
}
