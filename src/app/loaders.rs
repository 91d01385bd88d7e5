//! Fetching lists into the app.

use std::sync::Arc;

use futures::future::join_all;

use super::{App, AppMessage};
use crate::api::FeedScope;
use crate::reconcile::{distinct_authors, EntityList, SourceOrder};

impl App {
    /// Reload the first page of the feed. Results of an older refresh that
    /// arrive after a newer one are ignored.
    pub fn refresh_feed(&mut self) {
        let generation = self.feed.begin_refresh();
        self.feed_page = 0;
        let client = Arc::clone(&self.client);
        let limit = self.config.feed_limit;
        self.spawn_task(async move {
            let result = client.posts().feed(FeedScope::All, 1, limit).await;
            AppMessage::FeedLoaded { generation, result }
        });
    }

    /// Append the next older feed page. Does nothing before the first
    /// page has loaded. A refresh started meanwhile discards the page.
    pub fn load_more_feed(&mut self) {
        if self.feed_page == 0 {
            return;
        }
        let page = self.feed_page + 1;
        let generation = self.feed.current_generation();
        let client = Arc::clone(&self.client);
        let limit = self.config.feed_limit;
        self.spawn_task(async move {
            let result = client.posts().feed(FeedScope::All, page, limit).await;
            AppMessage::FeedPageLoaded {
                generation,
                page,
                result,
            }
        });
    }

    /// Open (or reload) the comment thread of `post_id`.
    pub fn load_comments(&mut self, post_id: &str) {
        let generation = self
            .comments
            .entry(post_id.to_string())
            .or_insert_with(|| EntityList::new(SourceOrder::NewestFirst))
            .begin_refresh();
        let client = Arc::clone(&self.client);
        let post_id = post_id.to_string();
        self.spawn_task(async move {
            let result = client.comments().list(&post_id).await;
            AppMessage::CommentsLoaded {
                post_id,
                generation,
                result,
            }
        });
    }

    /// Close the comment thread of `post_id`. Late results and settlements
    /// for its comments become no-ops.
    pub fn close_comments(&mut self, post_id: &str) {
        if let Some(list) = self.comments.remove(post_id) {
            for comment in list.items() {
                self.interactions.forget(&comment.id);
                self.close_replies(&comment.id);
            }
        }
    }

    /// Open (or reload) the replies of `comment_id`.
    pub fn load_replies(&mut self, post_id: &str, comment_id: &str) {
        let generation = self
            .replies
            .entry(comment_id.to_string())
            .or_insert_with(|| EntityList::new(SourceOrder::NewestFirst))
            .begin_refresh();
        let client = Arc::clone(&self.client);
        let post_id = post_id.to_string();
        let comment_id = comment_id.to_string();
        self.spawn_task(async move {
            let result = client.comments().replies(&post_id, &comment_id).await;
            AppMessage::RepliesLoaded {
                comment_id,
                generation,
                result,
            }
        });
    }

    pub fn close_replies(&mut self, comment_id: &str) {
        if let Some(list) = self.replies.remove(comment_id) {
            for reply in list.items() {
                self.interactions.forget(&reply.id);
            }
        }
    }

    /// Load follow suggestions. When the endpoint fails or returns nothing,
    /// the distinct authors of the general post list are used instead,
    /// fetched once. If that fails too the list is empty.
    pub fn load_suggestions(&mut self) {
        let generation = self.suggestions.begin_refresh();
        let client = Arc::clone(&self.client);
        let limit = self.config.suggestion_limit;
        self.spawn_task(async move {
            match client.users().suggestions(limit).await {
                Ok(users) if !users.is_empty() => {
                    return AppMessage::SuggestionsLoaded { generation, users }
                }
                Ok(_) => tracing::debug!("No suggestions returned, deriving from posts"),
                Err(e) => tracing::debug!(error = %e, "Suggestions failed, deriving from posts"),
            }
            let users = match client.posts().all().await {
                Ok(posts) => distinct_authors(&posts),
                Err(e) => {
                    tracing::warn!(error = %e, "Suggestion fallback failed");
                    Vec::new()
                }
            };
            AppMessage::SuggestionsLoaded { generation, users }
        });
    }

    pub fn load_notifications(&mut self) {
        let generation = self.notifications.begin_refresh();
        let client = Arc::clone(&self.client);
        let limit = self.config.notifications_limit;
        self.spawn_task(async move {
            let result = client.notifications().list(1, limit).await;
            AppMessage::NotificationsLoaded { generation, result }
        });
    }

    pub fn load_unread_count(&mut self) {
        let client = Arc::clone(&self.client);
        self.spawn_task(async move {
            AppMessage::UnreadCountLoaded(client.notifications().unread_count().await)
        });
    }

    /// Fetch every saved post, in saved order. Posts that fail to load are
    /// left out.
    pub fn load_saved_posts(&mut self) {
        let ids = self.saved.ids();
        let client = Arc::clone(&self.client);
        self.spawn_task(async move {
            let fetches = ids.iter().map(|id| {
                let client = Arc::clone(&client);
                async move {
                    match client.posts().get(id).await {
                        Ok(post) => post,
                        Err(e) => {
                            tracing::debug!(post_id = %id, error = %e, "Saved post unavailable");
                            None
                        }
                    }
                }
            });
            let posts = join_all(fetches).await.into_iter().flatten().collect();
            AppMessage::SavedPostsLoaded(posts)
        });
    }

    /// Load the posts of `user_id` for the profile view.
    pub fn load_profile_posts(&mut self, user_id: &str) {
        if self.profile_user_id.as_deref() != Some(user_id) {
            self.profile_posts.clear();
            self.profile_user_id = Some(user_id.to_string());
        }
        let generation = self.profile_posts.begin_refresh();
        let client = Arc::clone(&self.client);
        let user_id = user_id.to_string();
        let limit = self.config.feed_limit;
        self.spawn_task(async move {
            let result = client.users().posts(&user_id, 1, limit).await;
            AppMessage::ProfilePostsLoaded {
                user_id,
                generation,
                result,
            }
        });
    }

    /// Load the users who liked `post_id`.
    pub fn load_likes(&mut self, post_id: &str) {
        let client = Arc::clone(&self.client);
        let post_id = post_id.to_string();
        self.spawn_task(async move {
            let result = client.posts().likes(&post_id, 1, 20).await;
            AppMessage::LikesLoaded { post_id, result }
        });
    }

    /// Load the signed-in user. Skipped when signed out.
    pub fn load_viewer(&mut self) {
        if !self.is_authenticated() {
            return;
        }
        let client = Arc::clone(&self.client);
        self.spawn_task(async move { AppMessage::ViewerLoaded(client.users().profile().await) });
    }
}
