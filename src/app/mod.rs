//! Client application state.
//!
//! [`App`] owns every piece of view state: the feed, open comment threads,
//! suggestions, notifications, saved posts, the interaction overlay and
//! the notice queue. Public actions return immediately. Network work runs
//! on spawned tokio tasks which report back through [`AppMessage`]s, and
//! state only changes inside [`App::handle_message`] on the owning task.
//!
//! ```ignore
//! let mut app = App::from_config(ClientConfig::from_env())?;
//! app.refresh_feed();
//! while app.process_next().await {
//!     render(&app);
//! }
//! ```

mod actions;
mod handlers;
mod loaders;
mod messages;

pub use messages::{ActionOutcome, AppMessage, Envelope};

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::adapters::{FileStore, ReqwestHttpClient};
use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::context::{AuthContext, Notices};
use crate::error::InitError;
use crate::interaction::{
    ActionKind, FlagState, InteractionController, InteractionKey, PendingActions, ToggleKind,
};
use crate::models::{Comment, Notification, Post, User};
use crate::reconcile::{EntityList, SourceOrder};
use crate::saved::SavedPosts;
use crate::traits::{HttpClient, KeyValueStore};

/// Main application state
pub struct App {
    pub config: ClientConfig,
    /// REST client (shared with spawned tasks)
    pub client: Arc<ApiClient>,
    pub auth: Arc<AuthContext>,
    /// Locally persisted bookmarks
    pub saved: SavedPosts,
    pub notices: Notices,
    /// Optimistic like/follow/bookmark overlay
    pub interactions: InteractionController,
    /// Deletes, edits, creates and mark-read awaiting the server
    pub pending: PendingActions,
    /// Signed-in user, once loaded
    pub viewer: Option<User>,
    pub feed: EntityList<Post>,
    /// Last feed page appended (1 after a refresh)
    pub feed_page: u32,
    /// Open comment threads by post id
    pub comments: HashMap<String, EntityList<Comment>>,
    /// Open reply threads by comment id
    pub replies: HashMap<String, EntityList<Comment>>,
    pub suggestions: EntityList<User>,
    pub notifications: EntityList<Notification>,
    pub unread_count: u64,
    pub saved_posts: EntityList<Post>,
    /// Posts of the profile being viewed
    pub profile_posts: EntityList<Post>,
    pub profile_user_id: Option<String>,
    /// Users who liked a post, by post id
    pub post_likes: HashMap<String, Vec<User>>,
    /// Share links handed out, by post id
    pub share_links: HashMap<String, String>,
    /// Receiver for async messages
    pub message_rx: Option<mpsc::UnboundedReceiver<Envelope>>,
    /// Sender for async messages (clone this to pass to async tasks)
    pub message_tx: mpsc::UnboundedSender<Envelope>,
    /// Spawned tasks whose message has not been handled yet
    outstanding: usize,
    /// Bumped on log-out; tasks of an earlier session are ignored
    session: u64,
}

impl App {
    /// Create an app over the given transport and storage.
    pub fn new(
        config: ClientConfig,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let auth = Arc::new(AuthContext::load(Arc::clone(&store)));
        let client = Arc::new(ApiClient::new(
            http,
            config.api_base_url.clone(),
            Arc::clone(&auth),
        ));
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        Self {
            feed: EntityList::new(config.feed_order),
            feed_page: 0,
            config,
            client,
            auth,
            saved: SavedPosts::new(store),
            notices: Notices::new(),
            interactions: InteractionController::new(),
            pending: PendingActions::new(),
            viewer: None,
            comments: HashMap::new(),
            replies: HashMap::new(),
            suggestions: EntityList::new(SourceOrder::NewestFirst),
            notifications: EntityList::new(SourceOrder::NewestFirst),
            unread_count: 0,
            saved_posts: EntityList::new(SourceOrder::NewestFirst),
            profile_posts: EntityList::new(SourceOrder::OldestFirst),
            profile_user_id: None,
            post_likes: HashMap::new(),
            share_links: HashMap::new(),
            message_rx: Some(message_rx),
            message_tx,
            outstanding: 0,
            session: 0,
        }
    }

    /// Production wiring: reqwest transport and the JSON file store.
    pub fn from_config(config: ClientConfig) -> Result<Self, InitError> {
        let store = match &config.data_dir {
            Some(dir) => FileStore::in_dir(dir),
            None => FileStore::new()?,
        };
        let http = match config.request_timeout {
            Some(timeout) => ReqwestHttpClient::with_timeout(timeout)?,
            None => ReqwestHttpClient::new(),
        };
        tracing::info!(api = %config.api_base_url, "Starting linkpost client");
        Ok(Self::new(config, Arc::new(http), Arc::new(store)))
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn viewer_id(&self) -> Option<&str> {
        self.viewer.as_ref().map(|u| u.id.as_str())
    }

    // ========================================================================
    // Displayed interaction state
    // ========================================================================

    /// Like state shown for `post`: the optimistic overlay when known, else
    /// the post's own fields.
    pub fn post_like_state(&self, post: &Post) -> FlagState {
        self.interactions.state_or(
            &InteractionKey::new(post.id.as_str(), ToggleKind::PostLike),
            FlagState::new(post.liked_by(self.viewer_id()), post.like_count()),
        )
    }

    pub fn comment_like_state(&self, comment: &Comment) -> FlagState {
        self.interactions.state_or(
            &InteractionKey::new(comment.id.as_str(), ToggleKind::CommentLike),
            FlagState::new(comment.liked_by(self.viewer_id()), comment.like_count()),
        )
    }

    pub fn is_following(&self, user: &User) -> bool {
        self.interactions
            .state_or(
                &InteractionKey::new(user.id.as_str(), ToggleKind::Follow),
                FlagState::flag(user.followed_by_viewer()),
            )
            .on
    }

    /// Saved badge for `post_id`. The local saved set is authoritative; a
    /// pending bookmark toggle shows through the overlay.
    pub fn is_saved(&self, post_id: &str) -> bool {
        match self
            .interactions
            .state(&InteractionKey::new(post_id, ToggleKind::Bookmark))
        {
            Some(state) => state.on,
            None => self.saved.is_saved(post_id),
        }
    }

    /// Whether the delete control for `post_id` should be disabled.
    pub fn is_deleting(&self, post_id: &str) -> bool {
        self.pending.is_pending(ActionKind::DeletePost, post_id)
    }

    // ========================================================================
    // Message loop
    // ========================================================================

    /// Run `task` on tokio and deliver its message to this app, tagged
    /// with the current session.
    pub(crate) fn spawn_task<F>(&mut self, task: F)
    where
        F: Future<Output = AppMessage> + Send + 'static,
    {
        self.outstanding += 1;
        let session = self.session;
        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            let message = task.await;
            if tx.send(Envelope { session, message }).is_err() {
                tracing::debug!("App dropped before task finished");
            }
        });
    }

    /// Wait for the next message and apply it. Returns `false` once the
    /// channel is closed or the receiver was taken.
    pub async fn process_next(&mut self) -> bool {
        let envelope = match self.message_rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => return false,
        };
        match envelope {
            Some(envelope) => {
                self.handle_envelope(envelope);
                true
            }
            None => false,
        }
    }

    /// Process messages until no spawned task is outstanding.
    pub async fn run_until_idle(&mut self) {
        while self.outstanding > 0 {
            if !self.process_next().await {
                break;
            }
        }
    }

    /// Spawned tasks that have not reported back yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Current session. Starts at 0 and grows on every log-out.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Receive the next message without applying it. Lets callers reorder
    /// completions before handing them to [`handle_envelope`](Self::handle_envelope).
    pub async fn next_message(&mut self) -> Option<Envelope> {
        self.message_rx.as_mut()?.recv().await
    }
}
