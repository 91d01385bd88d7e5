//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use linkpost::adapters::{InMemoryStore, MockHttpClient};
use linkpost::context::TOKEN_KEY;
use linkpost::models::{Post, User};
use linkpost::{App, ClientConfig};

pub const BASE: &str = "https://api.test";

pub fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

/// Signed-in app over mocks with viewer `me`, plus handles to the mocks.
pub fn signed_in_app() -> (App, MockHttpClient, InMemoryStore) {
    app_with_store(InMemoryStore::with_entry(TOKEN_KEY, "test-token"))
}

pub fn app_with_store(store: InMemoryStore) -> (App, MockHttpClient, InMemoryStore) {
    let http = MockHttpClient::new();
    let config = ClientConfig::default().with_api_base_url(BASE);
    let mut app = App::new(config, Arc::new(http.clone()), Arc::new(store.clone()));
    app.viewer = Some(User::with_id("me"));
    (app, http, store)
}

/// A post with a known like state, authored by `author`.
pub fn post(id: &str, author: &str, liked: bool, likes: u32) -> Post {
    let mut post = Post::new(id, format!("body of {}", id));
    post.user = Some(User::with_id(author));
    post.is_liked = Some(liked);
    post.likes_count = Some(likes);
    post
}
