//! End-to-end optimistic toggle scenarios through the app message loop.

mod common;

use common::{app_with_store, post, signed_in_app, url};
use linkpost::adapters::{InMemoryStore, MockResponse};
use linkpost::context::{NoticeKind, TOKEN_KEY};
use linkpost::interaction::{FlagState, InteractionKey, ToggleKind};
use linkpost::saved::SAVED_POSTS_KEY;
use linkpost::traits::{KeyValueStore, Method};
use linkpost::AppMessage;
use serde_json::json;

#[tokio::test]
async fn test_like_failure_rolls_back_with_one_notice() {
    let (mut app, http, _) = signed_in_app();
    app.feed.replace(vec![post("p1", "u1", false, 3)]);
    http.set_response(
        Method::Put,
        &url("/posts/p1/like"),
        MockResponse::json(500, json!({})),
    );

    assert!(app.toggle_post_like("p1"));
    let shown = app.post_like_state(app.feed.get("p1").unwrap());
    assert_eq!(shown, FlagState::new(true, 4));

    app.run_until_idle().await;

    let shown = app.post_like_state(app.feed.get("p1").unwrap());
    assert_eq!(shown, FlagState::new(false, 3));
    assert_eq!(app.notices.len(), 1);
    let notice = app.notices.latest().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.title, "Like Failed");
    assert_eq!(notice.message, "Failed to update like status.");
}

#[tokio::test]
async fn test_like_failure_uses_server_message() {
    let (mut app, http, _) = signed_in_app();
    app.feed.replace(vec![post("p1", "u1", false, 0)]);
    http.set_response(
        Method::Put,
        &url("/posts/p1/like"),
        MockResponse::json(401, json!({"message": "Please sign in"})),
    );

    app.toggle_post_like("p1");
    app.run_until_idle().await;

    assert_eq!(app.notices.latest().unwrap().message, "Please sign in");
}

#[tokio::test]
async fn test_double_toggle_is_serialized() {
    let (mut app, http, _) = signed_in_app();
    app.feed.replace(vec![post("p1", "u1", false, 3)]);
    http.set_response(Method::Put, &url("/posts/p1/like"), MockResponse::ok());
    let key = InteractionKey::new("p1", ToggleKind::PostLike);

    app.toggle_post_like("p1");
    app.toggle_post_like("p1");
    assert_eq!(app.interactions.queued(&key), 1);
    assert_eq!(app.interactions.in_flight_count(), 1);
    assert_eq!(app.interactions.state(&key), Some(FlagState::new(false, 3)));

    app.run_until_idle().await;

    assert_eq!(http.count_requests(Method::Put, &url("/posts/p1/like")), 2);
    assert_eq!(app.interactions.confirmed(&key), Some(FlagState::new(false, 3)));
    let stored = app.feed.get("p1").unwrap();
    assert_eq!(stored.is_liked, Some(false));
    assert_eq!(stored.likes_count, Some(3));
    assert!(app.notices.is_empty());
}

#[tokio::test]
async fn test_unlike_at_zero_stays_non_negative() {
    let (mut app, http, _) = signed_in_app();
    app.feed.replace(vec![post("p1", "u1", true, 0)]);
    http.set_response(Method::Put, &url("/posts/p1/like"), MockResponse::ok());

    app.toggle_post_like("p1");
    let shown = app.post_like_state(app.feed.get("p1").unwrap());
    assert_eq!(shown, FlagState::new(false, 0));
    app.run_until_idle().await;
    assert_eq!(app.feed.get("p1").unwrap().likes_count, Some(0));
}

#[tokio::test]
async fn test_delete_while_like_in_flight_does_not_resurrect() {
    let (mut app, http, _) = signed_in_app();
    app.feed.replace(vec![post("p1", "me", false, 1), post("p2", "u1", false, 0)]);
    http.set_response(Method::Put, &url("/posts/p1/like"), MockResponse::ok());
    http.set_response(Method::Delete, &url("/posts/p1"), MockResponse::ok());

    assert!(app.toggle_post_like("p1"));
    assert!(app.delete_post("p1"));

    // Apply the delete before the like, whatever order they finished in
    let first = app.next_message().await.unwrap();
    let second = app.next_message().await.unwrap();
    let (delete, like) = match first.message {
        AppMessage::ActionSettled { .. } => (first, second),
        _ => (second, first),
    };
    app.handle_envelope(delete);
    app.handle_envelope(like);

    assert!(!app.feed.contains("p1"));
    assert!(app.find_post("p1").is_none());
    assert_eq!(app.feed.ids(), vec!["p2"]);
    let key = InteractionKey::new("p1", ToggleKind::PostLike);
    assert_eq!(app.interactions.state(&key), None);
    assert_eq!(app.outstanding(), 0);
    assert_eq!(app.notices.len(), 1);
    assert_eq!(app.notices.latest().unwrap().title, "Post Deleted");
}

#[tokio::test]
async fn test_bookmark_scenario() {
    let store = InMemoryStore::with_entry(TOKEN_KEY, "test-token");
    store.set(SAVED_POSTS_KEY, r#"["p2"]"#).unwrap();
    let (mut app, http, store) = app_with_store(store);
    app.feed.replace(vec![post("p1", "u1", false, 0), post("p2", "u1", false, 0)]);
    http.set_response(Method::Put, &url("/posts/p1/bookmark"), MockResponse::ok());

    assert!(!app.is_saved("p1"));
    app.toggle_bookmark("p1");
    assert!(app.is_saved("p1"));
    app.run_until_idle().await;
    assert_eq!(app.saved.ids(), vec!["p1", "p2"]);
    assert_eq!(store.raw(SAVED_POSTS_KEY).as_deref(), Some(r#"["p1","p2"]"#));
    assert_eq!(app.notices.latest().unwrap().title, "Saved");

    app.toggle_bookmark("p1");
    app.run_until_idle().await;
    assert_eq!(app.saved.ids(), vec!["p2"]);
    assert!(!app.is_saved("p1"));
    assert_eq!(app.notices.latest().unwrap().title, "Removed");
}

#[tokio::test]
async fn test_bookmark_failure_leaves_saved_set() {
    let (mut app, http, _) = signed_in_app();
    http.set_response(Method::Put, &url("/posts/p1/bookmark"), MockResponse::network_error());

    app.toggle_bookmark("p1");
    app.run_until_idle().await;

    assert!(app.saved.ids().is_empty());
    assert!(!app.is_saved("p1"));
    assert_eq!(app.notices.latest().unwrap().title, "Bookmark Failed");
}

#[tokio::test]
async fn test_follow_uses_put_and_refuses_self() {
    let (mut app, http, _) = signed_in_app();
    let mut other = linkpost::models::User::with_id("u1");
    other.is_following = Some(false);
    app.suggestions.replace(vec![other]);
    http.set_response(Method::Put, &url("/users/u1/follow"), MockResponse::ok());

    assert!(!app.toggle_follow("me"));
    assert!(app.toggle_follow("u1"));
    app.run_until_idle().await;

    let user = &app.suggestions.items()[0];
    assert_eq!(user.is_following, Some(true));
    assert!(app.is_following(user));
    assert_eq!(http.count_requests(Method::Put, &url("/users/u1/follow")), 1);
}

#[tokio::test]
async fn test_toggle_on_unknown_entity_is_refused() {
    let (mut app, _, _) = signed_in_app();
    assert!(!app.toggle_post_like("nope"));
    assert!(!app.toggle_comment_like("p1", "nope"));
    assert_eq!(app.outstanding(), 0);
}
