//! Feed ingestion through the app: ordering, dedup, malformed payloads
//! and stale refreshes.

mod common;

use common::{signed_in_app, url};
use linkpost::adapters::MockResponse;
use linkpost::models::Post;
use linkpost::reconcile::{decode_list, EntityList, SourceOrder};
use linkpost::traits::Method;
use linkpost::AppMessage;
use serde_json::json;

const FEED: &str = "/posts/feed?only=all&page=1&limit=50";

fn oldest_first_payload() -> serde_json::Value {
    json!({"data": {"posts": [
        {"_id": "p1", "body": "first"},
        {"_id": "p2", "body": "second"},
        {"_id": "p3", "body": "third"}
    ]}})
}

#[tokio::test]
async fn test_repeated_refreshes_keep_order() {
    let (mut app, http, _) = signed_in_app();
    http.set_response(Method::Get, &url(FEED), MockResponse::json(200, oldest_first_payload()));

    for _ in 0..3 {
        app.refresh_feed();
        app.run_until_idle().await;
        assert_eq!(app.feed.ids(), vec!["p3", "p2", "p1"]);
    }
}

#[tokio::test]
async fn test_malformed_payloads_yield_empty_feed() {
    let (mut app, http, _) = signed_in_app();
    for payload in [json!({}), json!({"data": "oops"}), json!(null), json!({"posts": {}})] {
        http.set_response(Method::Get, &url(FEED), MockResponse::json(200, payload));
        app.refresh_feed();
        app.run_until_idle().await;
        assert!(app.feed.is_empty());
        assert!(app.feed.is_loaded());
    }
    assert!(app.notices.is_empty());
}

#[tokio::test]
async fn test_bad_entries_are_skipped() {
    let (mut app, http, _) = signed_in_app();
    http.set_response(
        Method::Get,
        &url(FEED),
        MockResponse::json(
            200,
            json!({"posts": [{"_id": "p1"}, {"body": "no id"}, "junk", {"_id": "p1"}, {"id": "p2"}]}),
        ),
    );
    app.refresh_feed();
    app.run_until_idle().await;
    assert_eq!(app.feed.ids(), vec!["p2", "p1"]);
}

#[tokio::test]
async fn test_stale_refresh_is_ignored() {
    let (mut app, _, _) = signed_in_app();
    let older = app.feed.begin_refresh();
    let newer = app.feed.begin_refresh();

    app.handle_message(AppMessage::FeedLoaded {
        generation: newer,
        result: Ok(vec![Post::new("new", "")]),
    });
    app.handle_message(AppMessage::FeedLoaded {
        generation: older,
        result: Ok(vec![Post::new("old", "")]),
    });
    app.handle_message(AppMessage::FeedLoaded {
        generation: older,
        result: Err(linkpost::error::ApiError::MalformedResponse("late".to_string())),
    });

    assert_eq!(app.feed.ids(), vec!["new"]);
    assert!(app.notices.is_empty());
}

#[test]
fn test_entity_list_dedup_keeps_first() {
    let batch: Vec<Post> = decode_list(
        &json!({"data": [{"_id": "a", "body": "1"}, {"_id": "a", "body": "2"}, {"_id": "b"}]}),
        "posts",
    );
    let mut list = EntityList::new(SourceOrder::NewestFirst);
    list.replace(batch);
    assert_eq!(list.ids(), vec!["a", "b"]);
    assert_eq!(list.get("a").unwrap().body.as_deref(), Some("1"));
}
