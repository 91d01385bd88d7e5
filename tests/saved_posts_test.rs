//! Saved set persisted through the file store.

use std::sync::Arc;

use linkpost::adapters::FileStore;
use linkpost::saved::{SavedPosts, SAVED_POSTS_KEY};
use linkpost::traits::KeyValueStore;
use tempfile::TempDir;

fn saved_in(dir: &TempDir) -> (SavedPosts, Arc<FileStore>) {
    let store = Arc::new(FileStore::in_dir(dir.path()));
    (SavedPosts::new(store.clone()), store)
}

#[test]
fn test_first_use_is_empty() {
    let dir = TempDir::new().unwrap();
    let (saved, _) = saved_in(&dir);
    assert!(saved.ids().is_empty());
    assert!(!saved.is_saved("p1"));
}

#[test]
fn test_toggle_persists_across_instances() {
    let dir = TempDir::new().unwrap();
    let (saved, _) = saved_in(&dir);
    saved.toggle("p2").unwrap();
    saved.toggle("p1").unwrap();

    let (reopened, store) = saved_in(&dir);
    assert_eq!(reopened.ids(), vec!["p1", "p2"]);
    assert_eq!(
        store.get(SAVED_POSTS_KEY).unwrap().as_deref(),
        Some(r#"["p1","p2"]"#)
    );
}

#[test]
fn test_double_toggle_restores_order() {
    let dir = TempDir::new().unwrap();
    let (saved, _) = saved_in(&dir);
    for id in ["p3", "p2", "p1"] {
        saved.toggle(id).unwrap();
    }
    let before = saved.ids();

    saved.toggle("p2").unwrap();
    assert_eq!(saved.ids(), vec!["p1", "p3"]);
    saved.toggle("p2").unwrap();
    assert_eq!(saved.ids(), before);

    saved.toggle("p9").unwrap();
    saved.toggle("p9").unwrap();
    assert_eq!(saved.ids(), before);
}

#[test]
fn test_corrupt_value_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let (saved, store) = saved_in(&dir);
    store.set(SAVED_POSTS_KEY, "{not json").unwrap();

    assert!(saved.ids().is_empty());
    assert_eq!(saved.toggle("p1").unwrap(), vec!["p1"]);
}

#[test]
fn test_concurrent_toggles_do_not_lose_updates() {
    let dir = TempDir::new().unwrap();
    let (saved, _) = saved_in(&dir);
    let saved = Arc::new(saved);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let saved = Arc::clone(&saved);
            std::thread::spawn(move || saved.set_saved(&format!("p{}", i), true).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut ids = saved.ids();
    ids.sort();
    let expected: Vec<String> = (0..8).map(|i| format!("p{}", i)).collect();
    assert_eq!(ids, expected);
}
