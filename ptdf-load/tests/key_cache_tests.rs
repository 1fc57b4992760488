//! Key cache behaviour across flushes, interrupts and resumed runs

mod helpers;

use ptdf_common::config::LoaderConfig;
use ptdf_load::db::{MemoryStore, Value};
use ptdf_load::services::{KeyCaches, ShutdownGuard, ShutdownMode};
use std::collections::HashSet;
use std::sync::Arc;

fn config(flush_every: u64) -> LoaderConfig {
    LoaderConfig {
        title_flush_every: flush_every,
        person_flush_every: flush_every,
        ..LoaderConfig::default()
    }
}

#[tokio::test]
async fn test_interrupt_drains_pending_titles_once() {
    let store = Arc::new(MemoryStore::new());
    let mut caches = KeyCaches::new(store.clone(), &config(18_000));

    for n in 0..5_000 {
        caches.titles.resolve(&format!("Film {} (1999)", n)).await.unwrap();
    }
    assert_eq!(store.row_count("title"), 0);

    let guard = ShutdownGuard::new();
    let outcome = guard
        .drain(&mut caches, ShutdownMode::Interrupted)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.written, 5_000);
    assert_eq!(store.row_count("title"), 5_000);

    // A second interrupt while the first drain ran does nothing
    assert!(guard.drain(&mut caches, ShutdownMode::Interrupted).await.unwrap().is_none());
    assert_eq!(store.row_count("title"), 5_000);
}

#[tokio::test]
async fn test_ids_are_unique_and_increasing() {
    let store = Arc::new(MemoryStore::new());
    let mut caches = KeyCaches::new(store.clone(), &config(7));

    let mut last = 0;
    for n in 0..50 {
        let id = caches.persons.resolve(&format!("Extra {}, Helen", n)).await.unwrap();
        assert!(id > last);
        last = id;
    }
    caches.flush_referenced().await.unwrap();

    let ids = helpers::column(&store.rows("name"), 0);
    assert_eq!(ids.len(), 50);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 50);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_resume_continues_after_stored_ids() {
    let store = Arc::new(MemoryStore::new());
    {
        let mut caches = KeyCaches::new(store.clone(), &config(100));
        caches.titles.resolve("Incredibles, The (2004)").await.unwrap();
        caches.titles.resolve("\"Lost\" (2004) {Pilot (#1.1)}").await.unwrap();
        caches.persons.resolve("Hunt, Holly").await.unwrap();
        caches.flush_referenced().await.unwrap();
    }

    let mut caches = KeyCaches::new(store.clone(), &config(100));
    caches.populate().await.unwrap();

    assert_eq!(caches.titles.get("Incredibles, The (2004)"), Some(1));
    assert_eq!(caches.titles.get("\"Lost\" (2004)"), Some(2));
    assert_eq!(caches.persons.get("Hunt, Holly"), Some(1));
    assert_eq!(caches.titles.next_id(), 4);

    // Known keys keep their ids, new keys continue the sequence
    assert_eq!(caches.titles.resolve("Incredibles, The (2004)").await.unwrap(), 1);
    assert_eq!(caches.titles.resolve("Iron Giant, The (1999)").await.unwrap(), 4);
    caches.flush_referenced().await.unwrap();
    assert_eq!(store.row_count("title"), 4);
    assert_eq!(store.rows("title")[3][0], Value::Int(4));
}
