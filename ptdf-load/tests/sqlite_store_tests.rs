//! SQLite store tests against a temporary database file

mod helpers;

use helpers::fixtures;
use ptdf_common::config::LoaderConfig;
use ptdf_common::db::init_database;
use ptdf_load::db::tables::{MOVIE_LINK, TITLE};
use ptdf_load::db::{SqliteStore, Store, Value};
use ptdf_load::services::{BatchWriter, KeyCaches};
use ptdf_load::{Phase, PipelineOrchestrator};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

async fn open(dir: &TempDir) -> SqlitePool {
    init_database(&dir.path().join("ptdf.db"), false).await.unwrap()
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_schema_is_seeded_once() {
    let dir = TempDir::new().unwrap();
    let pool = open(&dir).await;
    assert_eq!(count(&pool, "role_type").await, 12);
    assert_eq!(count(&pool, "kind_type").await, 7);
    pool.close().await;

    // Opening again keeps the vocabularies as they are
    let pool = open(&dir).await;
    assert_eq!(count(&pool, "role_type").await, 12);
}

#[tokio::test]
async fn test_rows_read_back_in_insert_order() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::new(open(&dir).await, 100);

    let rows = vec![
        vec![
            Value::Int(1),
            Value::Text("Incredibles, The".to_string()),
            Value::Null,
            Value::Int(1),
            Value::Int(2004),
            Value::Text("I5216".to_string()),
            Value::Null,
            Value::Null,
            Value::Null,
        ],
        vec![
            Value::Int(2),
            Value::Text("Birds, The".to_string()),
            Value::Text("II".to_string()),
            Value::Int(3),
            Value::Int(1963),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
        ],
    ];
    store.bulk_insert(&TITLE, &rows).await.unwrap();

    assert_eq!(store.read_rows(&TITLE).await.unwrap(), rows);
}

#[tokio::test]
async fn test_batch_above_limit_is_overflow() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::new(open(&dir).await, 2);
    let rows: Vec<_> = (1..=3)
        .map(|movie| vec![Value::Int(movie), Value::Int(movie + 1), Value::Int(1)])
        .collect();

    let err = store.bulk_insert(&MOVIE_LINK, &rows).await.unwrap_err();
    assert!(err.is_overflow());
    assert_eq!(count(store.pool(), "movie_link").await, 0);
}

#[tokio::test]
async fn test_writer_splits_oversized_batches() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(open(&dir).await, 10));
    let mut caches = KeyCaches::new(store.clone(), &LoaderConfig::default());
    let mut writer = BatchWriter::new(&MOVIE_LINK, store.clone(), 1_000, 5);

    for movie in 0..40 {
        writer
            .add(vec![Value::Int(movie), Value::Int(movie + 1), Value::Int(1)], &mut caches)
            .await
            .unwrap();
    }
    let outcome = writer.flush(&mut caches).await.unwrap();

    assert_eq!(outcome.written, 40);
    assert_eq!(outcome.dropped, 0);
    assert!(outcome.splits > 0);
    assert_eq!(store.read_rows(&MOVIE_LINK).await.unwrap().len(), 40);
}

#[tokio::test]
async fn test_resumed_run_reuses_stored_ids() {
    let data = helpers::data_dir(&[
        ("movies.list.gz", fixtures::MOVIES),
        ("actresses.list.gz", fixtures::ACTRESSES),
    ]);
    let dir = TempDir::new().unwrap();
    let pool = open(&dir).await;

    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool.clone(), 1_000));
    let mut seed = PipelineOrchestrator::new(store.clone(), data.path(), LoaderConfig::default())
        .with_phases(&[Phase::SeedTitles]);
    seed.run(CancellationToken::new()).await.unwrap();
    assert_eq!(count(&pool, "title").await, 4);

    let config = LoaderConfig {
        resume: true,
        ..LoaderConfig::default()
    };
    let mut credits = PipelineOrchestrator::new(store.clone(), data.path(), config)
        .with_phases(&[Phase::RoleFacts, Phase::FinalFlush]);
    credits.run(CancellationToken::new()).await.unwrap();

    assert_eq!(count(&pool, "title").await, 4);
    let movie_ids: Vec<i64> = sqlx::query_scalar("SELECT movie_id FROM cast_info ORDER BY rowid")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(movie_ids, vec![1, 4, 1]);
}
