//! End to end runs of the load pipeline over small data files

mod helpers;

use helpers::fixtures;
use ptdf_common::config::LoaderConfig;
use ptdf_common::db::vocabulary::{info_type_id, lookup, role_type_id, LINK_TYPES};
use ptdf_load::db::{MemoryStore, Value};
use ptdf_load::{Phase, PipelineOrchestrator, RunOutcome};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn all_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("movies.list.gz", fixtures::MOVIES),
        ("actresses.list.gz", fixtures::ACTRESSES),
        ("aka-names.list.gz", fixtures::AKA_NAMES),
        ("aka-titles.list.gz", fixtures::AKA_TITLES),
        ("trivia.list.gz", fixtures::TRIVIA),
        ("biographies.list.gz", fixtures::BIOGRAPHIES),
        ("movie-links.list.gz", fixtures::MOVIE_LINKS),
        ("genres.list.gz", fixtures::GENRES),
        ("taglines.list.gz", fixtures::TAGLINES),
    ]
}

#[tokio::test]
async fn test_full_run_over_fixtures() {
    let dir = helpers::data_dir(&all_files());
    let store = Arc::new(MemoryStore::new());
    let mut orchestrator = PipelineOrchestrator::new(store.clone(), dir.path(), LoaderConfig::default());

    let outcome = orchestrator.run(CancellationToken::new()).await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    // Seeded titles keep their ids; no fact introduced a new one
    assert_eq!(store.row_count("title"), 4);
    assert_eq!(store.row_count("name"), 2);
    let episode = &store.rows("title")[2];
    assert_eq!(episode[0], Value::Int(3));
    assert_eq!(episode[6], Value::Int(2));

    let cast = store.rows("cast_info");
    assert_eq!(cast.len(), 3);
    assert_eq!(cast[1][1], Value::Int(4));
    assert_eq!(cast[1][2], text("Annie Hughes"));
    assert_eq!(cast[2][0], Value::Int(2));

    let alias_names = store.rows("aka_name");
    assert!(!alias_names.is_empty());
    assert!(alias_names.iter().all(|row| row[0] == Value::Int(1)));

    let alias_titles = store.rows("aka_title");
    assert_eq!(alias_titles.len(), 3);
    assert_eq!(alias_titles[0][1], Value::Int(1));
    assert_eq!(alias_titles[0][10], text("(Germany)"));
    // Series alias implied by the episode alias, recorded against the series
    assert_eq!(alias_titles[1][1], Value::Int(2));
    assert_eq!(alias_titles[2][1], Value::Int(3));
    assert_eq!(alias_titles[2][7], alias_titles[1][0]);

    let trivia = Value::Int(info_type_id("trivia").unwrap());
    let movie_info = store.rows("movie_info");
    assert!(movie_info.contains(&vec![
        Value::Int(1),
        trivia,
        text("Helen's suit was redesigned twice."),
        Value::Null,
    ]));

    let taglines = Value::Int(info_type_id("taglines").unwrap());
    let tagline_rows: Vec<_> = movie_info.iter().filter(|row| row[1] == taglines).collect();
    assert_eq!(tagline_rows.len(), 2);
    assert_eq!(tagline_rows[0][2], text("No gut, no glory."));

    let genres = Value::Int(info_type_id("genres").unwrap());
    assert_eq!(movie_info.iter().filter(|row| row[1] == genres).count(), 2);

    let mini_bio = Value::Int(info_type_id("mini biography").unwrap());
    assert!(store.rows("person_info").contains(&vec![
        Value::Int(1),
        mini_bio,
        text("Holly Hunt grew up on a farm."),
        text("(author: Anonymous)"),
    ]));

    assert_eq!(
        store.rows("movie_link"),
        vec![vec![Value::Int(1), Value::Int(4), Value::Int(lookup(LINK_TYPES, "follows").unwrap())]]
    );

    helpers::assert_referential_safety(&store);

    let stats = orchestrator.statistics();
    assert_eq!(stats.phase(Phase::SeedTitles).unwrap().records_scanned, 4);
    let roles = stats.phase(Phase::RoleFacts).unwrap();
    assert_eq!(roles.files_read, 1);
    assert_eq!(roles.files_skipped, 10);
    assert_eq!(stats.rows_dropped(), 0);
}

#[tokio::test]
async fn test_credit_of_unseeded_title() {
    let dir = helpers::data_dir(&[("actresses.list.gz", fixtures::ACTRESSES)]);
    let store = Arc::new(MemoryStore::new());
    let mut orchestrator = PipelineOrchestrator::new(store.clone(), dir.path(), LoaderConfig::default())
        .with_phases(&[Phase::RoleFacts, Phase::FinalFlush]);

    let outcome = orchestrator.run(CancellationToken::new()).await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    // Titles first seen in the cast list get ids on the spot
    assert_eq!(store.row_count("title"), 2);
    let actress = role_type_id("actress").unwrap();
    assert_eq!(
        store.rows("cast_info")[0],
        vec![
            Value::Int(1),
            Value::Int(1),
            text("Helen Parr"),
            text("(voice)"),
            Value::Int(2),
            Value::Int(actress),
        ]
    );
    helpers::assert_referential_safety(&store);
}

#[tokio::test]
async fn test_alias_title_keys_released_after_phase() {
    let dir = helpers::data_dir(&[
        ("movies.list.gz", fixtures::MOVIES),
        ("aka-titles.list.gz", fixtures::AKA_TITLES),
    ]);
    let store = Arc::new(MemoryStore::new());
    let mut orchestrator = PipelineOrchestrator::new(store.clone(), dir.path(), LoaderConfig::default())
        .with_phases(&[Phase::SeedTitles, Phase::AliasTitles]);

    orchestrator.run(CancellationToken::new()).await.unwrap();

    assert_eq!(store.row_count("aka_title"), 3);
    let aliases = &orchestrator.caches().alias_titles;
    assert!(aliases.is_empty());
    assert_eq!(aliases.pending_len(), 0);
    assert_eq!(aliases.next_id(), 4);
}

#[tokio::test]
async fn test_missing_files_are_skipped() {
    let dir = helpers::data_dir(&[]);
    let store = Arc::new(MemoryStore::new());
    let mut orchestrator = PipelineOrchestrator::new(store.clone(), dir.path(), LoaderConfig::default());

    let outcome = orchestrator.run(CancellationToken::new()).await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);
    assert!(store.journal().is_empty());

    let stats = orchestrator.statistics();
    assert_eq!(stats.phase(Phase::SeedTitles).unwrap().files_skipped, 1);
    assert_eq!(stats.total().files_read, 0);
}

#[tokio::test]
async fn test_unparseable_title_is_skipped() {
    let dir = helpers::data_dir(&[("movies.list.gz", fixtures::MOVIES_WITH_BAD_LINE)]);
    let store = Arc::new(MemoryStore::new());
    let mut orchestrator = PipelineOrchestrator::new(store.clone(), dir.path(), LoaderConfig::default())
        .with_phases(&[Phase::SeedTitles]);

    orchestrator.run(CancellationToken::new()).await.unwrap();

    let seeded = orchestrator.statistics().phase(Phase::SeedTitles).unwrap();
    assert_eq!(seeded.records_scanned, 3);
    assert_eq!(seeded.parse_failures, 1);
    assert_eq!(store.row_count("title"), 2);
    assert_eq!(helpers::column(&store.rows("title"), 0), vec![1, 2]);
}

#[tokio::test]
async fn test_cancelled_run_reports_interrupt() {
    let dir = helpers::data_dir(&all_files());
    let store = Arc::new(MemoryStore::new());
    let mut orchestrator = PipelineOrchestrator::new(store.clone(), dir.path(), LoaderConfig::default());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = orchestrator.run(cancel).await.unwrap();

    assert_eq!(outcome, RunOutcome::Interrupted);
    assert!(orchestrator.statistics().phases.is_empty());
    assert_eq!(store.row_count("title"), 0);
}

#[tokio::test]
async fn test_small_thresholds_keep_references_safe() {
    let dir = helpers::data_dir(&all_files());
    let store = Arc::new(MemoryStore::new());
    let config = LoaderConfig {
        title_flush_every: 2,
        person_flush_every: 2,
        fact_flush_every: 2,
        ..LoaderConfig::default()
    };
    let mut orchestrator = PipelineOrchestrator::new(store.clone(), dir.path(), config);

    orchestrator.run(CancellationToken::new()).await.unwrap();

    assert_eq!(store.row_count("title"), 4);
    assert_eq!(store.row_count("cast_info"), 3);
    assert_eq!(store.row_count("aka_title"), 3);
    helpers::assert_referential_safety(&store);
}

#[tokio::test]
async fn test_dry_run_counts_rows() {
    let dir = helpers::data_dir(&all_files());
    let store = Arc::new(MemoryStore::counting());
    let mut orchestrator = PipelineOrchestrator::new(store.clone(), dir.path(), LoaderConfig::default());

    orchestrator.run(CancellationToken::new()).await.unwrap();

    assert_eq!(store.row_count("title"), 4);
    assert_eq!(store.row_count("cast_info"), 3);
    assert!(store.rows("title").is_empty());
}
