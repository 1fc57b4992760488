//! Database initialization
//!
//! Creates the destination tables (when missing) and seeds the lookup
//! vocabularies. Tables carry no foreign key constraints and no secondary
//! indexes: both slow down bulk inserts.

use crate::db::vocabulary::{COMP_CAST_TYPES, INFO_TYPES, KIND_TYPES, LINK_TYPES, ROLE_TYPES};
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{debug, info, warn};

/// Every table, in creation order
pub const ALL_TABLES: &[&str] = &[
    "kind_type",
    "role_type",
    "info_type",
    "link_type",
    "comp_cast_type",
    "title",
    "name",
    "aka_title",
    "aka_name",
    "cast_info",
    "movie_info",
    "person_info",
    "movie_link",
    "complete_cast",
];

/// Open (or create) the database file and make sure the schema exists
pub async fn init_database(db_path: &Path, drop_existing: bool) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // One connection: the loader is a single sequential writer
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA synchronous = NORMAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool, drop_existing).await?;

    Ok(pool)
}

/// Create all tables and seed the vocabularies (idempotent)
///
/// With `drop_existing`, every table is dropped first so the load starts
/// from an empty database.
pub async fn create_schema(pool: &SqlitePool, drop_existing: bool) -> Result<()> {
    if drop_existing {
        drop_tables(pool).await?;
    }

    create_vocabulary_table(pool, "kind_type", "kind").await?;
    create_vocabulary_table(pool, "role_type", "role").await?;
    create_vocabulary_table(pool, "info_type", "info").await?;
    create_vocabulary_table(pool, "link_type", "link").await?;
    create_vocabulary_table(pool, "comp_cast_type", "kind").await?;

    create_title_table(pool).await?;
    create_name_table(pool).await?;
    create_aka_title_table(pool).await?;
    create_aka_name_table(pool).await?;
    create_cast_info_table(pool).await?;
    create_movie_info_table(pool).await?;
    create_person_info_table(pool).await?;
    create_movie_link_table(pool).await?;
    create_complete_cast_table(pool).await?;

    seed_vocabulary(pool, "kind_type", "kind", KIND_TYPES).await?;
    seed_vocabulary(pool, "role_type", "role", ROLE_TYPES).await?;
    seed_vocabulary(pool, "info_type", "info", INFO_TYPES).await?;
    seed_vocabulary(pool, "link_type", "link", LINK_TYPES).await?;
    seed_vocabulary(pool, "comp_cast_type", "kind", COMP_CAST_TYPES).await?;

    Ok(())
}

async fn drop_tables(pool: &SqlitePool) -> Result<()> {
    warn!("Dropping existing loader tables");
    for table in ALL_TABLES.iter().rev() {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_vocabulary_table(pool: &SqlitePool, table: &str, column: &str) -> Result<()> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY, {} TEXT NOT NULL UNIQUE)",
        table, column
    ))
    .execute(pool)
    .await?;

    Ok(())
}

async fn seed_vocabulary(pool: &SqlitePool, table: &str, column: &str, values: &[&str]) -> Result<()> {
    let sql = format!("INSERT OR IGNORE INTO {} (id, {}) VALUES (?, ?)", table, column);
    for (index, value) in values.iter().enumerate() {
        sqlx::query(&sql)
            .bind(index as i64 + 1)
            .bind(*value)
            .execute(pool)
            .await?;
    }
    debug!("Seeded {} with {} entries", table, values.len());
    Ok(())
}

async fn create_title_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS title (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            imdb_index TEXT,
            kind_id INTEGER NOT NULL,
            production_year INTEGER,
            phonetic_code TEXT,
            episode_of_id INTEGER,
            season_nr INTEGER,
            episode_nr INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_name_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS name (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            imdb_index TEXT,
            name_pcode_cf TEXT,
            name_pcode_nf TEXT,
            surname_pcode TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_aka_title_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS aka_title (
            id INTEGER PRIMARY KEY,
            movie_id INTEGER,
            title TEXT NOT NULL,
            imdb_index TEXT,
            kind_id INTEGER NOT NULL,
            production_year INTEGER,
            phonetic_code TEXT,
            episode_of_id INTEGER,
            season_nr INTEGER,
            episode_nr INTEGER,
            note TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_aka_name_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS aka_name (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            person_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            imdb_index TEXT,
            name_pcode_cf TEXT,
            name_pcode_nf TEXT,
            surname_pcode TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_cast_info_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cast_info (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            person_id INTEGER NOT NULL,
            movie_id INTEGER NOT NULL,
            person_role TEXT,
            note TEXT,
            nr_order INTEGER,
            role_id INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_movie_info_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movie_info (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            movie_id INTEGER NOT NULL,
            info_type_id INTEGER NOT NULL,
            info TEXT NOT NULL,
            note TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_person_info_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS person_info (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            person_id INTEGER NOT NULL,
            info_type_id INTEGER NOT NULL,
            info TEXT NOT NULL,
            note TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_movie_link_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movie_link (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            movie_id INTEGER NOT NULL,
            linked_movie_id INTEGER NOT NULL,
            link_type_id INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_complete_cast_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS complete_cast (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            movie_id INTEGER,
            subject_id INTEGER NOT NULL,
            status_id INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
