//! Test Helper Utilities
//!
//! Data file fixtures and store inspection shared by the integration tests.

#![allow(dead_code)]

pub mod fixtures;

use flate2::write::GzEncoder;
use flate2::Compression;
use ptdf_load::db::{MemoryStore, Row, Value};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// Write `content` gzip compressed to `dir/file`
pub fn write_gz(dir: &Path, file: &str, content: &str) {
    let path = dir.join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

/// Temporary data directory holding `files`
pub fn data_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (file, content) in files {
        write_gz(dir.path(), file, content);
    }
    dir
}

/// Integer column `column` of every row
pub fn column(rows: &[Row], column: usize) -> Vec<i64> {
    rows.iter().filter_map(|row| row[column].as_int()).collect()
}

/// Columns of each table that hold title or person ids
fn references(table: &str) -> (&'static [usize], &'static [usize]) {
    match table {
        "cast_info" => (&[1], &[0]),
        "movie_link" => (&[0, 1], &[]),
        "movie_info" | "complete_cast" => (&[0], &[]),
        "person_info" | "aka_name" => (&[], &[0]),
        "aka_title" => (&[1], &[]),
        "title" => (&[6], &[]),
        _ => (&[], &[]),
    }
}

/// Every title or person id a committed row carries was written in the
/// same batch or an earlier one
pub fn assert_referential_safety(store: &MemoryStore) {
    let mut titles: HashSet<i64> = HashSet::new();
    let mut persons: HashSet<i64> = HashSet::new();

    for commit in store.journal() {
        let rows = store.rows(commit.table);
        let batch = &rows[commit.offset..commit.offset + commit.rows];

        match commit.table {
            "title" => titles.extend(column(batch, 0)),
            "name" => persons.extend(column(batch, 0)),
            _ => {}
        }

        let (title_columns, person_columns) = references(commit.table);
        for row in batch {
            for &at in title_columns {
                if let Value::Int(id) = row[at] {
                    assert!(titles.contains(&id), "{} row {:?} points at unwritten title {}", commit.table, row, id);
                }
            }
            for &at in person_columns {
                if let Value::Int(id) = row[at] {
                    assert!(persons.contains(&id), "{} row {:?} points at unwritten person {}", commit.table, row, id);
                }
            }
        }
    }
}
