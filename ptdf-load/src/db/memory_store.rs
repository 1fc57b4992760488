//! In-memory store
//!
//! Used for `--dry-run` (counting only) and by tests, which can make it
//! reject batches above a size or fail on chosen tables.

use super::{Row, Store, StoreError, TableSpec};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// One accepted batch, in commit order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub table: &'static str,
    /// Index of the first row of the batch within its table
    pub offset: usize,
    pub rows: usize,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<&'static str, Vec<Row>>,
    counts: HashMap<&'static str, usize>,
    journal: Vec<Commit>,
    attempts: Vec<(&'static str, usize)>,
    failing_tables: HashSet<String>,
    /// Batches still let through before `error` is returned
    fail_after: Option<(usize, StoreError)>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    overflow_above: Option<usize>,
    counting_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that keeps row counts but not rows
    pub fn counting() -> Self {
        Self {
            counting_only: true,
            ..Self::default()
        }
    }

    /// Reject batches larger than `limit` rows with an overflow error
    pub fn with_overflow_limit(mut self, limit: usize) -> Self {
        self.overflow_above = Some(limit);
        self
    }

    /// Reject every batch for `table` with a backend error
    pub fn fail_table(&self, table: &str) {
        self.lock().failing_tables.insert(table.to_string());
    }

    /// Reject the next batch, whatever its table, with `error`
    pub fn fail_next(&self, error: StoreError) {
        self.fail_after(0, error);
    }

    /// Let `batches` more batches through, then reject one with `error`
    pub fn fail_after(&self, batches: usize, error: StoreError) {
        self.lock().fail_after = Some((batches, error));
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.lock().counts.get(table).copied().unwrap_or(0)
    }

    /// Sizes of the accepted batches for `table`, in commit order
    pub fn batch_sizes(&self, table: &str) -> Vec<usize> {
        self.lock()
            .journal
            .iter()
            .filter(|commit| commit.table == table)
            .map(|commit| commit.rows)
            .collect()
    }

    /// Sizes of every batch offered for `table`, accepted or not
    pub fn attempts(&self, table: &str) -> Vec<usize> {
        self.lock()
            .attempts
            .iter()
            .filter(|(name, _)| *name == table)
            .map(|(_, rows)| *rows)
            .collect()
    }

    pub fn journal(&self) -> Vec<Commit> {
        self.lock().journal.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn bulk_insert(&self, table: &TableSpec, rows: &[Row]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.attempts.push((table.name, rows.len()));

        match inner.fail_after.take() {
            Some((0, error)) => return Err(error),
            Some((remaining, error)) => inner.fail_after = Some((remaining - 1, error)),
            None => {}
        }
        if inner.failing_tables.contains(table.name) {
            return Err(StoreError::Backend(format!("{} is not writable", table.name)));
        }
        if let Some(limit) = self.overflow_above {
            if rows.len() > limit {
                return Err(StoreError::Overflow {
                    rows: rows.len(),
                    reason: format!("limit is {} rows", limit),
                });
            }
        }
        if let Some(row) = rows.iter().find(|row| row.len() != table.width()) {
            return Err(StoreError::Backend(format!(
                "{} row has {} values, expected {}",
                table.name,
                row.len(),
                table.width()
            )));
        }

        let count = inner.counts.entry(table.name).or_insert(0);
        let offset = *count;
        *count += rows.len();

        if !self.counting_only {
            inner
                .tables
                .entry(table.name)
                .or_default()
                .extend(rows.iter().cloned());
        }

        inner.journal.push(Commit {
            table: table.name,
            offset,
            rows: rows.len(),
        });
        Ok(())
    }

    async fn read_rows(&self, table: &TableSpec) -> Result<Vec<Row>, StoreError> {
        Ok(self.rows(table.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tables::MOVIE_LINK;
    use crate::db::Value;

    fn link(movie: i64) -> Row {
        vec![Value::Int(movie), Value::Int(movie + 1), Value::Int(1)]
    }

    #[tokio::test]
    async fn test_overflow_limit_rejects_whole_batch() {
        let store = MemoryStore::new().with_overflow_limit(2);
        let rows = vec![link(1), link(2), link(3)];

        let err = store.bulk_insert(&MOVIE_LINK, &rows).await.unwrap_err();
        assert!(err.is_overflow());
        assert_eq!(store.row_count("movie_link"), 0);

        store.bulk_insert(&MOVIE_LINK, &rows[..2]).await.unwrap();
        assert_eq!(store.row_count("movie_link"), 2);
        assert_eq!(store.attempts("movie_link"), vec![3, 2]);
        assert_eq!(store.batch_sizes("movie_link"), vec![2]);
    }

    #[tokio::test]
    async fn test_counting_store_keeps_no_rows() {
        let store = MemoryStore::counting();
        store.bulk_insert(&MOVIE_LINK, &[link(1)]).await.unwrap();
        assert_eq!(store.row_count("movie_link"), 1);
        assert!(store.rows("movie_link").is_empty());
    }

    #[tokio::test]
    async fn test_wrong_width_is_a_backend_error() {
        let store = MemoryStore::new();
        let err = store
            .bulk_insert(&MOVIE_LINK, &[vec![Value::Int(1)]])
            .await
            .unwrap_err();
        assert!(!err.is_overflow());
    }
}
