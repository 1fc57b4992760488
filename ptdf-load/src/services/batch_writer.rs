//! Buffered writer for fact rows
//!
//! Rows are buffered under a slot counter and written as one bulk insert
//! when the counter reaches a multiple of the flush threshold. Before any
//! fact row is written the title and person caches are flushed, so every
//! subject id a fact row carries already exists in the store.

use crate::db::{Row, Store, StoreError, TableSpec};
use crate::services::key_cache::KeyCaches;
use crate::utils::{write_with_split, FlushOutcome, SplitError};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub queued: u64,
    pub written: u64,
    pub dropped: u64,
    pub flushes: u64,
    pub splits: u64,
}

pub struct BatchWriter {
    table: &'static TableSpec,
    store: Arc<dyn Store>,
    rows: Vec<Row>,
    /// Slot of the next row; back to 1 after every flush
    counter: u64,
    flush_every: u64,
    max_split_depth: u32,
    stats: WriterStats,
}

impl BatchWriter {
    pub fn new(table: &'static TableSpec, store: Arc<dyn Store>, flush_every: u64, max_split_depth: u32) -> Self {
        Self {
            table,
            store,
            rows: Vec::new(),
            counter: 1,
            flush_every: flush_every.max(1),
            max_split_depth,
            stats: WriterStats::default(),
        }
    }

    pub fn table(&self) -> &'static TableSpec {
        self.table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Current threshold; lowered after a flush had to split
    pub fn flush_every(&self) -> u64 {
        self.flush_every
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    /// Queue one row, flushing first when the threshold is reached
    pub async fn add(&mut self, row: Row, caches: &mut KeyCaches) -> Result<(), StoreError> {
        if self.counter % self.flush_every == 0 {
            self.flush(caches).await?;
        }
        self.rows.push(row);
        self.counter += 1;
        self.stats.queued += 1;
        Ok(())
    }

    /// Write every buffered row after the caches the rows point into
    pub async fn flush(&mut self, caches: &mut KeyCaches) -> Result<FlushOutcome, StoreError> {
        if self.rows.is_empty() {
            return Ok(FlushOutcome::default());
        }

        caches.flush_referenced().await?;

        debug!(table = self.table.name, rows = self.rows.len(), "Flushing fact rows");
        let result = write_with_split(self.store.as_ref(), self.table, &self.rows, 1, self.max_split_depth).await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(SplitError { partial, source }) => {
                // Committed halves leave the buffer; the rest stays queued
                self.rows.drain(..partial.handled());
                self.record(&partial);
                warn!(
                    table = self.table.name,
                    written = partial.written,
                    queued = self.rows.len(),
                    error = %source,
                    "Fact flush failed"
                );
                return Err(source);
            }
        };

        self.rows.clear();
        self.counter = 1;
        self.stats.flushes += 1;
        self.record(&outcome);

        if outcome.split_depth > 0 {
            let lowered = (self.flush_every >> outcome.split_depth).max(1);
            info!(
                table = self.table.name,
                from = self.flush_every,
                to = lowered,
                "Lowering flush threshold after split"
            );
            self.flush_every = lowered;
        }

        info!(
            table = self.table.name,
            written = outcome.written,
            dropped = outcome.dropped,
            batches = outcome.batches,
            "Fact rows flushed"
        );
        Ok(outcome)
    }

    fn record(&mut self, outcome: &FlushOutcome) {
        self.stats.written += outcome.written as u64;
        self.stats.dropped += outcome.dropped as u64;
        self.stats.splits += outcome.splits as u64;
    }

    /// Discard buffered rows; returns how many were lost
    pub fn discard(&mut self) -> usize {
        let lost = self.rows.len();
        self.rows.clear();
        self.counter = 1;
        lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tables::MOVIE_LINK;
    use crate::db::{MemoryStore, Value};
    use ptdf_common::config::LoaderConfig;

    fn link(movie: i64) -> Row {
        vec![Value::Int(movie), Value::Int(movie + 1), Value::Int(1)]
    }

    fn caches(store: Arc<dyn Store>) -> KeyCaches {
        KeyCaches::new(store, &LoaderConfig::default())
    }

    #[tokio::test]
    async fn test_threshold_triggers_flush() {
        let store = Arc::new(MemoryStore::new());
        let mut caches = caches(store.clone());
        let mut writer = BatchWriter::new(&MOVIE_LINK, store.clone(), 4, 5);

        for movie in 0..10 {
            writer.add(link(movie), &mut caches).await.unwrap();
        }
        assert_eq!(store.batch_sizes("movie_link"), vec![3, 3, 3]);
        assert_eq!(writer.len(), 1);

        writer.flush(&mut caches).await.unwrap();
        assert_eq!(store.row_count("movie_link"), 10);
        assert!(writer.is_empty());
    }

    #[tokio::test]
    async fn test_thirty_thousand_rows_split_twice() {
        let store = Arc::new(MemoryStore::new().with_overflow_limit(10_000));
        let mut caches = caches(store.clone());
        let mut writer = BatchWriter::new(&MOVIE_LINK, store.clone(), 30_001, 5);

        for movie in 0..30_000 {
            writer.add(link(movie), &mut caches).await.unwrap();
        }
        let outcome = writer.flush(&mut caches).await.unwrap();

        assert_eq!(outcome.written, 30_000);
        assert_eq!(store.batch_sizes("movie_link"), vec![7_500; 4]);
        assert_eq!(writer.flush_every(), 30_001 >> 2);
    }

    #[tokio::test]
    async fn test_caches_flush_before_facts() {
        let store = Arc::new(MemoryStore::new());
        let mut caches = caches(store.clone());
        let mut writer = BatchWriter::new(&MOVIE_LINK, store.clone(), 100, 5);

        let movie = caches.titles.resolve("Film (2000)").await.unwrap();
        let linked = caches.titles.resolve("Film (2001)").await.unwrap();
        writer
            .add(vec![Value::Int(movie), Value::Int(linked), Value::Int(1)], &mut caches)
            .await
            .unwrap();
        writer.flush(&mut caches).await.unwrap();

        let tables: Vec<&str> = store.journal().iter().map(|commit| commit.table).collect();
        assert_eq!(tables, vec!["title", "movie_link"]);
    }

    #[tokio::test]
    async fn test_backend_error_keeps_rows() {
        let store = Arc::new(MemoryStore::new());
        let mut caches = caches(store.clone());
        let mut writer = BatchWriter::new(&MOVIE_LINK, store.clone(), 100, 5);
        writer.add(link(1), &mut caches).await.unwrap();

        store.fail_next(StoreError::Backend("locked".to_string()));
        assert!(writer.flush(&mut caches).await.is_err());
        assert_eq!(writer.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_split_flush_requeues_only_unwritten_rows() {
        let store = Arc::new(MemoryStore::new().with_overflow_limit(2));
        let mut caches = caches(store.clone());
        let mut writer = BatchWriter::new(&MOVIE_LINK, store.clone(), 100, 5);
        for movie in 0..4 {
            writer.add(link(movie), &mut caches).await.unwrap();
        }

        store.fail_after(2, StoreError::Backend("locked".to_string()));
        assert!(writer.flush(&mut caches).await.is_err());
        assert_eq!(writer.len(), 2);

        writer.flush(&mut caches).await.unwrap();
        let movies: Vec<i64> = store
            .rows("movie_link")
            .iter()
            .filter_map(|row| row[0].as_int())
            .collect();
        assert_eq!(movies, vec![0, 1, 2, 3]);
    }
}
