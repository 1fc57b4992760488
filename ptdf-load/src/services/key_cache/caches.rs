//! The key caches of one run and the order they flush in

use super::grammars::{ALIAS_MOVIE_ID, ALIAS_NOTE};
use super::{AliasTitleKeys, KeyCache, PersonKeys, TitleKeys};
use crate::db::{Store, StoreError, Value};
use crate::error::LoadResult;
use crate::utils::FlushOutcome;
use ptdf_common::config::LoaderConfig;
use std::sync::Arc;

/// Title, person and alias title caches
///
/// Facts reference title and person ids, and alias titles reference title
/// ids, so the referenced caches are always flushed before whatever refers
/// to them.
pub struct KeyCaches {
    pub titles: KeyCache<TitleKeys>,
    pub persons: KeyCache<PersonKeys>,
    pub alias_titles: KeyCache<AliasTitleKeys>,
}

impl KeyCaches {
    pub fn new(store: Arc<dyn Store>, config: &LoaderConfig) -> Self {
        Self {
            titles: KeyCache::new(
                TitleKeys,
                store.clone(),
                config.title_id_offset,
                config.title_flush_every,
                config.max_split_depth,
            ),
            persons: KeyCache::new(
                PersonKeys,
                store.clone(),
                config.person_id_offset,
                config.person_flush_every,
                config.max_split_depth,
            ),
            alias_titles: KeyCache::new(AliasTitleKeys, store, 1, config.title_flush_every, config.max_split_depth),
        }
    }

    /// Flush the caches fact rows may point into
    pub async fn flush_referenced(&mut self) -> Result<FlushOutcome, StoreError> {
        let mut outcome = self.titles.flush().await?;
        outcome += self.persons.flush().await?;
        Ok(outcome)
    }

    /// Flush alias titles together with the titles they point at
    pub async fn flush_alias_titles(&mut self) -> Result<FlushOutcome, StoreError> {
        let mut outcome = self.titles.flush().await?;
        outcome += self.alias_titles.flush().await?;
        Ok(outcome)
    }

    /// Give an alias title occurrence its own row
    ///
    /// An alias of an episode may also bring in its series alias, so up to
    /// two entries are assigned; when that crosses the alias threshold the
    /// titles go first.
    pub async fn assign_alias_title(&mut self, key: &str, movie_id: i64, note: Option<String>) -> LoadResult<i64> {
        if self.alias_titles.flush_due_within(2) {
            self.titles.flush().await?;
        }
        let mut aux = vec![(ALIAS_MOVIE_ID, Value::Int(movie_id))];
        if let Some(note) = note {
            aux.push((ALIAS_NOTE, Value::Text(note)));
        }
        self.alias_titles.assign(key, aux).await
    }

    /// Id of the alias of a series, recorded against `movie_id` when new
    pub async fn resolve_alias_title(&mut self, key: &str, movie_id: i64) -> LoadResult<i64> {
        if self.alias_titles.get(key).is_none() && self.alias_titles.flush_due_within(1) {
            self.titles.flush().await?;
        }
        self.alias_titles
            .resolve_with_aux(key, vec![(ALIAS_MOVIE_ID, Value::Int(movie_id))])
            .await
    }

    /// Pre-populate every cache from the store
    pub async fn populate(&mut self) -> Result<(), StoreError> {
        self.titles.populate().await?;
        self.persons.populate().await?;
        self.alias_titles.populate().await?;
        Ok(())
    }

    pub fn pending_len(&self) -> usize {
        self.titles.pending_len() + self.persons.pending_len() + self.alias_titles.pending_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn config(flush_every: u64) -> LoaderConfig {
        LoaderConfig {
            title_flush_every: flush_every,
            person_flush_every: flush_every,
            ..LoaderConfig::default()
        }
    }

    #[tokio::test]
    async fn test_alias_flush_writes_titles_first() {
        let store = Arc::new(MemoryStore::new());
        let mut caches = KeyCaches::new(store.clone(), &config(3));

        for year in 2000..2006 {
            let movie_id = caches.titles.resolve(&format!("Film ({})", year)).await.unwrap();
            caches
                .assign_alias_title(&format!("Filme ({})", year), movie_id, None)
                .await
                .unwrap();
        }
        caches.flush_alias_titles().await.unwrap();

        let journal = store.journal();
        let first_alias = journal.iter().position(|c| c.table == "aka_title").unwrap();
        let titles_before: usize = journal[..first_alias]
            .iter()
            .filter(|c| c.table == "title")
            .map(|c| c.rows)
            .sum();
        // every alias in the first alias batch points at a written title
        let alias_rows = store.rows("aka_title");
        for row in &alias_rows[..journal[first_alias].rows] {
            assert!(row[1].as_int().unwrap() <= titles_before as i64);
        }
        assert_eq!(store.row_count("aka_title"), 6);
        assert_eq!(store.row_count("title"), 6);
    }

    #[tokio::test]
    async fn test_alias_occurrences_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());
        let mut caches = KeyCaches::new(store.clone(), &config(100));

        let first = caches.assign_alias_title("Rote Zora (1978)", 1, None).await.unwrap();
        let second = caches
            .assign_alias_title("Rote Zora (1978)", 2, Some("(Germany)".to_string()))
            .await
            .unwrap();
        assert_ne!(first, second);

        caches.flush_alias_titles().await.unwrap();
        let rows = store.rows("aka_title");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], Value::Int(2));
        assert_eq!(rows[1][10], Value::Text("(Germany)".to_string()));
    }
}
