//! Surrogate id assignment for natural keys
//!
//! A [`KeyCache`] maps free text keys (titles, person names) to integer ids.
//! New keys get the next id from a monotonic counter and wait in a pending
//! list; the pending entries are written as rows when the counter reaches a
//! multiple of the flush threshold, or on an explicit [`KeyCache::flush`].
//!
//! Keys are never looked up in the database: the cache is the authority for
//! ids during a run. With `--resume` it is pre-populated from stored rows.

mod caches;
pub mod grammars;

pub use caches::KeyCaches;
pub use grammars::{AliasTitleKeys, PersonKeys, TitleKeys};

use crate::db::{Row, Store, StoreError, TableSpec, Value};
use crate::error::LoadResult;
use crate::utils::{write_with_split, FlushOutcome, SplitError};
use ptdf_common::grammar::ParseError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How the keys of one key space become rows
pub trait KeyGrammar: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    fn table(&self) -> &'static TableSpec;

    /// Key that must have an id before `key` gets one (series of an episode)
    fn parent_key<'k>(&self, _key: &'k str) -> Option<&'k str> {
        None
    }

    /// Reject keys that could never be turned into a row
    fn check(&self, key: &str) -> Result<(), ParseError>;

    fn build_row(&self, key: &str, id: i64, ctx: &RowContext<'_>) -> Result<Row, ParseError>;

    /// Keys (with their ids) of previously stored rows
    fn keys_from_rows(&self, rows: &[Row]) -> Vec<(String, i64)>;
}

/// What a grammar may consult while building a row
pub struct RowContext<'a> {
    ids: &'a HashMap<String, i64>,
    aux: &'a [(&'static str, Value)],
}

impl<'a> RowContext<'a> {
    /// Id already assigned to another key of the same cache
    pub fn id_of(&self, key: &str) -> Option<i64> {
        self.ids.get(key).copied()
    }

    /// Side-map value recorded when this entry was assigned
    pub fn aux(&self, name: &str) -> Option<&'a Value> {
        self.aux
            .iter()
            .find(|(aux_name, _)| *aux_name == name)
            .map(|(_, value)| value)
    }
}

/// Counters of one cache over the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub assigned: u64,
    pub written: u64,
    pub dropped: u64,
    pub invalid: u64,
    pub flushes: u64,
    pub splits: u64,
}

pub struct KeyCache<G: KeyGrammar> {
    grammar: G,
    store: Arc<dyn Store>,
    ids: HashMap<String, i64>,
    /// Assigned but not yet written, in assignment order
    pending: Vec<(String, i64)>,
    aux: HashMap<i64, Vec<(&'static str, Value)>>,
    counter: i64,
    flush_every: i64,
    max_split_depth: u32,
    stats: CacheStats,
}

impl<G: KeyGrammar> KeyCache<G> {
    pub fn new(
        grammar: G,
        store: Arc<dyn Store>,
        counter_init: i64,
        flush_every: u64,
        max_split_depth: u32,
    ) -> Self {
        Self {
            grammar,
            store,
            ids: HashMap::new(),
            pending: Vec::new(),
            aux: HashMap::new(),
            counter: counter_init.max(1),
            flush_every: i64::try_from(flush_every).unwrap_or(i64::MAX).max(1),
            max_split_depth,
            stats: CacheStats::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.grammar.name()
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.ids.get(key).copied()
    }

    /// Keys with an id, written or not
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Id the next new key will get
    pub fn next_id(&self) -> i64 {
        self.counter
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Whether one of the next `assignments` new ids triggers a flush
    pub fn flush_due_within(&self, assignments: i64) -> bool {
        (0..assignments).any(|offset| (self.counter + offset) % self.flush_every == 0)
    }

    /// Id of `key`, assigning a new one when the key is unknown
    pub async fn resolve(&mut self, key: &str) -> LoadResult<i64> {
        self.resolve_with_aux(key, Vec::new()).await
    }

    /// Like [`resolve`](Self::resolve); `aux` is kept with a newly assigned
    /// entry and merged into its row at flush time
    pub async fn resolve_with_aux(&mut self, key: &str, aux: Vec<(&'static str, Value)>) -> LoadResult<i64> {
        if let Some(&id) = self.ids.get(key) {
            return Ok(id);
        }
        self.grammar.check(key)?;
        self.resolve_parent(key).await?;
        self.assign_new(key, aux).await
    }

    /// Always assign a new id, even for a known key
    pub async fn assign(&mut self, key: &str, aux: Vec<(&'static str, Value)>) -> LoadResult<i64> {
        self.grammar.check(key)?;
        self.resolve_parent(key).await?;
        self.assign_new(key, aux).await
    }

    async fn resolve_parent(&mut self, key: &str) -> LoadResult<()> {
        if let Some(parent) = self.grammar.parent_key(key) {
            if !self.ids.contains_key(parent) {
                self.grammar.check(parent)?;
                let parent = parent.to_string();
                self.assign_new(&parent, Vec::new()).await?;
            }
        }
        Ok(())
    }

    async fn assign_new(&mut self, key: &str, aux: Vec<(&'static str, Value)>) -> LoadResult<i64> {
        if self.counter % self.flush_every == 0 {
            self.flush().await?;
        }

        let id = self.counter;
        self.counter += 1;
        self.ids.insert(key.to_string(), id);
        self.pending.push((key.to_string(), id));
        if !aux.is_empty() {
            self.aux.insert(id, aux);
        }
        self.stats.assigned += 1;
        Ok(id)
    }

    /// Write every pending entry
    ///
    /// Pending entries are only discarded once the store accepted them (or
    /// the split retry gave up on them). On a backend error the entries
    /// behind the rows already committed stay pending, so a later flush
    /// never writes a row twice.
    pub async fn flush(&mut self) -> Result<FlushOutcome, StoreError> {
        if self.pending.is_empty() {
            return Ok(FlushOutcome::default());
        }

        let mut rows = Vec::with_capacity(self.pending.len());
        // Pending position of every built row
        let mut positions = Vec::with_capacity(self.pending.len());
        for (position, (key, id)) in self.pending.iter().enumerate() {
            let ctx = RowContext {
                ids: &self.ids,
                aux: self.aux.get(id).map_or(&[], Vec::as_slice),
            };
            match self.grammar.build_row(key, *id, &ctx) {
                Ok(row) => {
                    rows.push(row);
                    positions.push(position);
                }
                Err(e) => {
                    warn!(cache = self.grammar.name(), key = %key, error = %e, "Key not written");
                    self.stats.invalid += 1;
                }
            }
        }

        debug!(cache = self.grammar.name(), rows = rows.len(), "Flushing key cache");
        let result = write_with_split(self.store.as_ref(), self.grammar.table(), &rows, 1, self.max_split_depth).await;
        let (outcome, failure) = match result {
            Ok(outcome) => (outcome, None),
            Err(SplitError { partial, source }) => (partial, Some(source)),
        };

        let done = positions.get(outcome.handled()).copied().unwrap_or(self.pending.len());
        for (_, id) in self.pending.drain(..done) {
            self.aux.remove(&id);
        }

        self.stats.written += outcome.written as u64;
        self.stats.dropped += outcome.dropped as u64;
        self.stats.splits += outcome.splits as u64;

        if let Some(e) = failure {
            warn!(
                cache = self.grammar.name(),
                written = outcome.written,
                pending = self.pending.len(),
                error = %e,
                "Key cache flush failed"
            );
            return Err(e);
        }
        self.stats.flushes += 1;

        info!(
            cache = self.grammar.name(),
            keys = done,
            written = outcome.written,
            dropped = outcome.dropped,
            next_id = self.counter,
            "Key cache flushed"
        );
        Ok(outcome)
    }

    /// Load the keys of stored rows and continue numbering after them
    pub async fn populate(&mut self) -> Result<usize, StoreError> {
        let rows = self.store.read_rows(self.grammar.table()).await?;
        let keys = self.grammar.keys_from_rows(&rows);

        let mut max_id = self.counter - 1;
        for (key, id) in &keys {
            max_id = max_id.max(*id);
            self.ids.insert(key.clone(), *id);
        }
        // Rows without a decodable key still hold their id
        for row in &rows {
            if let Some(id) = row.first().and_then(Value::as_int) {
                max_id = max_id.max(id);
            }
        }
        self.counter = max_id + 1;

        info!(
            cache = self.grammar.name(),
            keys = keys.len(),
            next_id = self.counter,
            "Key cache populated from store"
        );
        Ok(keys.len())
    }

    /// Forget every key (ids are not reused); pending entries are kept
    pub fn clear(&mut self) {
        self.ids.clear();
        let pending: HashSet<i64> = self.pending.iter().map(|(_, id)| *id).collect();
        self.aux.retain(|id, _| pending.contains(id));
    }
}
