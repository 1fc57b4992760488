//! Load pipeline orchestrator
//!
//! Runs the load phases strictly in order. Phases that produce ids run
//! before the phases that reference them, and every phase flushes its fact
//! writers (and through them the key caches) before the next one starts.
//!
//! # Phases
//! SEED TITLES → ROLE FACTS → ALIAS NAMES → ALIAS TITLES → FREE TEXT FACTS →
//! LINK FACTS → SINGLE LINE FACTS → RATING FACTS → TAGLINE FACTS →
//! TOP/BOTTOM RATING FACTS → COMPLETE CAST FACTS → FINAL FLUSH
//!
//! Each phase lives in its own `phase_*` module.
//!
//! # Failures
//! - Missing data file: the file is skipped
//! - Record that does not parse: the record is skipped
//! - Batch too large: split and retried, see [`crate::utils::split_retry`]
//! - Any other store error: the run stops
//! - Interrupt: the current phase stops and the key caches are drained

use crate::db::{Row, Store, TableSpec};
use crate::error::{LoadError, LoadResult};
use crate::services::batch_writer::BatchWriter;
use crate::services::key_cache::KeyCaches;
use crate::services::section_stream::LineStream;
use crate::services::shutdown::{ShutdownGuard, ShutdownMode};
use crate::sources::SourceSpec;
use chrono::{DateTime, Utc};
use ptdf_common::config::LoaderConfig;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

mod phase_alias_names;
mod phase_alias_titles;
mod phase_complete_cast;
mod phase_final_flush;
mod phase_free_text;
mod phase_link_facts;
mod phase_ratings;
mod phase_role_facts;
mod phase_seed_titles;
mod phase_single_line;
mod phase_taglines;
pub mod statistics;

pub use statistics::{PhaseStats, RunStatistics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    SeedTitles,
    RoleFacts,
    AliasNames,
    AliasTitles,
    FreeTextFacts,
    LinkFacts,
    SingleLineFacts,
    RatingFacts,
    TaglineFacts,
    TopBottomRatingFacts,
    CompleteCastFacts,
    FinalFlush,
}

impl Phase {
    /// Execution order
    pub const ORDER: [Phase; 12] = [
        Phase::SeedTitles,
        Phase::RoleFacts,
        Phase::AliasNames,
        Phase::AliasTitles,
        Phase::FreeTextFacts,
        Phase::LinkFacts,
        Phase::SingleLineFacts,
        Phase::RatingFacts,
        Phase::TaglineFacts,
        Phase::TopBottomRatingFacts,
        Phase::CompleteCastFacts,
        Phase::FinalFlush,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::SeedTitles => "seed-titles",
            Phase::RoleFacts => "role-facts",
            Phase::AliasNames => "alias-names",
            Phase::AliasTitles => "alias-titles",
            Phase::FreeTextFacts => "free-text-facts",
            Phase::LinkFacts => "link-facts",
            Phase::SingleLineFacts => "single-line-facts",
            Phase::RatingFacts => "rating-facts",
            Phase::TaglineFacts => "tagline-facts",
            Phase::TopBottomRatingFacts => "top-bottom-rating-facts",
            Phase::CompleteCastFacts => "complete-cast-facts",
            Phase::FinalFlush => "final-flush",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ORDER
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Phase::ORDER.iter().map(|phase| phase.as_str()).collect();
                format!("unknown phase '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Interrupted,
}

pub struct PipelineOrchestrator {
    store: Arc<dyn Store>,
    data_dir: PathBuf,
    config: LoaderConfig,
    caches: KeyCaches,
    shutdown: ShutdownGuard,
    phases: Vec<Phase>,
    statistics: RunStatistics,
    run_id: Uuid,
}

impl PipelineOrchestrator {
    pub fn new(store: Arc<dyn Store>, data_dir: impl Into<PathBuf>, config: LoaderConfig) -> Self {
        let caches = KeyCaches::new(store.clone(), &config);
        Self {
            store,
            data_dir: data_dir.into(),
            config,
            caches,
            shutdown: ShutdownGuard::new(),
            phases: Phase::ORDER.to_vec(),
            statistics: RunStatistics::default(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Run only `phases` (still in execution order); empty means all
    pub fn with_phases(mut self, phases: &[Phase]) -> Self {
        if !phases.is_empty() {
            self.phases = Phase::ORDER
                .into_iter()
                .filter(|phase| phases.contains(phase))
                .collect();
        }
        self
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }

    pub fn caches(&self) -> &KeyCaches {
        &self.caches
    }

    /// Execute the selected phases
    ///
    /// Returns [`RunOutcome::Interrupted`] when `cancel` fired; the key
    /// caches have been drained in both cases. A store error other than an
    /// overflow ends the run with an error.
    pub async fn run(&mut self, cancel: CancellationToken) -> LoadResult<RunOutcome> {
        let started_at: DateTime<Utc> = Utc::now();
        tracing::info!(
            run_id = %self.run_id,
            data_dir = %self.data_dir.display(),
            phases = self.phases.len(),
            "Starting load"
        );

        if self.config.resume {
            self.caches.populate().await?;
        }

        for phase in self.phases.clone() {
            if cancel.is_cancelled() {
                break;
            }

            tracing::info!(run_id = %self.run_id, phase = %phase, "Phase started");
            let stats = match phase {
                Phase::SeedTitles => self.phase_seed_titles(&cancel).await?,
                Phase::RoleFacts => self.phase_role_facts(&cancel).await?,
                Phase::AliasNames => self.phase_alias_names(&cancel).await?,
                Phase::AliasTitles => self.phase_alias_titles(&cancel).await?,
                Phase::FreeTextFacts => self.phase_free_text(&cancel).await?,
                Phase::LinkFacts => self.phase_link_facts(&cancel).await?,
                Phase::SingleLineFacts => self.phase_single_line(&cancel).await?,
                Phase::RatingFacts => self.phase_ratings(&cancel).await?,
                Phase::TaglineFacts => self.phase_taglines(&cancel).await?,
                Phase::TopBottomRatingFacts => self.phase_top_bottom_ratings(&cancel).await?,
                Phase::CompleteCastFacts => self.phase_complete_cast(&cancel).await?,
                Phase::FinalFlush => self.phase_final_flush().await?,
            };

            tracing::info!(
                run_id = %self.run_id,
                phase = %phase,
                records = stats.records_scanned,
                rows = stats.rows_written,
                dropped = stats.rows_dropped,
                "Phase finished: {}",
                stats.display_string()
            );
            self.statistics.record(phase, stats);
        }

        let outcome = if cancel.is_cancelled() {
            self.shutdown.drain(&mut self.caches, ShutdownMode::Interrupted).await?;
            RunOutcome::Interrupted
        } else {
            // No-op when the final flush phase already ran
            self.shutdown.drain(&mut self.caches, ShutdownMode::Completed).await?;
            RunOutcome::Completed
        };

        self.statistics.titles = self.caches.titles.stats();
        self.statistics.persons = self.caches.persons.stats();
        self.statistics.alias_titles = self.caches.alias_titles.stats();

        let total = self.statistics.total();
        let elapsed = Utc::now().signed_duration_since(started_at);
        tracing::info!(
            run_id = %self.run_id,
            outcome = ?outcome,
            titles = self.caches.titles.len(),
            persons = self.caches.persons.len(),
            fact_rows = total.rows_written,
            dropped = self.statistics.rows_dropped(),
            elapsed_s = elapsed.num_seconds(),
            "Load finished"
        );
        if self.statistics.rows_dropped() > 0 {
            tracing::error!(
                dropped = self.statistics.rows_dropped(),
                "Rows were dropped after repeated overflow, see errors above"
            );
        }

        Ok(outcome)
    }

    /// Open a data file; `None` (counted and logged) when it is missing or
    /// unreadable
    fn open_source(&self, phase: Phase, spec: &SourceSpec, stats: &mut PhaseStats) -> Option<LineStream> {
        match LineStream::open(&self.data_dir, spec) {
            Ok(stream) => {
                stats.files_read += 1;
                tracing::debug!(phase = %phase, file = spec.file, "Reading data file");
                Some(stream)
            }
            Err(LoadError::MissingSource(path)) => {
                stats.files_skipped += 1;
                tracing::warn!(phase = %phase, file = %path.display(), "Data file not found, skipping");
                None
            }
            Err(e) => {
                stats.files_skipped += 1;
                tracing::warn!(phase = %phase, file = spec.file, error = %e, "Cannot read data file, skipping");
                None
            }
        }
    }

    fn writer(&self, table: &'static TableSpec, spec: &SourceSpec) -> BatchWriter {
        BatchWriter::new(
            table,
            self.store.clone(),
            spec.flush_every.unwrap_or(self.config.fact_flush_every),
            self.config.max_split_depth,
        )
    }

    async fn push(&mut self, writer: &mut BatchWriter, row: Row) -> LoadResult<()> {
        writer.add(row, &mut self.caches).await?;
        Ok(())
    }

    /// Flush a phase writer, or discard its rows after an interrupt
    async fn finish_writer(
        &mut self,
        phase: Phase,
        mut writer: BatchWriter,
        cancel: &CancellationToken,
        stats: &mut PhaseStats,
    ) -> LoadResult<()> {
        if cancel.is_cancelled() {
            let lost = writer.discard();
            if lost > 0 {
                tracing::warn!(
                    phase = %phase,
                    table = writer.table().name,
                    rows = lost,
                    "Interrupted, pending fact rows discarded"
                );
            }
        } else {
            writer.flush(&mut self.caches).await?;
        }
        stats.add_writer(&writer.stats());
        Ok(())
    }

    /// Count one record and log progress
    fn tick(&self, phase: Phase, stats: &mut PhaseStats, key: &str) {
        stats.records_scanned += 1;
        if stats.records_scanned % self.config.progress_every.max(1) == 0 {
            tracing::info!(phase = %phase, records = stats.records_scanned, at = %key, "Scanning");
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Unwrap a per record result: parse failures skip the record, anything
/// else ends the run
fn recoverable<T>(result: LoadResult<T>, phase: Phase, stats: &mut PhaseStats, raw: &str) -> LoadResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(LoadError::Parse(e)) => {
            stats.parse_failures += 1;
            tracing::warn!(phase = %phase, error = %e, record = %raw, "Skipping record");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Next line of a stream; a read error ends the file
fn next_line(stream: &mut LineStream, phase: Phase) -> Option<String> {
    match stream.next()? {
        Ok(line) => Some(line),
        Err(e) => {
            tracing::warn!(
                phase = %phase,
                file = %stream.path().display(),
                line = stream.lines_read(),
                error = %e,
                "Read error, skipping rest of file"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names_round_trip() {
        for phase in Phase::ORDER {
            assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
        }
        assert!("nonsense".parse::<Phase>().is_err());
    }

    #[test]
    fn test_phase_subset_keeps_execution_order() {
        let store: Arc<dyn Store> = Arc::new(crate::db::MemoryStore::new());
        let orchestrator = PipelineOrchestrator::new(store, "/tmp", LoaderConfig::default())
            .with_phases(&[Phase::FinalFlush, Phase::SeedTitles]);
        assert_eq!(orchestrator.phases, vec![Phase::SeedTitles, Phase::FinalFlush]);
    }
}
