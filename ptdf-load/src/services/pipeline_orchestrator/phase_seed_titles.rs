//! Phase 1: SEED TITLES
//!
//! Every title of the movies list gets its id before any fact is read.
//! Episode lines carry their own year column, which overrides the series
//! year in the episode key.

use super::{next_line, recoverable, Phase, PhaseStats, PipelineOrchestrator};
use crate::db::Value;
use crate::error::{LoadError, LoadResult};
use crate::parsers::lines::parse_movie_line;
use crate::services::key_cache::grammars::EPISODE_YEAR;
use crate::sources::MOVIES;
use tokio_util::sync::CancellationToken;

impl PipelineOrchestrator {
    pub(super) async fn phase_seed_titles(&mut self, cancel: &CancellationToken) -> LoadResult<PhaseStats> {
        const PHASE: Phase = Phase::SeedTitles;
        let mut stats = PhaseStats::default();
        let before = self.caches.titles.stats();

        let Some(mut stream) = self.open_source(PHASE, &MOVIES, &mut stats) else {
            return Ok(stats);
        };

        while let Some(line) = next_line(&mut stream, PHASE) {
            if cancel.is_cancelled() {
                tracing::info!(phase = %PHASE, records = stats.records_scanned, "Interrupted");
                return Ok(stats);
            }
            if line.trim().is_empty() {
                continue;
            }

            self.tick(PHASE, &mut stats, &line);

            let Some(movie) = recoverable(parse_movie_line(&line).map_err(LoadError::from), PHASE, &mut stats, &line)? else {
                continue;
            };

            let resolved = match movie.episode_year() {
                Some(year) => {
                    let aux = vec![(EPISODE_YEAR, Value::Text(year.to_string()))];
                    self.caches.titles.resolve_with_aux(&movie.title, aux).await
                }
                None => self.caches.titles.resolve(&movie.title).await,
            };
            recoverable(resolved, PHASE, &mut stats, &line)?;
        }

        self.caches.titles.flush().await?;
        stats.add_cache_delta(&before, &self.caches.titles.stats());
        Ok(stats)
    }
}
