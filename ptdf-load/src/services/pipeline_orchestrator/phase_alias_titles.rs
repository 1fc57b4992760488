//! Phase 4: ALIAS TITLES
//!
//! Alternative titles from the international alias lists. Every alias line
//! gets its own `aka_title` row through the alias title cache, pointing at
//! the id of its original title.

use super::{next_line, recoverable, Phase, PhaseStats, PipelineOrchestrator};
use crate::error::{LoadError, LoadResult};
use crate::parsers::aliases::{parse_alias_title_line, with_note_suffix, AliasLine};
use crate::sources::AKA_TITLES;
use ptdf_common::grammar::series_key;
use tokio_util::sync::CancellationToken;

/// Original title the following alias lines belong to
struct Original {
    key: String,
    id: i64,
}

impl PipelineOrchestrator {
    pub(super) async fn phase_alias_titles(&mut self, cancel: &CancellationToken) -> LoadResult<PhaseStats> {
        const PHASE: Phase = Phase::AliasTitles;
        let mut stats = PhaseStats::default();
        let before = self.caches.alias_titles.stats();

        for (spec, note_suffix) in AKA_TITLES {
            if cancel.is_cancelled() {
                break;
            }
            let Some(mut stream) = self.open_source(PHASE, spec, &mut stats) else {
                continue;
            };
            let mut original: Option<Original> = None;

            while let Some(line) = next_line(&mut stream, PHASE) {
                if cancel.is_cancelled() {
                    break;
                }

                match recoverable(parse_alias_title_line(&line).map_err(LoadError::from), PHASE, &mut stats, &line)? {
                    None | Some(AliasLine::Blank) => {}
                    Some(AliasLine::Original(key)) => {
                        self.tick(PHASE, &mut stats, &key);
                        let resolved = self.caches.titles.resolve(&key).await;
                        original = recoverable(resolved, PHASE, &mut stats, &line)?.map(|id| Original { key, id });
                    }
                    Some(AliasLine::Alias { key, note }) => {
                        let Some(original) = &original else {
                            continue;
                        };
                        let note = with_note_suffix(note, *note_suffix);
                        let assigned = self.assign_alias(original, &key, note).await;
                        recoverable(assigned, PHASE, &mut stats, &line)?;
                    }
                }
            }
        }

        if !cancel.is_cancelled() {
            self.caches.flush_alias_titles().await?;
            // Nothing after this phase looks alias titles up
            self.caches.alias_titles.clear();
        }
        stats.add_cache_delta(&before, &self.caches.alias_titles.stats());
        Ok(stats)
    }

    /// Assign an alias row for `alias` of `original`
    ///
    /// The alias of an episode needs an alias of its series; when the
    /// original is an episode too, that series alias points at the
    /// original's series. Otherwise it is recorded without a title.
    async fn assign_alias(&mut self, original: &Original, alias: &str, note: Option<String>) -> LoadResult<i64> {
        if let (Some(alias_series), Some(original_series)) = (series_key(alias), series_key(&original.key)) {
            let series_id = self.caches.titles.resolve(original_series).await?;
            self.caches.resolve_alias_title(alias_series, series_id).await?;
        }
        self.caches.assign_alias_title(alias, original.id, note).await
    }
}
