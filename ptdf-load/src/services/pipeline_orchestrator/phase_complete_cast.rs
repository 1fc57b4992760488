//! Phase 11: COMPLETE CAST FACTS
//!
//! Coverage status of the cast and crew lists per title.

use super::{next_line, recoverable, Phase, PhaseStats, PipelineOrchestrator};
use crate::db::tables::COMPLETE_CAST;
use crate::db::Value;
use crate::error::{LoadError, LoadResult};
use crate::parsers::lines::parse_coverage_line;
use crate::sources::COMPLETE;
use ptdf_common::db::vocabulary::comp_cast_type_id;
use ptdf_common::grammar::ParseError;
use tokio_util::sync::CancellationToken;

impl PipelineOrchestrator {
    pub(super) async fn phase_complete_cast(&mut self, cancel: &CancellationToken) -> LoadResult<PhaseStats> {
        const PHASE: Phase = Phase::CompleteCastFacts;
        let mut stats = PhaseStats::default();

        for (spec, subject) in COMPLETE {
            if cancel.is_cancelled() {
                break;
            }
            let Some(subject_id) = comp_cast_type_id(subject) else {
                continue;
            };
            let Some(mut stream) = self.open_source(PHASE, spec, &mut stats) else {
                continue;
            };
            let mut writer = self.writer(&COMPLETE_CAST, spec);

            while let Some(line) = next_line(&mut stream, PHASE) {
                if cancel.is_cancelled() {
                    break;
                }
                if line.trim().is_empty() {
                    continue;
                }
                self.tick(PHASE, &mut stats, &line);

                let parsed = parse_coverage_line(&line).and_then(|coverage| {
                    let status_id = comp_cast_type_id(&coverage.status)
                        .ok_or_else(|| ParseError::InvalidRecord(line.clone()))?;
                    Ok((coverage.title, status_id))
                });
                let Some((title, status_id)) = recoverable(parsed.map_err(LoadError::from), PHASE, &mut stats, &line)? else {
                    continue;
                };
                let resolved = self.caches.titles.resolve(&title).await;
                let Some(movie_id) = recoverable(resolved, PHASE, &mut stats, &line)? else {
                    continue;
                };

                let row = vec![Value::Int(movie_id), Value::Int(subject_id), Value::Int(status_id)];
                self.push(&mut writer, row).await?;
            }

            self.finish_writer(PHASE, writer, cancel, &mut stats).await?;
        }

        Ok(stats)
    }
}
