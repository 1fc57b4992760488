//! Phase 7: SINGLE LINE FACTS
//!
//! Files with one `Title  info  (note)` fact per line: genres, countries,
//! running times, release dates and the like. The info type is implied by
//! the file.

use super::{next_line, recoverable, Phase, PhaseStats, PipelineOrchestrator};
use crate::db::tables::MOVIE_INFO;
use crate::error::{LoadError, LoadResult};
use crate::parsers::lines::parse_info_line;
use crate::parsers::InfoFact;
use crate::sources::{single_line_info_type, SINGLE_LINE};
use tokio_util::sync::CancellationToken;

impl PipelineOrchestrator {
    pub(super) async fn phase_single_line(&mut self, cancel: &CancellationToken) -> LoadResult<PhaseStats> {
        const PHASE: Phase = Phase::SingleLineFacts;
        let mut stats = PhaseStats::default();

        for spec in SINGLE_LINE {
            if cancel.is_cancelled() {
                break;
            }
            let Some(mut stream) = self.open_source(PHASE, spec, &mut stats) else {
                continue;
            };
            let info_type = single_line_info_type(spec);
            let mut writer = self.writer(&MOVIE_INFO, spec);

            while let Some(line) = next_line(&mut stream, PHASE) {
                if cancel.is_cancelled() {
                    break;
                }
                if line.trim().is_empty() {
                    continue;
                }
                self.tick(PHASE, &mut stats, &line);

                let Some(info) = recoverable(parse_info_line(&line).map_err(LoadError::from), PHASE, &mut stats, &line)? else {
                    continue;
                };
                let resolved = self.caches.titles.resolve(&info.title).await;
                let Some(movie_id) = recoverable(resolved, PHASE, &mut stats, &line)? else {
                    continue;
                };

                let fact = InfoFact::new(info_type.as_str(), info.info).with_note(info.note);
                self.add_fact(&mut writer, movie_id, fact, &mut stats).await?;
            }

            self.finish_writer(PHASE, writer, cancel, &mut stats).await?;
        }

        Ok(stats)
    }
}
