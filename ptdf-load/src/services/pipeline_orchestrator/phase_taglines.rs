//! Phase 9: TAGLINE FACTS
//!
//! `# Title` sections with one tagline per non-blank line.

use super::{recoverable, Phase, PhaseStats, PipelineOrchestrator};
use crate::db::tables::MOVIE_INFO;
use crate::error::LoadResult;
use crate::parsers::InfoFact;
use crate::sources::TAGLINES;
use tokio_util::sync::CancellationToken;

impl PipelineOrchestrator {
    pub(super) async fn phase_taglines(&mut self, cancel: &CancellationToken) -> LoadResult<PhaseStats> {
        const PHASE: Phase = Phase::TaglineFacts;
        let mut stats = PhaseStats::default();

        let Some(stream) = self.open_source(PHASE, &TAGLINES, &mut stats) else {
            return Ok(stats);
        };
        let mut sections = stream.hash_sections();
        let mut writer = self.writer(&MOVIE_INFO, &TAGLINES);

        loop {
            if cancel.is_cancelled() {
                break;
            }
            let section = match sections.next() {
                Some(Ok(section)) => section,
                Some(Err(e)) => {
                    tracing::warn!(phase = %PHASE, file = %sections.path().display(), error = %e, "Read error, skipping rest of file");
                    break;
                }
                None => break,
            };

            let title = section.label.trim();
            self.tick(PHASE, &mut stats, title);
            let resolved = self.caches.titles.resolve(title).await;
            let Some(movie_id) = recoverable(resolved, PHASE, &mut stats, title)? else {
                continue;
            };

            for tagline in section.lines.iter().map(|line| line.trim()).filter(|line| !line.is_empty()) {
                let fact = InfoFact::new("taglines", tagline);
                self.add_fact(&mut writer, movie_id, fact, &mut stats).await?;
            }
        }

        self.finish_writer(PHASE, writer, cancel, &mut stats).await?;
        Ok(stats)
    }
}
