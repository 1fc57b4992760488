//! Phase 6: LINK FACTS
//!
//! Connections between titles (`follows`, `remake of`, ...). An unindented
//! line names the title, the indented lines under it its links.

use super::{next_line, recoverable, Phase, PhaseStats, PipelineOrchestrator};
use crate::db::tables::MOVIE_LINK;
use crate::db::Value;
use crate::error::{LoadError, LoadResult};
use crate::parsers::lines::parse_link_line;
use crate::sources::MOVIE_LINKS;
use ptdf_common::db::vocabulary::link_types_longest_first;
use tokio_util::sync::CancellationToken;

impl PipelineOrchestrator {
    pub(super) async fn phase_link_facts(&mut self, cancel: &CancellationToken) -> LoadResult<PhaseStats> {
        const PHASE: Phase = Phase::LinkFacts;
        let mut stats = PhaseStats::default();

        let Some(mut stream) = self.open_source(PHASE, &MOVIE_LINKS, &mut stats) else {
            return Ok(stats);
        };
        let link_types = link_types_longest_first();
        let mut writer = self.writer(&MOVIE_LINK, &MOVIE_LINKS);
        let mut movie_id: Option<i64> = None;

        while let Some(line) = next_line(&mut stream, PHASE) {
            if cancel.is_cancelled() {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            if !line.starts_with(' ') {
                self.tick(PHASE, &mut stats, &line);
                movie_id = recoverable(self.caches.titles.resolve(line.trim()).await, PHASE, &mut stats, &line)?;
                continue;
            }

            let Some(movie_id) = movie_id else {
                continue;
            };
            let parsed = parse_link_line(&line, &link_types).map_err(LoadError::from);
            let Some((link_type_id, target)) = recoverable(parsed, PHASE, &mut stats, &line)? else {
                continue;
            };
            let resolved = self.caches.titles.resolve(&target).await;
            let Some(linked_id) = recoverable(resolved, PHASE, &mut stats, &line)? else {
                continue;
            };

            let row = vec![Value::Int(movie_id), Value::Int(linked_id), Value::Int(link_type_id)];
            self.push(&mut writer, row).await?;
        }

        self.finish_writer(PHASE, writer, cancel, &mut stats).await?;
        Ok(stats)
    }
}
