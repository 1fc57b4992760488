//! Phases 8 and 10: RATING FACTS and TOP/BOTTOM RATING FACTS
//!
//! Both read the ratings report. The full report gives vote distribution,
//! vote count and rating per title; the top 250 and bottom 10 tables give
//! a rank.

use super::{next_line, recoverable, Phase, PhaseStats, PipelineOrchestrator};
use crate::db::tables::MOVIE_INFO;
use crate::error::{LoadError, LoadResult};
use crate::parsers::lines::parse_rating_line;
use crate::parsers::InfoFact;
use crate::sources::{SourceSpec, BOTTOM_10, RATINGS, TOP_250};
use tokio_util::sync::CancellationToken;

impl PipelineOrchestrator {
    pub(super) async fn phase_ratings(&mut self, cancel: &CancellationToken) -> LoadResult<PhaseStats> {
        const PHASE: Phase = Phase::RatingFacts;
        let mut stats = PhaseStats::default();

        let Some(mut stream) = self.open_source(PHASE, &RATINGS, &mut stats) else {
            return Ok(stats);
        };
        let mut writer = self.writer(&MOVIE_INFO, &RATINGS);

        while let Some(line) = next_line(&mut stream, PHASE) {
            if cancel.is_cancelled() {
                break;
            }
            self.tick(PHASE, &mut stats, &line);

            let Some(rating) = recoverable(parse_rating_line(&line).map_err(LoadError::from), PHASE, &mut stats, &line)? else {
                continue;
            };
            let resolved = self.caches.titles.resolve(&rating.title).await;
            let Some(movie_id) = recoverable(resolved, PHASE, &mut stats, &line)? else {
                continue;
            };

            for fact in [
                InfoFact::new("votes distribution", rating.distribution),
                InfoFact::new("votes", rating.votes),
                InfoFact::new("rating", rating.rating),
            ] {
                self.add_fact(&mut writer, movie_id, fact, &mut stats).await?;
            }
        }

        self.finish_writer(PHASE, writer, cancel, &mut stats).await?;
        Ok(stats)
    }

    pub(super) async fn phase_top_bottom_ratings(&mut self, cancel: &CancellationToken) -> LoadResult<PhaseStats> {
        const PHASE: Phase = Phase::TopBottomRatingFacts;
        let mut stats = PhaseStats::default();

        for (spec, info_type, ascending) in [(TOP_250, "top 250 rank", true), (BOTTOM_10, "bottom 10 rank", false)] {
            if cancel.is_cancelled() {
                break;
            }
            self.load_ranks(PHASE, &spec, info_type, ascending, cancel, &mut stats).await?;
        }

        Ok(stats)
    }

    /// Top 250 ranks count up from 1; the bottom 10 table lists the worst
    /// title last, so its ranks count down from 10
    #[allow(clippy::too_many_arguments)]
    async fn load_ranks(
        &mut self,
        phase: Phase,
        spec: &SourceSpec,
        info_type: &str,
        ascending: bool,
        cancel: &CancellationToken,
        stats: &mut PhaseStats,
    ) -> LoadResult<()> {
        let Some(mut stream) = self.open_source(phase, spec, stats) else {
            return Ok(());
        };
        let mut writer = self.writer(&MOVIE_INFO, spec);
        let mut position: i64 = 0;

        while let Some(line) = next_line(&mut stream, phase) {
            if cancel.is_cancelled() {
                break;
            }
            self.tick(phase, stats, &line);

            let Some(rating) = recoverable(parse_rating_line(&line).map_err(LoadError::from), phase, stats, &line)? else {
                continue;
            };
            let resolved = self.caches.titles.resolve(&rating.title).await;
            let Some(movie_id) = recoverable(resolved, phase, stats, &line)? else {
                continue;
            };

            position += 1;
            let rank = if ascending { position } else { 11 - position };
            let fact = InfoFact::new(info_type, rank.to_string());
            self.add_fact(&mut writer, movie_id, fact, stats).await?;
        }

        self.finish_writer(phase, writer, cancel, stats).await
    }
}
