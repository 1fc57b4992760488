//! Phase 2: ROLE FACTS
//!
//! One cast or crew file per role category. Each credit becomes a
//! `cast_info` row linking a person to a title.

use super::{next_line, recoverable, Phase, PhaseStats, PipelineOrchestrator};
use crate::db::tables::CAST_INFO;
use crate::db::Value;
use crate::error::{LoadError, LoadResult};
use crate::parsers::cast::{parse_cast_line, CastLine, Credit};
use crate::services::batch_writer::BatchWriter;
use crate::sources::cast_source;
use ptdf_common::db::vocabulary::{role_type_id, ROLE_TYPES};
use ptdf_common::grammar::ParseError;
use tokio_util::sync::CancellationToken;

impl PipelineOrchestrator {
    pub(super) async fn phase_role_facts(&mut self, cancel: &CancellationToken) -> LoadResult<PhaseStats> {
        const PHASE: Phase = Phase::RoleFacts;
        let mut stats = PhaseStats::default();

        for role in ROLE_TYPES {
            if cancel.is_cancelled() {
                break;
            }
            let (Some(spec), Some(role_id)) = (cast_source(role), role_type_id(role)) else {
                continue;
            };
            let Some(mut stream) = self.open_source(PHASE, &spec, &mut stats) else {
                continue;
            };

            tracing::info!(phase = %PHASE, role = %role, file = spec.file, "Loading credits");
            let mut writer = self.writer(&CAST_INFO, &spec);
            let mut person_id: Option<i64> = None;

            while let Some(line) = next_line(&mut stream, PHASE) {
                if cancel.is_cancelled() {
                    break;
                }

                let credit = match parse_cast_line(&line) {
                    Ok(CastLine::Blank) => {
                        person_id = None;
                        continue;
                    }
                    Ok(CastLine::Person { name, credit }) => {
                        self.tick(PHASE, &mut stats, &name);
                        person_id = recoverable(self.caches.persons.resolve(&name).await, PHASE, &mut stats, &line)?;
                        credit
                    }
                    Ok(CastLine::Credit(credit)) => credit,
                    Err(e) => {
                        recoverable::<()>(Err(e.into()), PHASE, &mut stats, &line)?;
                        continue;
                    }
                };

                let Some(person_id) = person_id else {
                    // Credit of a person whose line was skipped
                    let orphan = Err(LoadError::Parse(ParseError::InvalidRecord(line.clone())));
                    recoverable::<()>(orphan, PHASE, &mut stats, &line)?;
                    continue;
                };
                self.add_credit(PHASE, &mut writer, person_id, credit, role_id, &mut stats, &line)
                    .await?;
            }

            self.finish_writer(PHASE, writer, cancel, &mut stats).await?;
        }

        Ok(stats)
    }

    /// Queue the `cast_info` row of one credit
    #[allow(clippy::too_many_arguments)]
    pub(super) async fn add_credit(
        &mut self,
        phase: Phase,
        writer: &mut BatchWriter,
        person_id: i64,
        credit: Credit,
        role_id: i64,
        stats: &mut PhaseStats,
        raw: &str,
    ) -> LoadResult<()> {
        let resolved = self.caches.titles.resolve(&credit.title).await;
        let Some(movie_id) = recoverable(resolved, phase, stats, raw)? else {
            return Ok(());
        };

        let row = vec![
            Value::Int(person_id),
            Value::Int(movie_id),
            credit.role.into(),
            credit.note.into(),
            credit.order.into(),
            Value::Int(role_id),
        ];
        self.push(writer, row).await
    }
}
