//! Phase 3: ALIAS NAMES
//!
//! Alternative names of persons, stored in `aka_name` against the id of the
//! person they belong to.

use super::{next_line, recoverable, Phase, PhaseStats, PipelineOrchestrator};
use crate::db::Value;
use crate::db::tables::AKA_NAME;
use crate::error::{LoadError, LoadResult};
use crate::parsers::aliases::{parse_alias_name_line, AliasLine};
use crate::services::batch_writer::BatchWriter;
use crate::services::key_cache::grammars::name_columns;
use crate::sources::AKA_NAMES;
use ptdf_common::grammar::analyze_name;
use tokio_util::sync::CancellationToken;

impl PipelineOrchestrator {
    pub(super) async fn phase_alias_names(&mut self, cancel: &CancellationToken) -> LoadResult<PhaseStats> {
        const PHASE: Phase = Phase::AliasNames;
        let mut stats = PhaseStats::default();

        let Some(mut stream) = self.open_source(PHASE, &AKA_NAMES, &mut stats) else {
            return Ok(stats);
        };
        let mut writer = self.writer(&AKA_NAME, &AKA_NAMES);
        let mut person_id: Option<i64> = None;

        while let Some(line) = next_line(&mut stream, PHASE) {
            if cancel.is_cancelled() {
                break;
            }

            match recoverable(parse_alias_name_line(&line).map_err(LoadError::from), PHASE, &mut stats, &line)? {
                None | Some(AliasLine::Blank) => {}
                Some(AliasLine::Original(name)) => {
                    self.tick(PHASE, &mut stats, &name);
                    person_id = recoverable(self.caches.persons.resolve(&name).await, PHASE, &mut stats, &line)?;
                }
                Some(AliasLine::Alias { key, .. }) => {
                    if let Some(person_id) = person_id {
                        self.add_alias_name(PHASE, &mut writer, person_id, &key, &mut stats).await?;
                    }
                }
            }
        }

        self.finish_writer(PHASE, writer, cancel, &mut stats).await?;
        Ok(stats)
    }

    /// Queue the `aka_name` row of one alias of a person
    pub(super) async fn add_alias_name(
        &mut self,
        phase: Phase,
        writer: &mut BatchWriter,
        person_id: i64,
        alias: &str,
        stats: &mut PhaseStats,
    ) -> LoadResult<()> {
        let Some(fields) = recoverable(analyze_name(alias).map_err(LoadError::from), phase, stats, alias)? else {
            return Ok(());
        };
        let mut row = vec![Value::Int(person_id)];
        row.extend(name_columns(&fields));
        self.push(writer, row).await
    }
}
