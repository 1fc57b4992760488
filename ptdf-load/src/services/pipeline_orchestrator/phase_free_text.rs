//! Phase 5: FREE TEXT FACTS
//!
//! Multi line facts grouped in sections: `# Title` sections of the list
//! files (goofs, trivia, ...) and tagged `MV:`/`NM:` sections (plots,
//! business, biographies, ...).
//!
//! Biographies also yield alias names (birth name, nick names) and guest
//! appearances in TV episodes, stored as `guest` credits.

use super::{recoverable, Phase, PhaseStats, PipelineOrchestrator};
use crate::db::tables::{AKA_NAME, CAST_INFO, MOVIE_INFO, PERSON_INFO};
use crate::db::Value;
use crate::error::LoadResult;
use crate::parsers::biography::parse_biography;
use crate::parsers::cast::Credit;
use crate::parsers::lists::{
    parse_business, parse_laserdisc, parse_literature, parse_minus_list, parse_mpaa, parse_plot,
    parse_quotes,
};
use crate::parsers::InfoFact;
use crate::services::batch_writer::BatchWriter;
use crate::services::section_stream::Section;
use crate::sources::{FreeTextFormat, FreeTextSource, Sectioning, FREE_TEXT};
use ptdf_common::db::vocabulary::{info_type_id, role_type_id};
use std::io;
use tokio_util::sync::CancellationToken;

const PHASE: Phase = Phase::FreeTextFacts;

/// Writers of a biography file besides its `person_info` writer
struct BiographyWriters {
    aliases: BatchWriter,
    guests: BatchWriter,
    guest_role_id: i64,
}

impl PipelineOrchestrator {
    pub(super) async fn phase_free_text(&mut self, cancel: &CancellationToken) -> LoadResult<PhaseStats> {
        let mut stats = PhaseStats::default();

        for file in FREE_TEXT {
            if cancel.is_cancelled() {
                break;
            }
            self.load_free_text_file(file, cancel, &mut stats).await?;
        }

        Ok(stats)
    }

    async fn load_free_text_file(
        &mut self,
        file: &FreeTextSource,
        cancel: &CancellationToken,
        stats: &mut PhaseStats,
    ) -> LoadResult<()> {
        let Some(stream) = self.open_source(PHASE, &file.source, stats) else {
            return Ok(());
        };
        let path = stream.path().to_path_buf();
        let mut sections: Box<dyn Iterator<Item = io::Result<Section>> + Send> = match file.sectioning {
            Sectioning::Hash => Box::new(stream.hash_sections()),
            Sectioning::Tagged => Box::new(stream.tagged_sections()),
        };

        let person_facts = file.format == FreeTextFormat::Biography;
        let mut writer = if person_facts {
            self.writer(&PERSON_INFO, &file.source)
        } else {
            self.writer(&MOVIE_INFO, &file.source)
        };
        let mut bio_writers = match (person_facts, role_type_id("guest")) {
            (true, Some(guest_role_id)) => Some(BiographyWriters {
                aliases: self.writer(&AKA_NAME, &file.source),
                guests: self.writer(&CAST_INFO, &file.source),
                guest_role_id,
            }),
            _ => None,
        };

        tracing::info!(phase = %PHASE, file = file.source.file, "Loading sections");
        loop {
            if cancel.is_cancelled() {
                break;
            }
            let section = match sections.next() {
                Some(Ok(section)) => section,
                Some(Err(e)) => {
                    tracing::warn!(phase = %PHASE, file = %path.display(), error = %e, "Read error, skipping rest of file");
                    break;
                }
                None => break,
            };

            let key = section.label.trim();
            self.tick(PHASE, stats, key);
            let resolved = if person_facts {
                self.caches.persons.resolve(key).await
            } else {
                self.caches.titles.resolve(key).await
            };
            let Some(subject_id) = recoverable(resolved, PHASE, stats, key)? else {
                continue;
            };

            let facts = match (file.format, &mut bio_writers) {
                (FreeTextFormat::Biography, Some(bio)) => {
                    let biography = parse_biography(&section.lines);
                    for alias in &biography.alias_names {
                        self.add_alias_name(PHASE, &mut bio.aliases, subject_id, alias, stats)
                            .await?;
                    }
                    for guest in biography.guest_appearances {
                        let credit = Credit {
                            title: guest.title,
                            role: guest.role,
                            note: guest.note,
                            order: None,
                        };
                        self.add_credit(PHASE, &mut bio.guests, subject_id, credit, bio.guest_role_id, stats, key)
                            .await?;
                    }
                    biography.facts
                }
                (format, _) => section_facts(format, file.info_type, &section.lines),
            };

            for fact in facts {
                self.add_fact(&mut writer, subject_id, fact, stats).await?;
            }
        }

        self.finish_writer(PHASE, writer, cancel, stats).await?;
        if let Some(bio) = bio_writers {
            self.finish_writer(PHASE, bio.aliases, cancel, stats).await?;
            self.finish_writer(PHASE, bio.guests, cancel, stats).await?;
        }
        Ok(())
    }

    /// Queue a `movie_info` / `person_info` row; facts of an unknown type
    /// are skipped
    pub(super) async fn add_fact(
        &mut self,
        writer: &mut BatchWriter,
        subject_id: i64,
        fact: InfoFact,
        stats: &mut PhaseStats,
    ) -> LoadResult<()> {
        let Some(info_type_id) = info_type_id(&fact.info_type) else {
            stats.parse_failures += 1;
            tracing::warn!(info_type = %fact.info_type, "Unknown info type, fact skipped");
            return Ok(());
        };
        let row = vec![
            Value::Int(subject_id),
            Value::Int(info_type_id),
            Value::Text(fact.info),
            fact.note.into(),
        ];
        self.push(writer, row).await
    }
}

/// Facts of one title section
fn section_facts(format: FreeTextFormat, info_type: Option<&str>, lines: &[String]) -> Vec<InfoFact> {
    let typed = |items: Vec<String>| -> Vec<InfoFact> {
        let info_type = info_type.unwrap_or_default();
        items.into_iter().map(|item| InfoFact::new(info_type, item)).collect()
    };

    match format {
        FreeTextFormat::MinusList => typed(parse_minus_list(lines)),
        FreeTextFormat::Quotes => typed(parse_quotes(lines)),
        FreeTextFormat::Business => parse_business(lines),
        FreeTextFormat::LaserDisc => parse_laserdisc(lines),
        FreeTextFormat::Literature => parse_literature(lines),
        FreeTextFormat::Mpaa => parse_mpaa(lines),
        FreeTextFormat::Plot => parse_plot(lines),
        FreeTextFormat::Biography => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minus_list_sections_take_the_file_info_type() {
        let lines = vec!["- Helen's suit was redesigned.".to_string(), "".to_string()];
        let facts = section_facts(FreeTextFormat::MinusList, Some("trivia"), &lines);
        assert_eq!(facts, vec![InfoFact::new("trivia", "Helen's suit was redesigned.")]);
    }
}
