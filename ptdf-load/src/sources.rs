//! Catalogue of the data files and their section markers
//!
//! Every file carries a free text preamble. Its data begins after a
//! sequence of start markers, each matched as a line prefix in order, and
//! ends at an optional stop marker (also a line prefix) or at end of file.

/// Where the data of a file begins and ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpec {
    pub file: &'static str,
    pub start: &'static [&'static str],
    pub stop: Option<&'static str>,
    /// Fact flush threshold tuned for this file
    pub flush_every: Option<u64>,
}

impl SourceSpec {
    pub const fn new(file: &'static str, start: &'static [&'static str]) -> Self {
        Self {
            file,
            start,
            stop: None,
            flush_every: None,
        }
    }

    pub const fn stop(mut self, stop: &'static str) -> Self {
        self.stop = Some(stop);
        self
    }

    pub const fn flush_every(mut self, every: u64) -> Self {
        self.flush_every = Some(every);
        self
    }

    /// File name without `.list.gz`, dashes as spaces
    pub fn label(&self) -> String {
        self.file
            .trim_end_matches(".gz")
            .trim_end_matches(".list")
            .replace('-', " ")
    }
}

const MINUS_HASH_STOP: &str = "-------------------------";
const RATINGS_STOP: &str = "\n";
const COMPLETE_STOP: &str = "---------------";
const AKA_TITLES_STOP: &str = "---------------------------";

pub const MOVIES: SourceSpec = SourceSpec::new(
    "movies.list.gz",
    &["MOVIES LIST", "===========", ""],
)
.stop("--------------------------------------------------");

/// Start marker shared by every cast and crew file
const CAST_START: &[&str] = &["Name", "----"];
const CAST_STOP: &str = "-----------------------------";

/// Cast or crew file of a role category; `guest` has none
pub fn cast_source(role: &str) -> Option<SourceSpec> {
    let file: &'static str = match role {
        "actor" => "actors.list.gz",
        "actress" => "actresses.list.gz",
        "producer" => "producers.list.gz",
        "writer" => "writers.list.gz",
        "cinematographer" => "cinematographers.list.gz",
        "composer" => "composers.list.gz",
        "costume designer" => "costume-designers.list.gz",
        "director" => "directors.list.gz",
        "editor" => "editors.list.gz",
        "miscellaneous crew" => "miscellaneous.list.gz",
        "production designer" => "production-designers.list.gz",
        _ => return None,
    };

    let spec = SourceSpec::new(file, CAST_START).stop(CAST_STOP);
    Some(match role {
        "miscellaneous crew" => spec.flush_every(10_000),
        _ => spec,
    })
}

pub const AKA_NAMES: SourceSpec =
    SourceSpec::new("aka-names.list.gz", &["AKA NAMES LIST", "=============", ""]);

/// Alias title files; the second value is appended to every alias note
pub const AKA_TITLES: &[(SourceSpec, Option<&str>)] = &[
    (
        SourceSpec::new(
            "aka-titles.list.gz",
            &["AKA TITLES LIST", "=============", "", "", ""],
        )
        .stop(AKA_TITLES_STOP),
        None,
    ),
    (
        SourceSpec::new(
            "italian-aka-titles.list.gz",
            &["AKA TITLES LIST ITALIAN", "=======================", "", ""],
        )
        .stop(AKA_TITLES_STOP),
        None,
    ),
    (
        SourceSpec::new(
            "german-aka-titles.list.gz",
            &["AKA TITLES LIST GERMAN", "======================", ""],
        )
        .stop(AKA_TITLES_STOP),
        None,
    ),
    (
        SourceSpec::new(
            "iso-aka-titles.list.gz",
            &["AKA TITLES LIST ISO", "===================", ""],
        )
        .stop(AKA_TITLES_STOP),
        None,
    ),
    (
        SourceSpec::new(
            "contrib/hungarian-aka-titles.list.gz",
            &["AKA TITLES LIST HUNGARIAN", "=========================", ""],
        )
        .stop(AKA_TITLES_STOP),
        Some("(Hungary)"),
    ),
    (
        SourceSpec::new(
            "contrib/norwegian-aka-titles.list.gz",
            &["AKA TITLES LIST NORWEGIAN", "=========================", ""],
        )
        .stop(AKA_TITLES_STOP),
        Some("(Norway)"),
    ),
];

/// How the sections of a free text file are turned into facts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeTextFormat {
    /// `- ` items
    MinusList,
    /// Blank line separated dialogue blocks
    Quotes,
    /// `TAG: value` lines
    Business,
    LaserDisc,
    Literature,
    Mpaa,
    /// `PL: ` text closed by a `BY: ` author line
    Plot,
    /// Tagged person facts
    Biography,
}

/// How a free text file is split into per key sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sectioning {
    /// `# Title` headers
    Hash,
    /// `MV: `, `NM: `, `OT: ` or `MOVI` headers
    Tagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeTextSource {
    pub source: SourceSpec,
    pub sectioning: Sectioning,
    pub format: FreeTextFormat,
    /// Info type of every fact, for formats without per fact types
    pub info_type: Option<&'static str>,
}

const fn hash_file(
    source: SourceSpec,
    format: FreeTextFormat,
    info_type: &'static str,
) -> FreeTextSource {
    FreeTextSource {
        source,
        sectioning: Sectioning::Hash,
        format,
        info_type: Some(info_type),
    }
}

const fn tagged_file(source: SourceSpec, format: FreeTextFormat) -> FreeTextSource {
    FreeTextSource {
        source,
        sectioning: Sectioning::Tagged,
        format,
        info_type: None,
    }
}

pub const FREE_TEXT: &[FreeTextSource] = &[
    hash_file(
        SourceSpec::new(
            "alternate-versions.list.gz",
            &["ALTERNATE VERSIONS LIST", "=======================", "", ""],
        )
        .stop(MINUS_HASH_STOP)
        .flush_every(2_500),
        FreeTextFormat::MinusList,
        "alternate versions",
    ),
    hash_file(
        SourceSpec::new("goofs.list.gz", &["GOOFS LIST", "==========", ""])
            .stop(MINUS_HASH_STOP)
            .flush_every(2_500),
        FreeTextFormat::MinusList,
        "goofs",
    ),
    hash_file(
        SourceSpec::new("crazy-credits.list.gz", &["CRAZY CREDITS", "============="])
            .stop(MINUS_HASH_STOP)
            .flush_every(2_500),
        FreeTextFormat::MinusList,
        "crazy credits",
    ),
    hash_file(
        SourceSpec::new("quotes.list.gz", &["QUOTES LIST", "============="])
            .stop(MINUS_HASH_STOP)
            .flush_every(4_000),
        FreeTextFormat::Quotes,
        "quotes",
    ),
    hash_file(
        SourceSpec::new(
            "soundtracks.list.gz",
            &["SOUNDTRACKS LIST", "================", "", "", ""],
        )
        .stop(MINUS_HASH_STOP)
        .flush_every(3_000),
        FreeTextFormat::MinusList,
        "soundtrack",
    ),
    hash_file(
        SourceSpec::new("trivia.list.gz", &["FILM TRIVIA", "===========", ""])
            .stop(MINUS_HASH_STOP)
            .flush_every(3_000),
        FreeTextFormat::MinusList,
        "trivia",
    ),
    tagged_file(
        SourceSpec::new("biographies.list.gz", &["BIOGRAPHY LIST", "=============="])
            .flush_every(5_000),
        FreeTextFormat::Biography,
    ),
    tagged_file(
        SourceSpec::new("business.list.gz", &["BUSINESS LIST", "=============", ""])
            .stop("                                    =====")
            .flush_every(10_000),
        FreeTextFormat::Business,
    ),
    tagged_file(
        SourceSpec::new(
            "laserdisc.list.gz",
            &["LASERDISC LIST", "==============", "------------------------"],
        ),
        FreeTextFormat::LaserDisc,
    ),
    tagged_file(
        SourceSpec::new(
            "literature.list.gz",
            &["LITERATURE LIST", "===============", ""],
        )
        .stop("COPYING POLICY")
        .flush_every(5_000),
        FreeTextFormat::Literature,
    ),
    tagged_file(
        SourceSpec::new(
            "mpaa-ratings-reasons.list.gz",
            &["MPAA RATINGS REASONS LIST", "========================="],
        ),
        FreeTextFormat::Mpaa,
    ),
    tagged_file(
        SourceSpec::new("plot.list.gz", &["PLOT SUMMARIES LIST", "===================", ""])
            .flush_every(1_000),
        FreeTextFormat::Plot,
    ),
];

pub const MOVIE_LINKS: SourceSpec =
    SourceSpec::new("movie-links.list.gz", &["MOVIE LINKS LIST", "================", ""])
        .flush_every(10_000);

/// Single line fact files
pub const SINGLE_LINE: &[SourceSpec] = &[
    SourceSpec::new("certificates.list.gz", &["CERTIFICATES LIST", "================="]),
    SourceSpec::new("color-info.list.gz", &["COLOR INFO LIST", "==============="]),
    SourceSpec::new("countries.list.gz", &["COUNTRIES LIST", "=============="]),
    SourceSpec::new("distributors.list.gz", &["DISTRIBUTORS LIST", "=================", ""])
        .flush_every(10_000),
    SourceSpec::new("genres.list.gz", &["8: THE GENRES LIST", "==================", ""]),
    SourceSpec::new("keywords.list.gz", &["8: THE KEYWORDS LIST", "====================", ""]),
    SourceSpec::new("language.list.gz", &["LANGUAGE LIST", "============="]),
    SourceSpec::new("locations.list.gz", &["LOCATIONS LIST", "==============", ""])
        .flush_every(10_000),
    SourceSpec::new(
        "miscellaneous-companies.list.gz",
        &["MISCELLANEOUS COMPANY LIST", "=========================="],
    )
    .flush_every(10_000),
    SourceSpec::new(
        "production-companies.list.gz",
        &["PRODUCTION COMPANIES LIST", "=========================", ""],
    ),
    SourceSpec::new("running-times.list.gz", &["RUNNING TIMES LIST", "=================="]),
    SourceSpec::new("sound-mix.list.gz", &["SOUND-MIX LIST", "=============="]),
    SourceSpec::new(
        "special-effects-companies.list.gz",
        &["SFXCO COMPANIES LIST", "====================", ""],
    ),
    SourceSpec::new("technical.list.gz", &["TECHNICAL LIST", "==============", "", ""]),
    SourceSpec::new("release-dates.list.gz", &["RELEASE DATES LIST", "=================="]),
];

/// Info type name of a single line fact file
pub fn single_line_info_type(spec: &SourceSpec) -> String {
    match spec.label().as_str() {
        "running times" => "runtimes".to_string(),
        "technical" => "tech info".to_string(),
        "language" => "languages".to_string(),
        other => other.to_string(),
    }
}

pub const RATINGS: SourceSpec = SourceSpec::new(
    "ratings.list.gz",
    &["MOVIE RATINGS REPORT", "", "New  Distribution  Votes  Rank  Title"],
)
.stop(RATINGS_STOP);

pub const TOP_250: SourceSpec = SourceSpec::new(
    "ratings.list.gz",
    &["note: for this top 250", "", "New  Distribution"],
)
.stop(RATINGS_STOP);

pub const BOTTOM_10: SourceSpec =
    SourceSpec::new("ratings.list.gz", &["BOTTOM 10 MOVIES", "", "New  Distribution"])
        .stop(RATINGS_STOP);

pub const TAGLINES: SourceSpec =
    SourceSpec::new("taglines.list.gz", &["TAG LINES LIST", "==============", "", ""])
        .stop("-----------------------------------------")
        .flush_every(10_000);

/// Coverage files with the `comp_cast_type` subject they describe
pub const COMPLETE: &[(SourceSpec, &str)] = &[
    (
        SourceSpec::new(
            "complete-cast.list.gz",
            &["CAST COVERAGE TRACKING LIST", "==========================="],
        )
        .stop(COMPLETE_STOP),
        "cast",
    ),
    (
        SourceSpec::new(
            "complete-crew.list.gz",
            &["CREW COVERAGE TRACKING LIST", "==========================="],
        )
        .stop(COMPLETE_STOP),
        "crew",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use ptdf_common::db::vocabulary::{info_type_id, ROLE_TYPES};

    #[test]
    fn test_every_role_but_guest_has_a_file() {
        for role in ROLE_TYPES {
            assert_eq!(cast_source(role).is_some(), *role != "guest", "{}", role);
        }
        assert_eq!(cast_source("actress").unwrap().file, "actresses.list.gz");
        assert_eq!(
            cast_source("miscellaneous crew").unwrap().file,
            "miscellaneous.list.gz"
        );
        assert_eq!(
            cast_source("costume designer").unwrap().file,
            "costume-designers.list.gz"
        );
    }

    #[test]
    fn test_single_line_info_types_exist() {
        for spec in SINGLE_LINE {
            let info_type = single_line_info_type(spec);
            assert!(info_type_id(&info_type).is_some(), "{}", info_type);
        }
    }

    #[test]
    fn test_hash_file_info_types_exist() {
        for file in FREE_TEXT {
            if let Some(info_type) = file.info_type {
                assert!(info_type_id(info_type).is_some(), "{}", info_type);
            }
        }
    }

    #[test]
    fn test_label() {
        assert_eq!(SINGLE_LINE[1].label(), "color info");
        assert_eq!(MOVIES.label(), "movies");
    }
}
