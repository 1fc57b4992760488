//! Lookup vocabularies
//!
//! Each vocabulary table is seeded from a static list; the id of an entry is
//! its 1-based position in the list. Loading code resolves ids from these
//! lists directly and never has to read them back from the database.

use crate::grammar::TitleKind;

pub const KIND_TYPES: &[&str] = &[
    "movie",
    "tv series",
    "tv movie",
    "video movie",
    "tv mini series",
    "video game",
    "episode",
];

/// Role categories; every category but `guest` has its own cast list file
pub const ROLE_TYPES: &[&str] = &[
    "actor",
    "actress",
    "producer",
    "writer",
    "cinematographer",
    "composer",
    "costume designer",
    "director",
    "editor",
    "miscellaneous crew",
    "production designer",
    "guest",
];

pub const COMP_CAST_TYPES: &[&str] = &["cast", "crew", "complete", "complete+verified"];

pub const LINK_TYPES: &[&str] = &[
    "follows",
    "followed by",
    "remake of",
    "remade as",
    "references",
    "referenced in",
    "spoofs",
    "spoofed in",
    "features",
    "featured in",
    "spin off from",
    "spin off",
    "version of",
    "similar to",
    "edited into",
    "edited from",
    "alternate language version of",
    "unknown link",
];

pub const INFO_TYPES: &[&str] = &[
    "runtimes",
    "color info",
    "genres",
    "languages",
    "certificates",
    "sound mix",
    "tech info",
    "countries",
    "taglines",
    "keywords",
    "alternate versions",
    "crazy credits",
    "goofs",
    "soundtrack",
    "quotes",
    "release dates",
    "trivia",
    "locations",
    "mini biography",
    "birth notes",
    "birth date",
    "height",
    "death date",
    "spouse",
    "other works",
    "birth name",
    "salary history",
    "nick names",
    "books",
    "agent address",
    "biographical movies",
    "portrayed",
    "where now",
    "trademarks",
    "interviews",
    "articles",
    "magazine covers",
    "pictorials",
    "death notes",
    "LD disc format",
    "LD year",
    "LD digital sound",
    "LD official retail price",
    "LD frequency response",
    "LD pressing plant",
    "LD length",
    "LD language",
    "LD review",
    "LD spaciality",
    "LD release date",
    "LD production country",
    "LD contrast",
    "LD color rendition",
    "LD picture format",
    "LD video noise",
    "LD video artifacts",
    "LD release country",
    "LD sharpness",
    "LD dynamic range",
    "LD audio noise",
    "LD color information",
    "LD group (genre)",
    "LD quality program",
    "LD close captions/teletext/ld+g",
    "LD category",
    "LD analog left",
    "LD certification",
    "LD audio quality",
    "LD video quality",
    "LD aspect ratio",
    "LD analog right",
    "LD additional information",
    "LD number of chapter stops",
    "LD dialogue intellegibility",
    "LD disc size",
    "LD master format",
    "LD subtitles",
    "LD status of availablility",
    "LD quality of source",
    "LD number of sides",
    "LD video standard",
    "LD supplement",
    "LD original title",
    "LD sound encoding",
    "LD number",
    "LD label",
    "LD catalog number",
    "LD laserdisc title",
    "screenplay/teleplay",
    "novel",
    "adaption",
    "book",
    "production process protocol",
    "printed media reviews",
    "essays",
    "other literature",
    "mpaa",
    "plot",
    "votes distribution",
    "votes",
    "rating",
    "production dates",
    "copyright holder",
    "filming dates",
    "budget",
    "weekend gross",
    "gross",
    "opening weekend",
    "rentals",
    "admissions",
    "studios",
    "top 250 rank",
    "bottom 10 rank",
    "distributors",
    "production companies",
    "special effects companies",
    "miscellaneous companies",
];

/// 1-based id of `name` in `vocabulary`
pub fn lookup(vocabulary: &[&str], name: &str) -> Option<i64> {
    vocabulary
        .iter()
        .position(|entry| *entry == name)
        .map(|index| index as i64 + 1)
}

pub fn kind_id(kind: TitleKind) -> i64 {
    // TitleKind::ALL follows KIND_TYPES order
    TitleKind::ALL
        .iter()
        .position(|k| *k == kind)
        .map_or(1, |index| index as i64 + 1)
}

pub fn kind_from_id(id: i64) -> Option<TitleKind> {
    let index = usize::try_from(id).ok()?.checked_sub(1)?;
    TitleKind::ALL.get(index).copied()
}

pub fn info_type_id(name: &str) -> Option<i64> {
    lookup(INFO_TYPES, name)
}

pub fn role_type_id(name: &str) -> Option<i64> {
    lookup(ROLE_TYPES, name)
}

pub fn comp_cast_type_id(name: &str) -> Option<i64> {
    lookup(COMP_CAST_TYPES, name)
}

/// Link types with their ids, longest text first so that `spin off from`
/// is tried before `spin off`
pub fn link_types_longest_first() -> Vec<(&'static str, i64)> {
    let mut links: Vec<(&'static str, i64)> = LINK_TYPES
        .iter()
        .enumerate()
        .map(|(index, link)| (*link, index as i64 + 1))
        .collect();
    links.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    links
}
