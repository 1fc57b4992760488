//! Title key grammar
//!
//! Title keys look like:
//! - `Incredibles, The (2004)` movie
//! - `Birds, The (1963/II) (TV)` TV movie with a disambiguation index
//! - `"Simpsons, The" (1989)` TV series
//! - `"Simpsons, The" (1989) {Bart Gets an F (1990-10-11) (#2.1)}` episode
//!
//! Trailing articles are kept as written; the key is never reordered.

use super::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;

/// `(1998)`, `(1986/II)` or `(????)`
static YEAR_INDEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([0-9?]{4})(?:/([IVXLCDM]+))?\)").expect("year/index pattern is valid")
});

/// `{Episode title (2005-01-01) (#1.2)}`, every part optional
static EPISODE_INFO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(.+?)?\s?(\([0-9?]{4}-[0-9?]{1,2}-[0-9?]{1,2}\))?\s?(\(#[0-9]+\.[0-9]+\))?\}")
        .expect("episode info pattern is valid")
});

/// Kind of production, in `kind_type` vocabulary order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TitleKind {
    Movie,
    TvSeries,
    TvMovie,
    VideoMovie,
    TvMiniSeries,
    VideoGame,
    Episode,
}

impl TitleKind {
    pub const ALL: [TitleKind; 7] = [
        TitleKind::Movie,
        TitleKind::TvSeries,
        TitleKind::TvMovie,
        TitleKind::VideoMovie,
        TitleKind::TvMiniSeries,
        TitleKind::VideoGame,
        TitleKind::Episode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TitleKind::Movie => "movie",
            TitleKind::TvSeries => "tv series",
            TitleKind::TvMovie => "tv movie",
            TitleKind::VideoMovie => "video movie",
            TitleKind::TvMiniSeries => "tv mini series",
            TitleKind::VideoGame => "video game",
            TitleKind::Episode => "episode",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Marker appended after the year, e.g. `(TV)`
    fn marker(self) -> Option<&'static str> {
        match self {
            TitleKind::TvMovie => Some("(TV)"),
            TitleKind::VideoMovie => Some("(V)"),
            TitleKind::TvMiniSeries => Some("(mini)"),
            TitleKind::VideoGame => Some("(VG)"),
            _ => None,
        }
    }

    /// Series titles are written between double quotes
    fn is_quoted(self) -> bool {
        matches!(self, TitleKind::TvSeries | TitleKind::TvMiniSeries)
    }
}

/// Structured fields of a title key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFields {
    pub title: String,
    pub kind: TitleKind,
    /// Four characters as written; `????` is stored as `None`
    pub year: Option<String>,
    /// Roman numeral separating same-named titles of the same year
    pub imdb_index: Option<String>,
    pub episode_of: Option<Box<TitleFields>>,
    pub original_air_date: Option<String>,
    pub season: Option<i64>,
    pub episode: Option<i64>,
}

impl TitleFields {
    pub fn new(title: impl Into<String>, kind: TitleKind) -> Self {
        Self {
            title: title.into(),
            kind,
            year: None,
            imdb_index: None,
            episode_of: None,
            original_air_date: None,
            season: None,
            episode: None,
        }
    }

    /// Year as an integer, when fully known
    pub fn production_year(&self) -> Option<i64> {
        self.year.as_deref().and_then(|y| y.parse().ok())
    }
}

/// Parse a title key
pub fn analyze_title(raw: &str) -> Result<TitleFields, ParseError> {
    let title = raw.trim();
    match split_series_episode(title) {
        Some((series, episode)) => analyze_episode(raw, series, episode),
        None => analyze_plain(raw, title),
    }
}

/// Key of the series an episode key belongs to, without a full parse
pub fn series_key(raw: &str) -> Option<&str> {
    split_series_episode(raw.trim()).map(|(series, _)| series)
}

/// Build the key form used by the data files
pub fn build_title(fields: &TitleFields) -> String {
    if fields.kind == TitleKind::Episode {
        if let Some(series) = &fields.episode_of {
            let mut episode = fields.title.clone();
            if let Some(date) = &fields.original_air_date {
                if is_full_date(date) && !episode.contains(date.as_str()) {
                    episode.push_str(&format!(" ({})", date));
                }
            }
            if let Some(season) = fields.season {
                episode.push_str(&format!(" (#{}", season));
                if let Some(number) = fields.episode {
                    episode.push_str(&format!(".{}", number));
                }
                episode.push(')');
            }
            return format!("{} {{{}}}", build_plain(series), episode);
        }
    }
    build_plain(fields)
}

fn build_plain(fields: &TitleFields) -> String {
    let mut out = if fields.kind.is_quoted() {
        format!("\"{}\"", fields.title)
    } else {
        fields.title.clone()
    };
    out.push_str(" (");
    out.push_str(fields.year.as_deref().unwrap_or("????"));
    if let Some(index) = &fields.imdb_index {
        out.push('/');
        out.push_str(index);
    }
    out.push(')');
    if let Some(marker) = fields.kind.marker() {
        out.push(' ');
        out.push_str(marker);
    }
    out
}

/// Split `"Series" (2004) {Episode}` into its series and `{Episode}` parts
fn split_series_episode(title: &str) -> Option<(&str, &str)> {
    if !title.ends_with('}') {
        return None;
    }
    let begin = title.rfind('{')?;
    let episode = &title[begin..];
    if episode.trim_matches(|c| c == '{' || c == '}') == "SUSPENDED" {
        return None;
    }
    let series = title[..begin].trim_end_matches('{').trim_end();
    if series.is_empty() {
        return None;
    }
    Some((series, episode))
}

fn analyze_episode(raw: &str, series: &str, episode: &str) -> Result<TitleFields, ParseError> {
    let series_fields = analyze_plain(raw, series)?;

    let mut episode_title = episode.to_string();
    let mut air_date: Option<String> = None;
    let mut numbers: Option<String> = None;
    let mut air_year: Option<String> = None;

    if let Some(caps) = EPISODE_INFO.captures(episode) {
        episode_title = caps.get(1).map_or("", |m| m.as_str()).to_string();
        air_date = caps.get(2).map(|m| m.as_str().to_string());
        numbers = caps.get(3).map(|m| m.as_str().to_string());

        // The whole episode part may be just a date: {(2005-04-12)}
        if air_date.is_none()
            && episode_title.starts_with('(')
            && episode_title.ends_with(')')
            && !episode_title.starts_with("(#")
        {
            if episode_title.get(5..6) == Some("-") {
                air_year = episode_title.get(1..5).map(str::to_string);
            }
            air_date = Some(episode_title.clone());
        }
        if air_date.is_none() && numbers.is_none() && episode_title.starts_with("(#") {
            numbers = Some(episode_title.clone());
        }
    }

    let mut fields = analyze_plain(raw, &episode_title)?;
    fields.kind = TitleKind::Episode;
    fields.episode_of = Some(Box::new(series_fields));

    if let Some(date) = air_date {
        let inner = unparenthesize(&date, "(").ok_or_else(|| ParseError::InvalidTitle(raw.to_string()))?;
        fields.original_air_date = Some(inner.to_string());
        if fields.year.is_none() {
            fields.year = air_year;
        }
    }

    if let Some(numbers) = numbers {
        let inner = unparenthesize(&numbers, "(#").ok_or_else(|| ParseError::InvalidTitle(raw.to_string()))?;
        if let Some((season, number)) = inner.split_once('.') {
            fields.season = season.parse().ok();
            fields.episode = number.parse().ok();
        }
    }

    Ok(fields)
}

/// `text` without `open` and the closing `)`
fn unparenthesize<'t>(text: &'t str, open: &str) -> Option<&'t str> {
    text.strip_prefix(open)?.strip_suffix(')')
}

fn analyze_plain(raw: &str, title: &str) -> Result<TitleFields, ParseError> {
    let mut title = title.trim();
    let mut kind = None;

    for candidate in [
        TitleKind::TvMovie,
        TitleKind::VideoMovie,
        TitleKind::TvMiniSeries,
        TitleKind::VideoGame,
    ] {
        if let Some(stripped) = candidate.marker().and_then(|m| title.strip_suffix(m)) {
            kind = Some(candidate);
            title = stripped.trim_end();
            break;
        }
    }

    let mut year = None;
    let mut imdb_index = None;
    let last = YEAR_INDEX.captures_iter(title).last().map(|caps| {
        (
            caps[0].to_string(),
            caps[1].to_string(),
            caps.get(2).map(|m| m.as_str().to_string()),
        )
    });
    if let Some((whole, found_year, found_index)) = last {
        if let Some(pos) = title.rfind(whole.as_str()) {
            title = title[..pos].trim_end();
        }
        year = Some(found_year).filter(|y| y != "????");
        imdb_index = found_index;
    }

    if title.len() >= 2 && title.starts_with('"') && title.ends_with('"') {
        kind.get_or_insert(TitleKind::TvSeries);
        title = title[1..title.len() - 1].trim();
    }

    if title.is_empty() {
        return Err(ParseError::InvalidTitle(raw.to_string()));
    }

    let mut fields = TitleFields::new(title, kind.unwrap_or(TitleKind::Movie));
    fields.year = year;
    fields.imdb_index = imdb_index;
    Ok(fields)
}

fn is_full_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-'
}
