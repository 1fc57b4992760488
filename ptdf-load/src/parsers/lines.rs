//! One record per line files: movies, single line facts, ratings, links
//! and coverage lists

use super::split_columns;
use ptdf_common::grammar::ParseError;

/// `Title\t\tYear` line of the movies list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieLine {
    pub title: String,
    pub year: Option<String>,
}

impl MovieLine {
    /// Year column of an episode, which overrides the year in its key
    pub fn episode_year(&self) -> Option<&str> {
        if self.title.ends_with('}') {
            self.year.as_deref()
        } else {
            None
        }
    }
}

pub fn parse_movie_line(line: &str) -> Result<MovieLine, ParseError> {
    let columns = split_columns(line, "\t");
    match columns.first() {
        Some(title) if !title.is_empty() => Ok(MovieLine {
            title: title.to_string(),
            year: columns.get(1).map(|year| year.to_string()),
        }),
        _ => Err(ParseError::InvalidRecord(line.to_string())),
    }
}

/// `Title\t\tinfo\t\t(note)` line of a single line fact file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    pub title: String,
    pub info: String,
    pub note: Option<String>,
}

pub fn parse_info_line(line: &str) -> Result<InfoLine, ParseError> {
    let columns = split_columns(line.trim(), "\t");
    match columns.as_slice() {
        [title, info, rest @ ..] if !title.is_empty() && !info.is_empty() => Ok(InfoLine {
            title: title.to_string(),
            info: info.to_string(),
            note: rest.first().map(|note| note.to_string()),
        }),
        _ => Err(ParseError::InvalidRecord(line.to_string())),
    }
}

/// `New  Distribution  Votes  Rank  Title` line of the ratings report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingLine {
    pub distribution: String,
    pub votes: String,
    pub rating: String,
    pub title: String,
}

pub fn parse_rating_line(line: &str) -> Result<RatingLine, ParseError> {
    let mut columns = split_columns(line, "  ");
    // Entries new since the previous report carry a marker in the first column
    if columns.len() > 4 && columns[0].len() < 10 {
        columns.remove(0);
    }

    match columns.as_slice() {
        [distribution, votes, rating, title, ..] if !title.is_empty() => Ok(RatingLine {
            distribution: distribution.to_string(),
            votes: votes.to_string(),
            rating: rating.to_string(),
            title: title.to_string(),
        }),
        _ => Err(ParseError::InvalidRecord(line.to_string())),
    }
}

/// `(follows Title (Year))` line of the movie links list
///
/// `link_types` must list longer link texts first, so that `spin off from`
/// wins over `spin off`.
pub fn parse_link_line(line: &str, link_types: &[(&str, i64)]) -> Result<(i64, String), ParseError> {
    let text = line.trim();
    let inner = text
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| ParseError::InvalidRecord(line.to_string()))?;

    for (link, id) in link_types {
        if let Some(rest) = inner.strip_prefix(link) {
            if !rest.starts_with(' ') {
                continue;
            }
            let target = rest.trim();
            if target.is_empty() {
                break;
            }
            return Ok((*id, target.to_string()));
        }
    }

    Err(ParseError::InvalidRecord(line.to_string()))
}

/// `Title\t\tStatus` line of the complete cast / crew lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageLine {
    pub title: String,
    /// Lowercase, e.g. `complete+verified`
    pub status: String,
}

pub fn parse_coverage_line(line: &str) -> Result<CoverageLine, ParseError> {
    match split_columns(line, "\t").as_slice() {
        [title, status] if !title.is_empty() && !status.is_empty() => Ok(CoverageLine {
            title: title.to_string(),
            status: status.to_lowercase(),
        }),
        _ => Err(ParseError::InvalidRecord(line.to_string())),
    }
}
