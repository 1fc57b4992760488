//! Alias name and alias title lists
//!
//! Both files list an unindented original key followed by indented
//! `(aka ...)` lines:
//!
//! ```text
//! Hunt, Holly
//!    (aka Hunt, Holly Ann)
//!
//! Incredibles, The (2004)
//!    (aka Unglaublichen, Die (2004))\t(Germany)
//! ```

use super::split_columns;
use ptdf_common::grammar::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasLine {
    Blank,
    /// Key the following aliases belong to
    Original(String),
    Alias { key: String, note: Option<String> },
}

/// Line of the alias names list
pub fn parse_alias_name_line(line: &str) -> Result<AliasLine, ParseError> {
    if line.trim().is_empty() {
        return Ok(AliasLine::Blank);
    }
    if !line.starts_with(' ') {
        return Ok(AliasLine::Original(line.trim().to_string()));
    }

    let mut alias = line.trim();
    alias = alias.strip_prefix("(aka ").unwrap_or(alias);
    alias = alias.strip_suffix(')').unwrap_or(alias).trim();
    if alias.is_empty() {
        return Err(ParseError::InvalidRecord(line.to_string()));
    }

    Ok(AliasLine::Alias {
        key: alias.to_string(),
        note: None,
    })
}

/// Line of an alias titles list
///
/// The alias is `(aka Title (Year))` optionally followed by a tab separated
/// note; only the closing parenthesis of the `(aka ` wrapper is removed.
pub fn parse_alias_title_line(line: &str) -> Result<AliasLine, ParseError> {
    if line.trim().is_empty() {
        return Ok(AliasLine::Blank);
    }
    if !line.starts_with(' ') {
        return Ok(AliasLine::Original(line.trim().to_string()));
    }

    let columns = split_columns(line.trim(), "\t");
    let mut alias = columns.first().copied().unwrap_or("");
    alias = alias.strip_prefix("(aka ").unwrap_or(alias);
    if alias.ends_with("))") || alias.ends_with("})") {
        alias = &alias[..alias.len() - 1];
    }
    let alias = alias.trim();
    if alias.is_empty() {
        return Err(ParseError::InvalidRecord(line.to_string()));
    }

    Ok(AliasLine::Alias {
        key: alias.to_string(),
        note: columns
            .get(1)
            .filter(|note| !note.is_empty())
            .map(|note| note.to_string()),
    })
}

/// Append a fixed suffix (e.g. `(Hungary)`) to an alias note
pub fn with_note_suffix(note: Option<String>, suffix: Option<&str>) -> Option<String> {
    match (note, suffix) {
        (Some(note), Some(suffix)) => Some(format!("{} {}", note, suffix)),
        (None, Some(suffix)) => Some(suffix.to_string()),
        (note, None) => note,
    }
}
