//! Person name key grammar
//!
//! Name keys are written `Surname, Name` with an optional roman numeral
//! disambiguation index: `Parr, Helen (II)`.

use super::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;

static NAME_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(([IVXLCDM]+)\)$").expect("name index pattern is valid"));

/// Structured fields of a name key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFields {
    pub name: String,
    pub imdb_index: Option<String>,
}

/// Parse a name key
pub fn analyze_name(raw: &str) -> Result<NameFields, ParseError> {
    let mut name = raw.trim();
    let mut imdb_index = None;

    if let (Some(open), Some(close)) = (name.rfind('('), name.rfind(')')) {
        if close > open {
            if let Some(caps) = NAME_INDEX.captures(&name[open..=close]) {
                imdb_index = Some(caps[1].to_string());
                name = name[..open].trim_end();
            }
        }
    }

    if name.is_empty() {
        return Err(ParseError::InvalidName(raw.to_string()));
    }

    Ok(NameFields {
        name: name.to_string(),
        imdb_index,
    })
}

/// Build the key form used by the data files
pub fn build_name(fields: &NameFields) -> String {
    match &fields.imdb_index {
        Some(index) => format!("{} ({})", fields.name, index),
        None => fields.name.clone(),
    }
}

/// `Surname, Name` to `Name Surname`
pub fn normalize_name(name: &str) -> String {
    let parts: Vec<&str> = name.split(", ").collect();
    if parts.len() == 2 {
        format!("{} {}", parts[1], parts[0])
    } else {
        name.to_string()
    }
}

/// Surname prefixes kept together with the surname
const SURNAME_PARTICLES: &[&str] = &[
    "da", "de", "del", "della", "der", "di", "du", "la", "le", "van", "von", "den", "dos", "st.",
];

/// Trailing name suffixes kept at the end of the given name
const NAME_SUFFIXES: &[&str] = &["jr.", "jr", "sr.", "sr", "ii", "iii", "iv"];

/// `Name Surname` to `Surname, Name`
///
/// Values already containing a comma are returned unchanged.
pub fn canonical_name(name: &str) -> String {
    let name = name.trim();
    if name.contains(", ") {
        return name.to_string();
    }

    let mut words: Vec<&str> = name.split_whitespace().collect();
    let suffix = match words.last() {
        Some(last) if words.len() > 2 && NAME_SUFFIXES.contains(&last.to_lowercase().as_str()) => {
            words.pop()
        }
        _ => None,
    };
    if words.len() < 2 {
        return name.to_string();
    }

    let mut surname_start = words.len() - 1;
    while surname_start > 1
        && SURNAME_PARTICLES.contains(&words[surname_start - 1].to_lowercase().as_str())
    {
        surname_start -= 1;
    }

    let mut canonical = format!(
        "{}, {}",
        words[surname_start..].join(" "),
        words[..surname_start].join(" ")
    );
    if let Some(suffix) = suffix {
        canonical.push(' ');
        canonical.push_str(suffix);
    }
    canonical
}
