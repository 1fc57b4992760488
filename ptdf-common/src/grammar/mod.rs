//! Key grammars for titles and person names
//!
//! The plain text data files refer to movies and persons by free text keys
//! such as `Incredibles, The (2004)` or `Parr, Helen (II)`. The analyzers
//! here split those keys into their structured fields, and the builders
//! turn the fields back into the exact key form used by the files.

pub mod name;
pub mod title;

pub use name::{analyze_name, build_name, canonical_name, normalize_name, NameFields};
pub use title::{analyze_title, build_title, series_key, TitleFields, TitleKind};

use thiserror::Error;

/// A key that does not follow the title or name grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid title: \"{0}\"")]
    InvalidTitle(String),

    #[error("invalid name: \"{0}\"")]
    InvalidName(String),

    /// A data line that does not have the fields its file requires
    #[error("invalid record: \"{0}\"")]
    InvalidRecord(String),
}

/// Leading articles, stored at the end of canonical titles (`Incredibles, The`)
pub const ARTICLES: &[&str] = &[
    "the", "la", "a", "die", "der", "le", "el", "l'", "il", "das", "les", "o", "ein", "i", "un",
    "los", "de", "an", "una", "las", "eine", "den", "gli", "het", "os", "lo", "az", "det", "ha-",
    "een", "ang", "oi", "ta", "al-", "dem", "mga", "uno", "un'", "ett", "eines", "els",
];

/// Case-insensitive article lookup
pub fn is_article(word: &str) -> bool {
    let lower = word.to_lowercase();
    ARTICLES.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_lookup_ignores_case() {
        assert!(is_article("The"));
        assert!(is_article("L'"));
        assert!(!is_article("da"));
    }
}
