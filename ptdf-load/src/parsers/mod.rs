//! Fact grammars of the data files
//!
//! Pure functions from data lines (or the lines of one section) to the
//! values that end up in fact rows. Title and name keys are returned as
//! written; resolving them to ids is the caller's job.

pub mod aliases;
pub mod biography;
pub mod cast;
pub mod lines;
pub mod lists;

/// A typed fact about a title or a person
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoFact {
    /// Name in the `info_type` vocabulary (unknown names are possible)
    pub info_type: String,
    pub info: String,
    pub note: Option<String>,
}

impl InfoFact {
    pub fn new(info_type: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            info_type: info_type.into(),
            info: info.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }
}

/// Split on `sep`, drop empty pieces and trim the rest
pub fn split_columns<'a>(line: &'a str, sep: &str) -> Vec<&'a str> {
    line.split(sep)
        .filter(|piece| !piece.is_empty())
        .map(str::trim)
        .collect()
}

/// `(author: X)` note for an authored text, `None` without an author
pub(crate) fn author_note(author: &str) -> Option<String> {
    let author = author.trim();
    if author.is_empty() {
        None
    } else {
        Some(format!("(author: {})", author))
    }
}
