//! Phonetic codes for fuzzy lookup of titles and names
//!
//! Codes are soundex over the ASCII-folded value, without zero padding and
//! truncated to five characters (the width of the phonetic columns).

use crate::grammar::{is_article, normalize_name};
use unicode_normalization::UnicodeNormalization;

const MAX_CODE_LEN: usize = 5;

/// Soundex digit for an uppercase ASCII letter; `None` for vowels, H, W, Y
fn letter_code(c: char) -> Option<char> {
    match c {
        'B' | 'F' | 'P' | 'V' => Some('1'),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
        'D' | 'T' => Some('3'),
        'L' => Some('4'),
        'M' | 'N' => Some('5'),
        'R' => Some('6'),
        _ => None,
    }
}

/// H and W do not separate letters with the same code; vowels do
fn separates(c: char) -> bool {
    !matches!(c, 'H' | 'W')
}

/// Soundex code of `s`, or `None` when it has no ASCII letters
pub fn soundex(s: &str) -> Option<String> {
    let mut letters = s
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase());

    let first = letters.next()?;
    let mut code = String::with_capacity(MAX_CODE_LEN);
    code.push(first);

    let mut last = letter_code(first);
    for c in letters {
        if code.len() >= MAX_CODE_LEN {
            break;
        }
        match letter_code(c) {
            Some(digit) if last == Some(digit) => {}
            Some(digit) => {
                code.push(digit);
                last = Some(digit);
            }
            None if separates(c) => last = None,
            None => {}
        }
    }

    Some(code)
}

/// Decompose, drop combining marks and anything else outside ASCII
pub fn ascii_fold(s: &str) -> String {
    s.nfkd().filter(char::is_ascii).collect()
}

/// Phonetic code of a title, ignoring a trailing `, Article`
pub fn title_soundex(title: &str) -> Option<String> {
    let folded = ascii_fold(title);
    let parts: Vec<&str> = folded.split(", ").collect();
    match parts.split_last() {
        Some((last, rest)) if !rest.is_empty() && is_article(last) => soundex(&rest.join(", ")),
        _ => soundex(&folded),
    }
}

/// Phonetic codes of a `Surname, Name` value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameCodes {
    /// Canonical `Surname, Name` form
    pub canonical: Option<String>,
    /// `Name Surname` form, when it codes differently
    pub normal: Option<String>,
    /// Surname alone, when it differs from both
    pub surname: Option<String>,
}

pub fn name_soundexes(name: &str) -> NameCodes {
    let folded = ascii_fold(name);
    if folded.is_empty() {
        return NameCodes::default();
    }

    let canonical = soundex(&folded);
    let normal = soundex(&normalize_name(&folded)).filter(|code| Some(code) != canonical.as_ref());
    let surname = folded
        .split(", ")
        .next()
        .and_then(soundex)
        .filter(|code| Some(code) != canonical.as_ref() && Some(code) != normal.as_ref());

    NameCodes {
        canonical,
        normal,
        surname,
    }
}
