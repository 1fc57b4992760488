//! Biography sections
//!
//! Each `NM: Name` section holds two letter tagged lines. Multi valued tags
//! start every value with `XX: * ` and continue it on `XX:   ` lines.

use super::{author_note, InfoFact};
use once_cell::sync::Lazy;
use ptdf_common::grammar::{analyze_name, build_name, canonical_name, normalize_name, NameFields};
use regex::Regex;

/// `_Title (1999)_ (qv)` reference inside a guest appearance line
static TITLE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"_(.+?(?: \([0-9?]{4}(?:/[IVXLCDM]+)?\))?(?: \(mini\)| \(TV\)| \(V\)| \(VG\))?)_ \(qv\)")
        .expect("title reference pattern is valid")
});

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Appearance of a person in a TV episode, outside the cast lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestAppearance {
    pub title: String,
    pub role: Option<String>,
    pub note: Option<String>,
}

/// Everything extracted from one biography section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Biography {
    pub facts: Vec<InfoFact>,
    /// Birth name and nick names, also stored as alias names
    pub alias_names: Vec<String>,
    pub guest_appearances: Vec<GuestAppearance>,
}

impl Biography {
    /// Replace the value of a single valued fact
    fn set(&mut self, info_type: &str, value: String) {
        match self.facts.iter_mut().find(|fact| fact.info_type == info_type) {
            Some(fact) => fact.info = value,
            None => self.facts.push(InfoFact::new(info_type, value)),
        }
    }

    fn push(&mut self, info_type: &str, value: String) {
        if !value.is_empty() {
            self.facts.push(InfoFact::new(info_type, value));
        }
    }
}

pub fn parse_biography(lines: &[String]) -> Biography {
    let mut bio = Biography::default();
    bio.facts.extend(mini_biographies(lines));

    let mut birth_name = None;
    let mut nick_names = Vec::new();

    for line in lines {
        let (tag, rest) = match (line.get(..4), line.get(4..)) {
            (Some(tag), Some(rest)) => (tag, rest),
            _ => continue,
        };
        let starred = rest.strip_prefix("* ").map(str::trim);

        match (tag, starred) {
            ("DB: ", _) => {
                let (date, notes) = date_and_notes(rest);
                if !date.is_empty() {
                    bio.set("birth date", date);
                }
                if !notes.is_empty() {
                    bio.set("birth notes", notes);
                }
            }
            ("DD: ", _) => {
                let (date, notes) = date_and_notes(rest);
                if !date.is_empty() {
                    bio.set("death date", date);
                }
                if !notes.is_empty() {
                    bio.set("death notes", notes);
                }
            }
            ("RN: ", _) => {
                if let Ok(fields) = analyze_name(rest) {
                    let name = build_name(&NameFields {
                        name: canonical_name(&fields.name),
                        imdb_index: fields.imdb_index,
                    });
                    bio.set("birth name", name.clone());
                    birth_name = Some(name);
                }
            }
            ("HT: ", _) => {
                let height = rest.trim();
                if !height.is_empty() {
                    bio.set("height", height.to_string());
                }
            }
            ("NK: ", _) => {
                let nick = normalize_name(rest.trim());
                if !nick.is_empty() {
                    bio.push("nick names", nick.clone());
                    nick_names.push(nick);
                }
            }
            ("SP: ", Some(value)) => bio.push("spouse", value.to_string()),
            ("AT: ", Some(value)) => bio.push("articles", value.to_string()),
            ("PT: ", Some(value)) => bio.push("pictorials", value.to_string()),
            ("CV: ", Some(value)) => bio.push("magazine covers", value.to_string()),
            ("PI: ", Some(value)) => bio.push("portrayed", value.to_string()),
            ("SA: ", Some(value)) => bio.push("salary history", value.replace(" -> ", "::")),
            ("GA: ", Some(value)) => {
                if let Some(guest) = parse_guest_appearance(value) {
                    bio.guest_appearances.push(guest);
                }
            }
            _ => {}
        }
    }

    for (prefix, info_type) in [
        ("TR", "trivia"),
        ("QU", "quotes"),
        ("OW", "other works"),
        ("BO", "books"),
        ("AG", "agent address"),
        ("WN", "where now"),
        ("BT", "biographical movies"),
        ("TM", "trademarks"),
        ("IT", "interviews"),
    ] {
        let values = tagged_list(lines, prefix);
        if prefix == "WN" {
            // only the current whereabouts are kept
            if let Some(first) = values.into_iter().next() {
                bio.push(info_type, first);
            }
        } else {
            for value in values {
                bio.push(info_type, value);
            }
        }
    }

    bio.alias_names.extend(birth_name);
    bio.alias_names.extend(nick_names);
    bio
}

/// `BG: ` text lines closed by a `BY: ` author line
fn mini_biographies(lines: &[String]) -> Vec<InfoFact> {
    let mut bios = Vec::new();
    let mut text: Vec<&str> = Vec::new();

    for line in lines {
        if let Some(rest) = line.strip_prefix("BG: ") {
            text.push(rest.trim());
        } else if let Some(author) = line.strip_prefix("BY: ") {
            if !text.is_empty() {
                bios.push(InfoFact::new("mini biography", text.join(" ")).with_note(author_note(author)));
                text.clear();
            }
        }
    }

    bios
}

/// First contiguous block of `XX: * ` values with their `XX:   ` continuations
fn tagged_list(lines: &[String], prefix: &str) -> Vec<String> {
    let first = format!("{}: * ", prefix);
    let other = format!("{}:   ", prefix);

    let mut values = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut parsing = false;

    for line in lines {
        if let Some(rest) = line.strip_prefix(first.as_str()) {
            parsing = true;
            if !current.is_empty() {
                values.push(current.join(" "));
                current.clear();
            }
            let rest = rest.trim();
            if !rest.is_empty() {
                current.push(rest);
            }
        } else if let Some(rest) = line.strip_prefix(other.as_str()) {
            let rest = rest.trim();
            if !rest.is_empty() {
                current.push(rest);
            }
        } else {
            if !current.is_empty() {
                values.push(current.join(" "));
                current.clear();
            }
            if parsing {
                break;
            }
        }
    }
    if !current.is_empty() {
        values.push(current.join(" "));
    }

    values
}

/// Split `15 March 1950, Chicago, Illinois, USA` into date and notes
///
/// Text that does not start like a date is all notes; an unknown `????`
/// date is dropped.
pub fn date_and_notes(text: &str) -> (String, String) {
    let text = text.trim();
    if text.is_empty() {
        return (String::new(), String::new());
    }

    let first_word = text.split_whitespace().next().unwrap_or("").to_lowercase();
    let looks_like_date = text.starts_with(|c: char| c.is_ascii_digit())
        || MONTHS.contains(&first_word.as_str())
        || matches!(first_word.as_str(), "c." | "ca." | "circa" | "????,");

    if !looks_like_date {
        return (String::new(), text.to_string());
    }

    let (date, notes) = match text.split_once(',') {
        Some((date, notes)) => (date.trim(), notes.trim()),
        None => (text, ""),
    };
    let date = if date == "????" { "" } else { date };

    (date.to_string(), notes.to_string())
}

/// `_"Show" (1999)_ (qv), as Role (episode 1.2)`
fn parse_guest_appearance(text: &str) -> Option<GuestAppearance> {
    let mut refs = TITLE_REF.captures_iter(text);
    let title = refs.next()?.get(1)?.as_str().to_string();
    if refs.next().is_some() {
        return None;
    }

    let mut rest = text;
    let mut note = String::new();
    if rest.ends_with(')') {
        if let Some(open) = rest.rfind("(episode").or_else(|| rest.rfind('(')) {
            note = rest[open..].replace('_', "\"").trim().to_string();
            rest = rest[..open].trim();
        }
    }

    let mut role = String::new();
    if let Some(at) = rest.find("_ (qv), as ") {
        role = rest[at + 11..].replace("[unknown]", "").trim().to_string();
        if role.ends_with(')') {
            if let Some(open) = role.rfind('(') {
                if !note.is_empty() {
                    note.push(' ');
                }
                note.push_str(&role[open..]);
                role = role[..open].trim().to_string();
            }
        }
    }

    Some(GuestAppearance {
        title,
        role: Some(role).filter(|r| !r.is_empty()),
        note: Some(note).filter(|n| !n.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_mini_biography_author_is_a_note() {
        let bio = parse_biography(&lines("BG: Holly Hunt was born\nBG: in Georgia.\nBY: A Fan\n"));
        assert_eq!(bio.facts[0].info_type, "mini biography");
        assert_eq!(bio.facts[0].info, "Holly Hunt was born in Georgia.");
        assert_eq!(bio.facts[0].note.as_deref(), Some("(author: A Fan)"));
    }

    #[test]
    fn test_dates_and_names() {
        let text = "DB: 20 March 1958, Conyers, Georgia, USA\nRN: Holly Ann Hunt\nNK: Holls\nHT: 5' 2\"\n";
        let bio = parse_biography(&lines(text));

        let get = |info_type: &str| {
            bio.facts
                .iter()
                .find(|fact| fact.info_type == info_type)
                .map(|fact| fact.info.clone())
        };
        assert_eq!(get("birth date").as_deref(), Some("20 March 1958"));
        assert_eq!(get("birth notes").as_deref(), Some("Conyers, Georgia, USA"));
        assert_eq!(get("birth name").as_deref(), Some("Hunt, Holly Ann"));
        assert_eq!(get("height").as_deref(), Some("5' 2\""));
        assert_eq!(bio.alias_names, vec!["Hunt, Holly Ann".to_string(), "Holls".to_string()]);
    }

    #[test]
    fn test_tagged_lists_keep_first_block_only() {
        let text = "TR: * First trivia\nTR:   continued.\nTR: * Second trivia.\nHT: 1.6 m\nTR: * Stray trivia.\nWN: * Here\nWN: * There\n";
        let bio = parse_biography(&lines(text));

        let trivia: Vec<&str> = bio
            .facts
            .iter()
            .filter(|fact| fact.info_type == "trivia")
            .map(|fact| fact.info.as_str())
            .collect();
        assert_eq!(trivia, vec!["First trivia continued.", "Second trivia."]);

        let where_now: Vec<&str> = bio
            .facts
            .iter()
            .filter(|fact| fact.info_type == "where now")
            .map(|fact| fact.info.as_str())
            .collect();
        assert_eq!(where_now, vec!["Here"]);
    }

    #[test]
    fn test_salary_and_spouse() {
        let bio = parse_biography(&lines("SP: * 'Janusz Kaminski' (qv) (1995 - 2001)\nSA: * _Film (2000)_ (qv) -> $1,000\n"));
        assert_eq!(bio.facts[0], InfoFact::new("spouse", "'Janusz Kaminski' (qv) (1995 - 2001)"));
        assert_eq!(bio.facts[1], InfoFact::new("salary history", "_Film (2000)_ (qv)::$1,000"));
    }

    #[test]
    fn test_date_and_notes() {
        assert_eq!(date_and_notes("1958"), ("1958".to_string(), String::new()));
        assert_eq!(date_and_notes("????, Somewhere"), (String::new(), "Somewhere".to_string()));
        assert_eq!(date_and_notes("in a car"), (String::new(), "in a car".to_string()));
        assert_eq!(date_and_notes("c. 1900, London"), ("c. 1900".to_string(), "London".to_string()));
    }

    #[test]
    fn test_guest_appearance() {
        let bio = parse_biography(&lines("GA: * _\"Simpsons, The\" (1989)_ (qv), as Herself (episode 5.2)\n"));
        assert_eq!(
            bio.guest_appearances,
            vec![GuestAppearance {
                title: "\"Simpsons, The\" (1989)".to_string(),
                role: Some("Herself".to_string()),
                note: Some("(episode 5.2)".to_string()),
            }]
        );
    }
}
