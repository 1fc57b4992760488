//! Cast and crew list lines
//!
//! A person line starts with the name key, then tabs, then the first credit:
//!
//! ```text
//! Hunt, Holly\t\tIncredibles, The (2004)  (voice)  [Helen Parr]  <2>
//! \t\t\tIron Giant, The (1999)  [Annie Hughes]
//! ```
//!
//! Lines starting with a tab carry further credits of the same person.

use super::split_columns;
use ptdf_common::grammar::ParseError;

/// One credit of a person
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub title: String,
    /// Character name, from `[...]`
    pub role: Option<String>,
    /// Free text note, e.g. `(voice)`
    pub note: Option<String>,
    /// Billing position, from `<n>` or `<a,b,c>`
    pub order: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastLine {
    Blank,
    /// First line of a person, with their first credit
    Person { name: String, credit: Credit },
    /// Further credit of the current person
    Credit(Credit),
}

pub fn parse_cast_line(line: &str) -> Result<CastLine, ParseError> {
    if line.trim().is_empty() {
        return Ok(CastLine::Blank);
    }

    if line.starts_with('\t') {
        return parse_credit(line.trim()).map(CastLine::Credit);
    }

    let columns = split_columns(line, "\t");
    if columns.len() != 2 || columns[0].is_empty() {
        return Err(ParseError::InvalidRecord(line.to_string()));
    }

    Ok(CastLine::Person {
        name: columns[0].to_string(),
        credit: parse_credit(columns[1])?,
    })
}

/// `Title  (note)  [role]  <order>`, attributes in any order
pub fn parse_credit(text: &str) -> Result<Credit, ParseError> {
    let mut parts = text.split("  ");
    let title = parts.next().unwrap_or("").trim();
    if title.is_empty() {
        return Err(ParseError::InvalidRecord(text.to_string()));
    }

    let mut credit = Credit {
        title: title.to_string(),
        role: None,
        note: None,
        order: None,
    };

    for item in parts.map(str::trim).filter(|item| !item.is_empty()) {
        if let Some(rest) = item.strip_prefix('[') {
            credit.role = Some(rest.strip_suffix(']').unwrap_or(rest).to_string());
        } else if item.starts_with('(') {
            credit.note = Some(item.to_string());
        } else if let Some(rest) = item.strip_prefix('<') {
            credit.order = parse_order(rest.strip_suffix('>').unwrap_or(rest));
        }
    }

    Ok(credit)
}

/// `7`, or the legacy `a,b,c` triple
fn parse_order(text: &str) -> Option<i64> {
    if let Ok(order) = text.parse::<i64>() {
        return Some(order);
    }

    let parts: Vec<i64> = text
        .split(',')
        .map(|part| part.trim().parse::<i64>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [a, b, c] => {
            let thousands = c.checked_sub(1)?.checked_mul(1000)?;
            let hundreds = b.checked_sub(1)?.checked_mul(100)?;
            thousands.checked_add(hundreds)?.checked_add(a.checked_sub(1)?)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_line() {
        let line = "Hunt, Holly\t\tIncredibles, The (2004)  (voice)  [Helen Parr]  <2>";
        match parse_cast_line(line).unwrap() {
            CastLine::Person { name, credit } => {
                assert_eq!(name, "Hunt, Holly");
                assert_eq!(credit.title, "Incredibles, The (2004)");
                assert_eq!(credit.note.as_deref(), Some("(voice)"));
                assert_eq!(credit.role.as_deref(), Some("Helen Parr"));
                assert_eq!(credit.order, Some(2));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_continuation_line() {
        let line = "\t\t\tIron Giant, The (1999)  [Annie Hughes]";
        assert_eq!(
            parse_cast_line(line).unwrap(),
            CastLine::Credit(Credit {
                title: "Iron Giant, The (1999)".to_string(),
                role: Some("Annie Hughes".to_string()),
                note: None,
                order: None,
            })
        );
    }

    #[test]
    fn test_legacy_order_triple() {
        let credit = parse_credit("A (2000)  <3,2,1>").unwrap();
        assert_eq!(credit.order, Some(102));
        let credit = parse_credit("A (2000)  <x>").unwrap();
        assert_eq!(credit.order, None);
    }

    #[test]
    fn test_order_triple_out_of_range() {
        let credit = parse_credit("A (2000)  <1,1,9223372036854775807>").unwrap();
        assert_eq!(credit.order, None);
        let credit = parse_credit("A (2000)  <-9223372036854775808,1,1>").unwrap();
        assert_eq!(credit.order, None);
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(parse_cast_line("").unwrap(), CastLine::Blank);
        assert!(parse_cast_line("Only a name").is_err());
        assert!(parse_cast_line("a\tb\tc").is_err());
    }
}
