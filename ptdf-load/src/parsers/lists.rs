//! Free text section grammars
//!
//! Hash sectioned files (`# Title`) hold `- ` item lists or quotes; tagged
//! files (`MV: Title`) hold `TAG: value` lines. Each function receives the
//! body lines of one section.

use super::{author_note, InfoFact};

/// `- ` items, continuation lines joined with single spaces
pub fn parse_minus_list(lines: &[String]) -> Vec<String> {
    let mut items = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in lines {
        if let Some(rest) = line.strip_prefix("- ") {
            if !current.is_empty() {
                items.push(current.join(" "));
            }
            current.clear();
            let rest = rest.trim();
            if !rest.is_empty() {
                current.push(rest);
            }
        } else {
            let text = line.trim();
            if !text.is_empty() {
                current.push(text);
            }
        }
    }
    if !current.is_empty() {
        items.push(current.join(" "));
    }

    items
}

/// Blank line separated quotes; speaker lines of a quote joined with `::`
pub fn parse_quotes(lines: &[String]) -> Vec<String> {
    let mut quotes = Vec::new();
    let mut speakers: Vec<String> = Vec::new();

    for line in lines {
        let continues = line.starts_with("  ")
            && speakers
                .last()
                .is_some_and(|last| !last.is_empty() && !last.ends_with("::"));

        if continues {
            let text = line.trim_start();
            if let Some(last) = speakers.last_mut() {
                if !text.is_empty() {
                    last.push(' ');
                    last.push_str(text);
                }
            }
        } else if line.trim().is_empty() {
            if !speakers.is_empty() {
                quotes.push(speakers.join("::"));
            }
            speakers.clear();
        } else {
            speakers.push(line.trim_start().to_string());
        }
    }
    if !speakers.is_empty() {
        quotes.push(speakers.join("::"));
    }

    quotes
}

/// Values of `TAG: value` lines grouped by tag, tags in first seen order
///
/// `rename` maps a tag to its info type name; unknown tags are kept as is.
pub fn parse_colon_list(lines: &[String], rename: fn(&str) -> Option<&'static str>) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();

    for line in lines {
        let line = line.trim();
        let Some((tag, value)) = line.split_once(':') else {
            continue;
        };
        let key = rename(tag).map_or_else(|| tag.to_string(), str::to_string);
        let value = value.trim().to_string();

        match grouped.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, values)) => values.push(value),
            None => grouped.push((key, vec![value])),
        }
    }

    grouped
}

fn business_tag(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "BT" => "budget",
        "WG" => "weekend gross",
        "GR" => "gross",
        "OW" => "opening weekend",
        "RT" => "rentals",
        "AD" => "admissions",
        "SD" => "filming dates",
        "PD" => "production dates",
        "ST" => "studios",
        "CP" => "copyright holder",
        _ => return None,
    })
}

fn literature_tag(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "SCRP" => "screenplay/teleplay",
        "NOVL" => "novel",
        "ADPT" => "adaption",
        "BOOK" => "book",
        "PROT" => "production process protocol",
        "IVIW" => "interviews",
        "CRIT" => "printed media reviews",
        "ESSY" => "essays",
        "OTHR" => "other literature",
        _ => return None,
    })
}

fn laserdisc_tag(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "OT" => "LD original title",
        "PC" => "LD production country",
        "YR" => "LD year",
        "CF" => "LD certification",
        "CA" => "LD category",
        "GR" => "LD group (genre)",
        "LA" => "LD language",
        "SU" => "LD subtitles",
        "LE" => "LD length",
        "RD" => "LD release date",
        "ST" => "LD status of availablility",
        "PR" => "LD official retail price",
        "RC" => "LD release country",
        "VS" => "LD video standard",
        "CO" => "LD color information",
        "SE" => "LD sound encoding",
        "DS" => "LD digital sound",
        "AL" => "LD analog left",
        "AR" => "LD analog right",
        "MF" => "LD master format",
        "PP" => "LD pressing plant",
        "SZ" => "LD disc size",
        "SI" => "LD number of sides",
        "DF" => "LD disc format",
        "PF" => "LD picture format",
        "AS" => "LD aspect ratio",
        "CC" => "LD close captions/teletext/ld+g",
        "CS" => "LD number of chapter stops",
        "QP" => "LD quality program",
        "IN" => "LD additional information",
        "SL" => "LD supplement",
        "RV" => "LD review",
        "V1" => "LD quality of source",
        "V2" => "LD contrast",
        "V3" => "LD color rendition",
        "V4" => "LD sharpness",
        "V5" => "LD video noise",
        "V6" => "LD video artifacts",
        "VQ" => "LD video quality",
        "A1" => "LD frequency response",
        "A2" => "LD dynamic range",
        "A3" => "LD spaciality",
        "A4" => "LD audio noise",
        "A5" => "LD dialogue intellegibility",
        "AQ" => "LD audio quality",
        "LN" => "LD number",
        "LB" => "LD label",
        "CN" => "LD catalog number",
        "LT" => "LD laserdisc title",
        _ => return None,
    })
}

fn mpaa_tag(tag: &str) -> Option<&'static str> {
    match tag {
        "RE" => Some("mpaa"),
        _ => None,
    }
}

/// Currency codes written as symbols
fn currency_symbols(value: &str) -> String {
    value
        .replace("USD ", "$")
        .replace("GBP ", "\u{a3}")
        .replace("EUR", "\u{20ac}")
}

/// One fact per value
fn each_value(grouped: Vec<(String, Vec<String>)>) -> Vec<InfoFact> {
    grouped
        .into_iter()
        .flat_map(|(key, values)| {
            values
                .into_iter()
                .map(move |value| InfoFact::new(key.clone(), value))
        })
        .collect()
}

/// One fact per tag, values joined with spaces
fn joined_values(grouped: Vec<(String, Vec<String>)>) -> Vec<InfoFact> {
    grouped
        .into_iter()
        .map(|(key, values)| InfoFact::new(key, values.join(" ")))
        .collect()
}

pub fn parse_business(lines: &[String]) -> Vec<InfoFact> {
    let mut facts = each_value(parse_colon_list(lines, business_tag));
    for fact in &mut facts {
        fact.info = currency_symbols(&fact.info);
    }
    facts
}

pub fn parse_laserdisc(lines: &[String]) -> Vec<InfoFact> {
    joined_values(parse_colon_list(lines, laserdisc_tag))
}

pub fn parse_literature(lines: &[String]) -> Vec<InfoFact> {
    each_value(parse_colon_list(lines, literature_tag))
}

pub fn parse_mpaa(lines: &[String]) -> Vec<InfoFact> {
    joined_values(parse_colon_list(lines, mpaa_tag))
}

/// `PL: ` lines accumulated until a `BY: ` author line closes the plot
pub fn parse_plot(lines: &[String]) -> Vec<InfoFact> {
    let mut plots = Vec::new();
    let mut text: Vec<&str> = Vec::new();

    for line in lines {
        if let Some(rest) = line.strip_prefix("PL: ") {
            text.push(rest);
        } else if let Some(author) = line.strip_prefix("BY: ") {
            plots.push(InfoFact::new("plot", text.join(" ").trim()).with_note(author_note(author)));
            text.clear();
        }
    }

    plots.retain(|plot| !plot.info.is_empty());
    plots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_minus_list_joins_continuations() {
        let items = parse_minus_list(&lines("- First goof\n  continues here.\n\n- Second goof.\n-  \n"));
        assert_eq!(items, vec!["First goof continues here.", "Second goof."]);
    }

    #[test]
    fn test_quotes() {
        let text = "Mr. Incredible: No matter how many times you save the world,\n  it always manages to get back in jeopardy again.\nFrozone: Uh huh.\n\nEdna: No capes!\n";
        let quotes = parse_quotes(&lines(text));
        assert_eq!(quotes.len(), 2);
        assert_eq!(
            quotes[0],
            "Mr. Incredible: No matter how many times you save the world, it always manages to get back in jeopardy again.::Frozone: Uh huh."
        );
        assert_eq!(quotes[1], "Edna: No capes!");
    }

    #[test]
    fn test_business_currency_and_grouping() {
        let facts = parse_business(&lines("BT: USD 92,000,000\nGR: USD 261,441,092 (USA)\nGR: GBP 10,000 (UK)\nXX: odd\n"));
        assert_eq!(facts[0], InfoFact::new("budget", "$92,000,000"));
        assert_eq!(facts[1], InfoFact::new("gross", "$261,441,092 (USA)"));
        assert_eq!(facts[2], InfoFact::new("gross", "\u{a3}10,000 (UK)"));
        assert_eq!(facts[3], InfoFact::new("XX", "odd"));
    }

    #[test]
    fn test_laserdisc_values_are_joined() {
        let facts = parse_laserdisc(&lines("LN: 123\nIN: first part\nIN: second part\n"));
        assert_eq!(facts[0], InfoFact::new("LD number", "123"));
        assert_eq!(facts[1], InfoFact::new("LD additional information", "first part second part"));
    }

    #[test]
    fn test_literature_and_mpaa() {
        let facts = parse_literature(&lines("NOVL: Some novel\nCRIT: A review\n"));
        assert_eq!(facts[0].info_type, "novel");
        assert_eq!(facts[1].info_type, "printed media reviews");

        let facts = parse_mpaa(&lines("RE: Rated PG for action\nRE: violence\n"));
        assert_eq!(facts, vec![InfoFact::new("mpaa", "Rated PG for action violence")]);
    }

    #[test]
    fn test_plot_author_goes_to_note() {
        let facts = parse_plot(&lines("PL: A family of\nPL: superheroes.\nBY: Someone\n"));
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].info, "A family of superheroes.");
        assert_eq!(facts[0].note.as_deref(), Some("(author: Someone)"));
    }
}
