use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// %B also accepts the three-letter abbreviation when parsing.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%B-%Y",
];

// Formats without a day; parsed with day 1 put in front. Tried before the
// full dates so "September 1987" is not read as the 19th of year 87.
const MONTH_FORMATS: &[(&str, &str)] = &[("%d %B %Y", "1 "), ("%d %Y-%m", "1 ")];

static ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([0-9]{1,2})(?:st|nd|rd|th)(,?)$").expect("ordinal regex"));

/// Free-form date parsing over the layouts found in English-language tables.
///
/// Plain numbers ("1", "2019", "2.45") are never dates: they belong to
/// numeric columns such as ranks and years-as-values.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = normalize(text);
    if text.is_empty() || text.parse::<f64>().is_ok() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, fmt) {
            return Some(dt);
        }
    }
    for (fmt, prefix) in MONTH_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{prefix}{text}"), fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&text, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

pub fn is_date(text: &str) -> bool {
    parse_date(text).is_some()
}

/// Collapse whitespace, drop the period of abbreviated months ("Jan.") and
/// the suffix of ordinal days ("1st", "22nd,").
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            if let Some(caps) = ORDINAL.captures(word) {
                return format!("{}{}", &caps[1], &caps[2]);
            }
            let bare = word.strip_suffix('.').unwrap_or(word);
            if bare.len() >= 3 && bare.chars().all(|c| c.is_ascii_alphabetic()) {
                bare.to_string()
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
