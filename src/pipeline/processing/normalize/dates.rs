use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Day-before-month readings, tried in order. Two-digit years come first so a
/// four-digit year is never read as a year in the first century.
const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Accepted only when no day-first reading exists, e.g. `12/25/2020`.
const MONTH_FIRST_FORMATS: &[&str] = &["%m/%d/%y", "%m-%d-%y", "%m/%d/%Y", "%m-%d-%Y"];

const TIME_SUFFIXES: &[&str] = &[" %H:%M:%S%.f", " %H:%M:%S", " %H:%M", "T%H:%M:%S%.f", "T%H:%M:%S"];

/// Parse a calendar date preferring day-before-month order.
///
/// Any time component is dropped. Returns `None` for anything unparseable.
pub fn parse_date_dayfirst(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    parse_with(s, DAY_FIRST_FORMATS).or_else(|| parse_with(s, MONTH_FIRST_FORMATS))
}

fn parse_with(s: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(s, fmt).ok().or_else(|| {
            TIME_SUFFIXES.iter().find_map(|suffix| {
                NaiveDateTime::parse_from_str(s, &format!("{}{}", fmt, suffix))
                    .ok()
                    .map(|dt| dt.date())
            })
        })
    })
}
