//! C2: resolve a free-form day descriptor ("1st Tue", "Last Friday", "2nd
//! Working Wednesday") against the working-date list to a concrete date or
//! no-match.

use chrono::{Datelike, NaiveDate, Weekday};

/// The occurrence token of a descriptor: `1st`..`5th` or `last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// 1-based occurrence, e.g. `Nth(1)` for "1st".
    Nth(usize),
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDescriptor {
    pub occurrence: Occurrence,
    pub weekday: Weekday,
}

/// Parses the weekday token of a `Days`/`OfficeDays` cell or a descriptor:
/// matches a case-insensitive 3-letter-or-longer prefix of `mon`, `tue`,
/// `wed`, `thu`, `fri` against either the short or full English weekday name.
pub fn parse_weekday_token(token: &str) -> Option<Weekday> {
    let lower = token.trim().to_lowercase();
    if lower.starts_with("mon") {
        Some(Weekday::Mon)
    } else if lower.starts_with("tue") {
        Some(Weekday::Tue)
    } else if lower.starts_with("wed") {
        Some(Weekday::Wed)
    } else if lower.starts_with("thu") {
        Some(Weekday::Thu)
    } else if lower.starts_with("fri") {
        Some(Weekday::Fri)
    } else {
        None
    }
}

fn parse_occurrence_token(token: &str) -> Option<Occurrence> {
    let lower = token.trim().to_lowercase();
    if lower == "last" {
        return Some(Occurrence::Last);
    }
    let digits: String = lower.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let n: usize = digits.parse().ok()?;
    if (1..=5).contains(&n) {
        Some(Occurrence::Nth(n))
    } else {
        None
    }
}

/// Parses a descriptor string into its occurrence and weekday tokens. Filler
/// words ("working", "the") are ignored. Returns `None` if either the
/// occurrence or the weekday token is absent; resolution then fails for
/// every date.
pub fn parse_descriptor(descriptor: &str) -> Option<ParsedDescriptor> {
    let mut occurrence = None;
    let mut weekday = None;
    for token in descriptor.split_whitespace() {
        if occurrence.is_none() {
            occurrence = parse_occurrence_token(token);
        }
        if weekday.is_none() {
            weekday = parse_weekday_token(token);
        }
    }
    Some(ParsedDescriptor {
        occurrence: occurrence?,
        weekday: weekday?,
    })
}

/// Resolves `descriptor` against `date`: does `date` satisfy the descriptor,
/// given the full ordered `working_dates` list of the month?
pub fn resolve(descriptor: &str, date: NaiveDate, working_dates: &[NaiveDate]) -> bool {
    let Some(parsed) = parse_descriptor(descriptor) else {
        return false;
    };
    resolve_parsed(&parsed, date, working_dates)
}

/// As [`resolve`], but takes an already-parsed descriptor to avoid
/// re-parsing the same string for every candidate date.
pub fn resolve_parsed(parsed: &ParsedDescriptor, date: NaiveDate, working_dates: &[NaiveDate]) -> bool {
    let same_weekday: Vec<NaiveDate> = working_dates
        .iter()
        .copied()
        .filter(|d| d.year() == date.year() && d.month() == date.month() && d.weekday() == parsed.weekday)
        .collect();

    match parsed.occurrence {
        Occurrence::Last => same_weekday.last() == Some(&date),
        Occurrence::Nth(n) => same_weekday.get(n - 1) == Some(&date),
    }
}
