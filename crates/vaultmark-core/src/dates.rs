//! Date and datetime literals.
//!
//! Accepted layouts:
//! - date: `YYYY-MM-DD` naming a real calendar day
//! - datetime: RFC 3339, `YYYY-MM-DDTHH:MM`, or `YYYY-MM-DDTHH:MM:SS`
//!
//! Plain YAML timestamps (`2025-2-1`, `2025-02-01 09:30:00`) are accepted
//! through [`canonical_yaml_timestamp`], which rewrites them into these layouts.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static DATE_SHAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static NAIVE_DATETIME_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2})?$").unwrap());

static YAML_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:(?:[Tt]|[ \t]+)(\d{1,2}):(\d{2}):(\d{2})(?:\.\d*)?(?:[ \t]*(Z|[+-]\d{1,2}(?::?\d{2})?))?)?$",
    )
    .unwrap()
});

/// A YAML timestamp rewritten into a canonical layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    /// `YYYY-MM-DD`
    Date(String),
    /// `YYYY-MM-DDTHH:MM:SS`, with `Z` or `+HH:MM` when the source had a zone
    Datetime(String),
}

/// Canonical form of a YAML 1.1 timestamp scalar.
///
/// Month and day may have one digit, the time may follow a `T` or spaces and
/// fractional seconds are dropped. Returns `None` when the text is not a
/// timestamp or names an impossible date or time.
pub fn canonical_yaml_timestamp(s: &str) -> Option<Timestamp> {
    let caps = YAML_TIMESTAMP.captures(s.trim())?;
    let number = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(2)?, number(3)?)?;
    let date_text = date.format("%Y-%m-%d").to_string();

    let Some(hour) = number(4) else {
        return Some(Timestamp::Date(date_text));
    };
    let time = NaiveTime::from_hms_opt(hour, number(5)?, number(6)?)?;
    let mut text = format!("{}T{}", date_text, time.format("%H:%M:%S"));

    match caps.get(7).map(|m| m.as_str()) {
        None => {}
        Some("Z") => text.push('Z'),
        Some(zone) => {
            let (sign, rest) = zone.split_at(1);
            let (hours, minutes) = match rest.split_once(':') {
                Some((h, m)) => (h, m),
                None if rest.len() > 2 => rest.split_at(rest.len() - 2),
                None => (rest, "00"),
            };
            let hours = hours.parse::<u32>().ok().filter(|h| *h < 24)?;
            let minutes = minutes.parse::<u32>().ok().filter(|m| *m < 60)?;
            text.push_str(&format!("{}{:02}:{:02}", sign, hours, minutes));
        }
    }
    Some(Timestamp::Datetime(text))
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if !DATE_SHAPE.is_match(s) {
        return Err(Error::parse_error(format!("invalid date: {:?}", s)));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| Error::parse_error(format!("invalid date: {:?}", s)))
}

/// Parse a datetime in one of the accepted layouts.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::parse_error("invalid datetime: empty"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    if NAIVE_DATETIME_SHAPE.is_match(s) {
        for layout in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
                return Ok(dt);
            }
        }
    }

    Err(Error::parse_error(format!("invalid datetime: {:?}", s)))
}

pub fn is_valid_date(s: &str) -> bool {
    // No trimming here: " 2025-01-01" is not a date literal.
    DATE_SHAPE.is_match(s) && parse_date(s).is_ok()
}

pub fn is_valid_datetime(s: &str) -> bool {
    parse_datetime(s).is_ok()
}
