//! Date coercion for front-matter values.
//!
//! Accepted inputs are deterministic: a number is a millisecond timestamp, a string must be a
//! calendar date (`YYYY-MM-DD`, read as UTC midnight), an RFC 3339 or an RFC 2822 date-time.
//! Anything that would need a guess (no offset, loose formats) is rejected.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_yaml::{Number, Value};
use thiserror::Error;

pub type LogDate = DateTime<FixedOffset>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("empty string")]
    Empty,
    #[error("`{0}` has a time but no UTC offset")]
    MissingOffset(String),
    #[error("`{0}` is not a recognised date format")]
    Unrecognised(String),
    #[error("timestamp {0} is out of range")]
    OutOfRange(String),
    #[error("expected a date string or a timestamp, found {0}")]
    Unsupported(&'static str),
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Coerces a raw front-matter value into a date.
///
/// `Null` is not handled here, callers decide whether it means "absent".
pub fn coerce(value: &Value) -> Result<LogDate, DateError> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => from_number(n),
        Value::Tagged(tagged) => coerce(&tagged.value),
        Value::Null => Err(DateError::Unsupported("null")),
        Value::Bool(_) => Err(DateError::Unsupported("boolean")),
        Value::Sequence(_) => Err(DateError::Unsupported("sequence")),
        Value::Mapping(_) => Err(DateError::Unsupported("mapping")),
    }
}

pub fn parse_str(raw: &str) -> Result<LogDate, DateError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(DateError::Empty);
    }

    if is_calendar_date(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc().fixed_offset())
            .ok_or_else(|| DateError::Unrecognised(s.to_string()));
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Ok(date);
    }

    let zulu = zulu_to_offset(s);
    if let Some(date) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&zulu, fmt).ok())
    {
        return Ok(date);
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(s) {
        return Ok(date);
    }

    if NAIVE_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
    {
        return Err(DateError::MissingOffset(s.to_string()));
    }

    Err(DateError::Unrecognised(s.to_string()))
}

/// Reads a number as milliseconds since the Unix epoch, fractions truncated toward zero.
pub fn from_number(n: &Number) -> Result<LogDate, DateError> {
    let millis = if let Some(i) = n.as_i64() {
        Some(i)
    } else if let Some(u) = n.as_u64() {
        i64::try_from(u).ok()
    } else {
        n.as_f64()
            .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
            .map(|f| f.trunc() as i64)
    };

    millis
        .and_then(DateTime::from_timestamp_millis)
        .map(|date| date.fixed_offset())
        .ok_or_else(|| DateError::OutOfRange(n.to_string()))
}

/// `YYYY-MM-DD` with exactly four, two and two digits.
fn is_calendar_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn zulu_to_offset(s: &str) -> String {
    match s.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => s.to_string(),
    }
}
