//! Type coercion for predicate evaluation
//!
//! Coercion is driven only by the declared type, never by the shape of the
//! value. A value that cannot be parsed is an error; there is no fallback
//! to string comparison.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::predicate::ValueType;
use crate::errors::{DbError, DbResult};

/// A value parsed into its comparable form
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Coerced {
    Text(String),
    Integer(i64),
    /// Instant in UTC
    Time(NaiveDateTime),
}

/// Date-and-time layouts tried after RFC 3339 / RFC 2822
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
];

/// Date-only layouts, taken as midnight UTC
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%Y/%m/%d",
    "%d/%m/%Y",
];

/// Textual form of a value: strings as-is, everything else as JSON
pub fn raw_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Parse `value` according to `value_type`
pub fn coerce(value: &Value, value_type: ValueType) -> DbResult<Coerced> {
    match value_type {
        ValueType::String => Ok(Coerced::Text(raw_text(value).into_owned())),
        ValueType::Integer => to_integer(value).map(Coerced::Integer),
        ValueType::Time => to_time(value).map(Coerced::Time),
    }
}

fn to_integer(value: &Value) -> DbResult<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate))
        }
        _ => None,
    };
    parsed.ok_or_else(|| DbError::coercion(raw_text(value), ValueType::Integer.as_str()))
}

/// Truncates toward zero, rejecting non-finite and out-of-range floats
fn truncate(f: f64) -> Option<i64> {
    if !f.is_finite() || f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return None;
    }
    Some(f.trunc() as i64)
}

fn to_time(value: &Value) -> DbResult<NaiveDateTime> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        Value::String(s) => parse_time(s.trim()),
        _ => None,
    };
    parsed.ok_or_else(|| DbError::coercion(raw_text(value), ValueType::Time.as_str()))
}

fn parse_time(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
