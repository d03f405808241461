//! Value coercions shared by the operator handlers.
//!
//! Coercions are pure. Each one either produces a value of the target type
//! or a [`CoercionError`] naming why it could not.

use arbiter_types::{Value, ValueKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("value is null")]
    Null,

    #[error("empty string")]
    EmptyString,

    #[error("not numeric: {input:?}")]
    NotNumeric { input: String },

    #[error("cannot convert {kind} to {target}")]
    Unsupported {
        kind: ValueKind,
        target: &'static str,
    },

    #[error("unable to parse time string: {input:?}")]
    UnparseableTime { input: String },

    #[error("epoch seconds out of range: {seconds}")]
    EpochOutOfRange { seconds: i128 },
}

// ============================================================================
// Numbers
// ============================================================================

/// Coerces a value to a float.
///
/// Accepts every numeric variant, and strings or UTF-8 bytes that parse as
/// decimal floats after trimming surrounding whitespace.
pub fn to_number(value: &Value) -> Result<f64, CoercionError> {
    match value {
        Value::Int(n) => Ok(*n as f64),
        Value::UInt(n) => Ok(*n as f64),
        Value::Float(f) => Ok(*f),
        Value::String(s) => parse_number(s),
        Value::Bytes(b) => parse_number(&String::from_utf8_lossy(b)),
        Value::Null => Err(CoercionError::Null),
        other => Err(CoercionError::Unsupported {
            kind: other.kind(),
            target: "number",
        }),
    }
}

fn parse_number(text: &str) -> Result<f64, CoercionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoercionError::EmptyString);
    }
    trimmed.parse::<f64>().map_err(|_| CoercionError::NotNumeric {
        input: text.to_string(),
    })
}

// ============================================================================
// Strings
// ============================================================================

/// Coerces a value to its canonical text form.
pub fn to_string(value: &Value) -> Result<String, CoercionError> {
    match value {
        Value::Null => Err(CoercionError::Null),
        Value::String(s) => Ok(s.clone()),
        Value::Bytes(b) => Ok(String::from_utf8_lossy(b).into_owned()),
        other => Ok(other.to_string()),
    }
}

// ============================================================================
// Times
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum TimeFormat {
    /// RFC 3339 with any fractional precision and a `Z` or numeric offset.
    Rfc3339,
    /// Date and time without an offset, read as UTC. Fractional seconds
    /// are optional.
    DateTime(&'static str),
    /// Date only, read as UTC midnight.
    Date(&'static str),
}

/// Accepted time string layouts, tried in order.
const TIME_FORMATS: [TimeFormat; 6] = [
    TimeFormat::Rfc3339,
    TimeFormat::DateTime("%Y-%m-%dT%H:%M:%S%.f"),
    TimeFormat::DateTime("%Y-%m-%d %H:%M:%S%.f"),
    TimeFormat::Date("%Y-%m-%d"),
    TimeFormat::Date("%m/%d/%Y"),
    TimeFormat::DateTime("%m/%d/%Y %H:%M:%S%.f"),
];

impl TimeFormat {
    fn parse(self, input: &str) -> Option<DateTime<Utc>> {
        match self {
            TimeFormat::Rfc3339 => DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            TimeFormat::DateTime(layout) => NaiveDateTime::parse_from_str(input, layout)
                .ok()
                .map(|t| t.and_utc()),
            TimeFormat::Date(layout) => NaiveDate::parse_from_str(input, layout)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN).and_utc()),
        }
    }
}

/// Coerces a value to an instant.
///
/// Times pass through. Strings are tried against each accepted layout in
/// order. Integers are seconds since the Unix epoch.
pub fn to_time(value: &Value) -> Result<DateTime<Utc>, CoercionError> {
    match value {
        Value::Time(t) => Ok(*t),
        Value::String(s) => parse_time(s),
        Value::Int(n) => from_epoch(i128::from(*n)),
        Value::UInt(n) => from_epoch(i128::from(*n)),
        Value::Null => Err(CoercionError::Null),
        other => Err(CoercionError::Unsupported {
            kind: other.kind(),
            target: "time",
        }),
    }
}

/// Parses a time string against the accepted layouts.
pub fn parse_time(input: &str) -> Result<DateTime<Utc>, CoercionError> {
    TIME_FORMATS
        .iter()
        .find_map(|format| format.parse(input))
        .ok_or_else(|| CoercionError::UnparseableTime {
            input: input.to_string(),
        })
}

fn from_epoch(seconds: i128) -> Result<DateTime<Utc>, CoercionError> {
    i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or(CoercionError::EpochOutOfRange { seconds })
}
