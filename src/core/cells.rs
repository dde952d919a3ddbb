//! Typed access to loosely typed cells
//!
//! Record types read their fields through these helpers so legacy or
//! hand-edited files degrade to `None` instead of failing the whole load.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::core::table::{RowRef, Value};

/// Date format used in every date column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format written for new rows
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Non-empty text, trimmed
pub fn text(row: &RowRef<'_>, column: &str) -> Option<String> {
    let s = row.text(column);
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Text, defaulting to empty
pub fn text_or_default(row: &RowRef<'_>, column: &str) -> String {
    text(row, column).unwrap_or_default()
}

pub fn float(row: &RowRef<'_>, column: &str) -> Option<f64> {
    let value = row.get(column);
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

pub fn integer(row: &RowRef<'_>, column: &str) -> Option<i64> {
    float(row, column).map(|f| f.round() as i64)
}

/// Whole numbers are written as integers, anything else as a float
pub fn number(value: Option<f64>) -> Value {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Value::Integer(v as i64),
        Some(v) => Value::Float(v),
        None => Value::Null,
    }
}

/// Truthiness of a flag column; unknown text reads as false
pub fn flag(row: &RowRef<'_>, column: &str) -> bool {
    known_flag(row, column).unwrap_or(false)
}

/// A flag that may be unrecorded: blank or unrecognised text reads as `None`
pub fn known_flag(row: &RowRef<'_>, column: &str) -> Option<bool> {
    match row.get(column) {
        Value::Bool(b) => Some(*b),
        Value::Integer(i) => Some(*i != 0),
        Value::Float(f) => Some(*f != 0.0),
        Value::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        Value::Null => None,
    }
}

/// Closed-set label; blank or unrecognised values fall back to the default
pub fn label<T: FromStr + Default>(row: &RowRef<'_>, column: &str) -> T {
    known_label(row, column).unwrap_or_default()
}

/// Closed-set label that may be unrecorded
pub fn known_label<T: FromStr>(row: &RowRef<'_>, column: &str) -> Option<T> {
    let raw = text(row, column)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(column, value = %raw, "unrecognised value, ignoring");
            None
        }
    }
}

/// Parse a date, accepting a full timestamp by taking its date part
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(s).map(|ts| ts.date()))
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn date(row: &RowRef<'_>, column: &str) -> Option<NaiveDate> {
    text(row, column).and_then(|s| parse_date(&s))
}

pub fn timestamp(row: &RowRef<'_>, column: &str) -> Option<NaiveDateTime> {
    text(row, column).and_then(|s| parse_timestamp(&s))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Encode a list column as a JSON array
pub fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON-array list column; anything else reads as an empty list
pub fn list(row: &RowRef<'_>, column: &str) -> Vec<String> {
    let Some(raw) = text(row, column) else {
        return Vec::new();
    };
    serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
        warn!(column, value = %raw, error = %e, "list cell is not a JSON array, ignoring");
        Vec::new()
    })
}
