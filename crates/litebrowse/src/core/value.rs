//! Parameter values bound into statements and display formatting of cells.

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use serde::Serialize;
use std::fmt;

/// Text shown in the preview for a NULL cell.
pub const NULL_DISPLAY: &str = "NULL";

/// A statement parameter produced by the browser.
///
/// Overrides chosen for a duplicated row, WHERE-clause parameters, and edited
/// cell values all take one of these three shapes; the engine applies column
/// affinity on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// SQL NULL.
    Null,

    /// 64-bit signed integer.
    Integer(i64),

    /// Text.
    Text(String),
}

impl SqlValue {
    /// Text payload, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str(NULL_DISPLAY),
            SqlValue::Integer(v) => write!(f, "{}", v),
            SqlValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Option<String>> for SqlValue {
    fn from(v: Option<String>) -> Self {
        v.map(SqlValue::Text).unwrap_or(SqlValue::Null)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Render a raw engine value for display in the preview.
pub fn format_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => NULL_DISPLAY.to_string(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) if is_mostly_printable(s) => s.to_string(),
            _ => format!("<blob {}B>", bytes.len()),
        },
    }
}

/// Read a raw engine value as a row id.
///
/// Integers are taken as-is and numeric text is parsed; anything else is 0.
pub fn as_rowid(value: ValueRef<'_>) -> i64 {
    match value {
        ValueRef::Integer(v) => v,
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0),
        _ => 0,
    }
}

/// At least 90% of the characters are printable or common whitespace.
fn is_mostly_printable(s: &str) -> bool {
    let total = s.chars().count();
    let printable = s
        .chars()
        .filter(|&c| matches!(c, '\n' | '\t' | '\r') || !c.is_control())
        .count();
    printable as f64 >= 0.9 * total as f64
}
