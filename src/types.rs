//! Core data model types shared by parsers, the stream pipeline, and writers.
//!
//! The pipeline's common currency is the [`ExtendedRow`]: a physical row number, the headers in
//! effect when the row was emitted, and the row's [`Value`]s.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Header names shared by reference between every row of one session.
pub type Headers = Arc<[String]>;

/// A row projected into a header -> value mapping.
pub type KeyedRow = BTreeMap<String, Value>;

/// A single cell value.
///
/// Formats that carry no type information (CSV, text) always produce [`Value::Utf8`]; typed
/// formats (JSON, spreadsheets, Parquet) keep their native scalar types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value (JSON `null`, empty spreadsheet cell, Parquet null).
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Returns the string slice if this is a [`Value::Utf8`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text rendering used by `force_strings`; nulls stay null.
    pub fn into_text(self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Utf8(s) => Value::Utf8(s),
            other => Value::Utf8(other.to_string()),
        }
    }

    /// Convert a JSON scalar or container. Nested arrays/objects are kept as their JSON text.
    pub fn from_json(v: serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int64(i)
                } else {
                    n.as_f64()
                        .map(Value::Float64)
                        .unwrap_or_else(|| Value::Utf8(n.to_string()))
                }
            }
            serde_json::Value::String(s) => Value::Utf8(s),
            other => Value::Utf8(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Utf8(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Utf8(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A numbered row as it flows through the stream pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedRow {
    /// 1-based physical row number, assigned once when the row is read.
    pub row_number: usize,
    /// Headers in effect for this row, if any.
    pub headers: Option<Headers>,
    /// Row values; empty when the row failed to parse under `force_parse`.
    pub row: Vec<Value>,
}

impl ExtendedRow {
    /// Create an extended row.
    pub fn new(row_number: usize, headers: Option<Headers>, row: Vec<Value>) -> Self {
        Self {
            row_number,
            headers,
            row,
        }
    }

    /// Header names as a slice, if present.
    pub fn header_names(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    /// Project the row into a header -> value map. Values past the last header are dropped.
    pub fn keyed(&self) -> Option<KeyedRow> {
        let headers = self.headers.as_ref()?;
        Some(
            headers
                .iter()
                .cloned()
                .zip(self.row.iter().cloned())
                .collect(),
        )
    }
}

/// One row of an in-memory source, before numbering.
///
/// `Invalid` models an element that is not a row at all (e.g. a bare scalar inside a list of
/// rows); it surfaces as a row-level source error, or an empty row under `force_parse`.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineRow {
    /// Positional values.
    Values(Vec<Value>),
    /// Key/value pairs in source order.
    Keyed(Vec<(String, Value)>),
    /// Not a row.
    Invalid(Value),
}

impl<V: Into<Value>> From<Vec<V>> for InlineRow {
    fn from(values: Vec<V>) -> Self {
        InlineRow::Values(values.into_iter().map(Into::into).collect())
    }
}

impl InlineRow {
    /// Build a keyed row from `(key, value)` pairs, keeping their order.
    pub fn keyed<K: Into<String>, V: Into<Value>>(pairs: Vec<(K, V)>) -> Self {
        InlineRow::Keyed(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Value> for InlineRow {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Array(items) => {
                InlineRow::Values(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => InlineRow::Keyed(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
            other => InlineRow::Invalid(Value::from_json(other)),
        }
    }
}

/// Build a shared [`Headers`] value from string-likes.
pub fn headers<S: AsRef<str>>(names: &[S]) -> Headers {
    names.iter().map(|s| s.as_ref().to_string()).collect()
}
