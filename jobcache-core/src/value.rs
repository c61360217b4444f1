//! Typed cell values and the sanitizer.
//!
//! Rows come out of the database as a closed set of value variants. Before a
//! row is stored in a snapshot it is sanitized into `serde_json::Value`; the
//! only rewrite is that null markers and non-finite floats become JSON `null`.
//! JSON has no encoding for NaN or infinity, so nothing non-finite may survive.

use serde_json::{Map, Number, Value};

use crate::record::{Record, Row};

/// A single decoded cell, possibly nested (JSON/array columns).
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<CellValue>),
    /// Ordered mapping; order is preserved through sanitization.
    Map(Vec<(String, CellValue)>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null),
            },
            Value::String(s) => CellValue::Text(s),
            Value::Array(items) => CellValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                CellValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

/// Sanitize one value into JSON.
///
/// NaN, +inf, -inf and `Null` become `null`. Lists and maps are walked
/// recursively with order and keys untouched. Never fails.
pub fn sanitize(value: CellValue) -> Value {
    match value {
        CellValue::Null => Value::Null,
        CellValue::Bool(b) => Value::Bool(b),
        CellValue::Int(i) => Value::Number(i.into()),
        // from_f64 returns None exactly for the non-finite cases
        CellValue::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        CellValue::Text(s) => Value::String(s),
        CellValue::List(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        CellValue::Map(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k, sanitize(v)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

/// Sanitize a whole row into a record, keeping column order.
pub fn sanitize_row(row: Row) -> Record {
    row.into_iter().map(|(name, cell)| (name, sanitize(cell))).collect()
}
