//! Row payload: the structured form of an ingested record.
//!
//! Raw records enter the pipeline as bytes or text; the first stage parses
//! them into a [`Row`] of typed [`Value`]s. Parsing failures are ordinary
//! [`TransformFailure`]s and send the record to the dead-letter sink.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::errors::TransformFailure;
use crate::typed::Transform;

/// A single typed field value.
///
/// `Double` compares and hashes by bit pattern, so `NaN == NaN` and
/// `0.0 != -0.0`. This keeps `Eq`/`Hash` lawful for envelopes carrying rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    Str(String),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Str(s) => s.hash(state),
            Value::Int32(i) => i.hash(state),
            Value::Int64(i) => i.hash(state),
            Value::Double(d) => d.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Bytes(b) => b.hash(state),
        }
    }
}

pub fn str_val(val: impl Into<String>) -> Value {
    Value::Str(val.into())
}

pub fn int32_val(val: i32) -> Value {
    Value::Int32(val)
}

pub fn int64_val(val: i64) -> Value {
    Value::Int64(val)
}

pub fn double_val(val: f64) -> Value {
    Value::Double(val)
}

pub fn bool_val(val: bool) -> Value {
    Value::Bool(val)
}

pub fn bytes_val(val: impl Into<Vec<u8>>) -> Value {
    Value::Bytes(val.into())
}

/// Field name → value. Ordered, so two rows with the same fields compare and
/// print the same regardless of input order.
pub type Row = BTreeMap<String, Value>;

/// Parse a flat JSON object into a [`Row`].
///
/// Strings, booleans, integers (as `Int64`) and floats (as `Double`) are
/// accepted. `null`, arrays and nested objects are rejected.
pub fn parse_row(raw: &[u8]) -> Result<Row, TransformFailure> {
    let value: serde_json::Value =
        serde_json::from_slice(raw).map_err(|e| TransformFailure::from_error(&e))?;

    let serde_json::Value::Object(object) = value else {
        return Err(TransformFailure::new("row must be a json object"));
    };

    let mut row = Row::new();
    for (key, field) in object {
        let value = match field {
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Value::Int64(i),
                (None, Some(f)) => Value::Double(f),
                (None, None) => {
                    return Err(TransformFailure::new(format!(
                        "field '{key}' is out of range: {n}"
                    )));
                }
            },
            other => {
                return Err(TransformFailure::new(format!(
                    "field '{key}' has unsupported type: {}",
                    json_kind(&other)
                )));
            }
        };
        row.insert(key, value);
    }
    Ok(row)
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// First ingestion stage: raw text/bytes → [`Row`].
#[derive(Debug, Clone, Default)]
pub struct ParseRow;

impl Transform<String> for ParseRow {
    type Output = Row;

    fn name(&self) -> &str {
        "parse-row"
    }

    fn apply(&self, input: &String) -> Result<Row, TransformFailure> {
        parse_row(input.as_bytes())
    }
}

impl Transform<Vec<u8>> for ParseRow {
    type Output = Row;

    fn name(&self) -> &str {
        "parse-row"
    }

    fn apply(&self, input: &Vec<u8>) -> Result<Row, TransformFailure> {
        parse_row(input)
    }
}
