//! Type conversion helpers used by configuration and ingestion code.
//!
//! Stateless, one-shot conversions between wire/config representations:
//! timestamps, comma-separated tag strings, flat JSON string maps and
//! `--key=value` argument lists.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::ConversionError;
use crate::domain::row::json_kind;

const MILLIS_PER_SECOND: i64 = 1_000;
const NANOS_PER_MILLI: i64 = 1_000_000;

/// Wire timestamp: whole seconds since the unix epoch plus a non-negative
/// nanosecond remainder (`0 <= nanos < 1_000_000_000`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

/// Convert a millisecond epoch timestamp to a wire [`Timestamp`].
///
/// Times before the epoch borrow from `seconds` so that `nanos` stays positive.
pub fn convert_timestamp_millis(millis: i64) -> Timestamp {
    let seconds = millis.div_euclid(MILLIS_PER_SECOND);
    let remainder = millis.rem_euclid(MILLIS_PER_SECOND);
    Timestamp {
        seconds,
        // remainder < 1000, so the product always fits in i32
        nanos: (remainder * NANOS_PER_MILLI) as i32,
    }
}

/// Convert a date to a wire [`Timestamp`] at millisecond resolution.
/// Anything finer than a millisecond is dropped.
pub fn convert_timestamp(date: &DateTime<Utc>) -> Timestamp {
    convert_timestamp_millis(date.timestamp_millis())
}

/// Split a comma-separated tag string.
///
/// An empty string yields no tags. Trailing empty segments are dropped
/// (`"a,b,"` → `["a", "b"]`); inner empty segments are kept.
pub fn convert_tag_string_to_list(tags: &str) -> Vec<String> {
    if tags.is_empty() {
        return Vec::new();
    }
    let mut list: Vec<String> = tags.split(',').map(str::to_owned).collect();
    while list.last().is_some_and(String::is_empty) {
        list.pop();
    }
    list
}

/// Parse a flat JSON object of string values.
///
/// An empty (or all-whitespace) input and `{}` both yield an empty map.
pub fn convert_json_string_to_map(json: &str) -> Result<HashMap<String, String>, ConversionError> {
    if json.trim().is_empty() {
        return Ok(HashMap::new());
    }

    let object = match serde_json::from_str::<serde_json::Value>(json)? {
        serde_json::Value::Object(object) => object,
        other => {
            return Err(ConversionError::NotAnObject {
                found: json_kind(&other),
            });
        }
    };

    object
        .into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => Ok((key, s)),
            _ => Err(ConversionError::NonStringValue { key }),
        })
        .collect()
}

/// Render string pairs as a JSON object. Key order is not guaranteed.
pub fn convert_map_to_json_string<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let object: serde_json::Map<String, serde_json::Value> = entries
        .into_iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    serde_json::Value::Object(object).to_string()
}

/// Render each entry as a `--key=value` command-line argument.
pub fn convert_map_to_args<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    entries
        .into_iter()
        .map(|(k, v)| format!("--{k}={v}"))
        .collect()
}
