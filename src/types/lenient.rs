//! Shape-tolerant deserialization helpers for upstream analysis payloads.
//!
//! The detection engine hands over loosely typed JSON. Every helper here
//! accepts whatever value arrives and yields `None` (or an empty collection)
//! for anything it cannot interpret, so one malformed field never rejects
//! the whole document. Defaults are substituted later, at the graph and
//! export boundaries.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use tracing::debug;

/// Interpret a JSON value as a finite number.
///
/// Numeric strings are accepted ("90" compares as 90 upstream); anything
/// else, including non-finite values, is `None`.
pub fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Interpret a JSON value as an account identifier.
///
/// Link endpoints arrive either as a bare id or as an embedded node object
/// carrying an `id` field; both normalize to the bare id.
pub fn identifier_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("id").and_then(identifier_from_value),
        _ => None,
    }
}

/// Interpret a JSON value as a list of strings.
///
/// A single string counts as a one-element list. Non-string items are
/// skipped.
pub fn string_list_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

/// Numeric counter, kept in the representation it arrived in.
///
/// Integers stay integers and fractional or negative values pass through
/// untouched; only non-numeric input is `None`.
pub fn counter<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => Some(n),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .map(Number::from)
                .or_else(|_| s.parse::<i64>().map(Number::from))
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
        }
        _ => None,
    })
}

pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub fn identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(identifier_from_value(&value))
}

pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(string_list_from_value(&value))
}

/// A sequence of records. A record that cannot be read at all becomes
/// `T::default()`; a missing or non-array collection becomes empty.
pub fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                debug!(error = %e, "Malformed record replaced with defaults");
                T::default()
            })
        })
        .collect())
}

/// A single optional record. `null` and unreadable values are `None`.
pub fn record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}
