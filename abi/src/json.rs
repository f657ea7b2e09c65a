//! Accessors over decoded RPC payloads. Every accessor returns `Option` so
//! callers pick their own fallback.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Reads integers that the node encodes either as JSON numbers or as strings.
pub fn as_u128(value: &Value) -> Option<u128> {
    match value {
        Value::Number(n) => n.as_u64().map(u128::from),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

pub fn page_data(result: &Value) -> Option<&Vec<Value>> {
    result.get("data").and_then(Value::as_array)
}

/// Sender of a transaction block or event, wherever the node put it.
pub fn sender_of(entry: &Value) -> Option<&str> {
    str_field(entry, "sender").or_else(|| {
        entry
            .pointer("/transaction/data/sender")
            .and_then(Value::as_str)
    })
}

pub fn timestamp_of(entry: &Value) -> Option<DateTime<Utc>> {
    let millis = entry.get("timestampMs").and_then(as_u128)?;
    DateTime::from_timestamp_millis(i64::try_from(millis).ok()?)
}

pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
