//! Date-aware codec for untyped payloads.
//!
//! # Responsibility
//! - Walk a dynamic value tree and turn `Date` nodes into canonical strings.
//! - Turn timestamp strings back into `Date` nodes on read, but only under
//!   allow-listed temporal field names.
//!
//! # Invariants
//! - A string becomes a date only if its key is allow-listed, it matches the
//!   timestamp shape, and it parses as a real instant.
//! - Array elements inherit the field name of the array that holds them.
//! - `Null` passes through unchanged at any depth.
//! - Object keys and array order/length are preserved.
//!
//! Typed entities should prefer `SerdeCodec` with explicit date fields; this
//! codec exists for free-form slices whose shape is not known statically.

use super::{iso8601, CodecResult, PayloadCodec};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Field names treated as temporal when decoding.
pub const TEMPORAL_FIELDS: &[&str] = &[
    "createdAt",
    "updatedAt",
    "dueDate",
    "completedAt",
    "startTime",
    "endTime",
    "deadline",
    "time",
    "date",
    "startDate",
    "endDate",
];

static TIMESTAMP_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("valid timestamp shape regex")
});

/// Dynamic value tree with a first-class date node.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<TemporalValue>),
    Object(BTreeMap<String, TemporalValue>),
}

impl TemporalValue {
    /// Builds an object node from `(key, value)` pairs.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, TemporalValue)>) -> Self {
        Self::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// Looks up a field on an object node.
    pub fn get(&self, key: &str) -> Option<&TemporalValue> {
        match self {
            Self::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Date(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl From<DateTime<Utc>> for TemporalValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<&str> for TemporalValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TemporalValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for TemporalValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for TemporalValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

/// Returns whether `name` is in the temporal allow-list.
pub fn is_temporal_field(name: &str) -> bool {
    TEMPORAL_FIELDS.contains(&name)
}

/// Returns whether `text` has the `YYYY-MM-DDTHH:MM:SS` prefix.
pub fn is_timestamp_shaped(text: &str) -> bool {
    TIMESTAMP_SHAPE_RE.is_match(text)
}

/// Converts a value tree into plain JSON, writing dates in canonical form.
pub fn encode(value: &TemporalValue) -> Value {
    match value {
        TemporalValue::Null => Value::Null,
        TemporalValue::Bool(flag) => Value::Bool(*flag),
        TemporalValue::Number(number) => Value::Number(number.clone()),
        TemporalValue::String(text) => Value::String(text.clone()),
        TemporalValue::Date(date) => Value::String(iso8601::format(date)),
        TemporalValue::Array(items) => Value::Array(items.iter().map(encode).collect()),
        TemporalValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), encode(value)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

/// Converts plain JSON into a value tree, restoring allow-listed dates.
pub fn decode(value: Value) -> TemporalValue {
    decode_node(value, None)
}

fn decode_node(value: Value, field: Option<&str>) -> TemporalValue {
    match value {
        Value::Null => TemporalValue::Null,
        Value::Bool(flag) => TemporalValue::Bool(flag),
        Value::Number(number) => TemporalValue::Number(number),
        Value::String(text) => decode_string(text, field),
        Value::Array(items) => TemporalValue::Array(
            items
                .into_iter()
                .map(|item| decode_node(item, field))
                .collect(),
        ),
        Value::Object(fields) => TemporalValue::Object(
            fields
                .into_iter()
                .map(|(key, value)| {
                    let decoded = decode_node(value, Some(key.as_str()));
                    (key, decoded)
                })
                .collect(),
        ),
    }
}

fn decode_string(text: String, field: Option<&str>) -> TemporalValue {
    let temporal = field.is_some_and(is_temporal_field);
    if !temporal || !is_timestamp_shaped(&text) {
        return TemporalValue::String(text);
    }
    match iso8601::parse(&text) {
        Some(date) => TemporalValue::Date(date),
        None => TemporalValue::String(text),
    }
}

/// `PayloadCodec` adapter over `encode`/`decode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateAwareCodec;

impl PayloadCodec<TemporalValue> for DateAwareCodec {
    fn encode(&self, value: &TemporalValue) -> CodecResult<Value> {
        Ok(encode(value))
    }

    fn decode(&self, payload: Value) -> CodecResult<TemporalValue> {
        Ok(decode(payload))
    }
}
