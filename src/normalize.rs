//! Conversion of [`MetadataValue`] trees into JSON-safe values.
//!
//! Normalization never fails: leaves without a valid JSON form fall back to
//! their string description.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

use crate::metadata::{Described, Metadata, MetadataValue};

/// Keys owned by the wire envelope. Metadata using one of them is shadowed
/// by the envelope field.
pub const RESERVED_KEYS: &[&str] = &[
    "label",
    "level",
    "severity",
    "message",
    "sourceLocation",
    "location",
    "timestamp",
];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Metadata keys that collide with the wire envelope, in key order.
pub fn reserved_collisions(metadata: &Metadata) -> Vec<&str> {
    metadata
        .keys()
        .map(String::as_str)
        .filter(|key| is_reserved(key))
        .collect()
}

/// Render a timestamp as `yyyy-MM-ddTHH:mm:ss.SSSZ` in UTC.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn normalize(value: &MetadataValue) -> Value {
    match value {
        MetadataValue::Text(s) => Value::String(s.clone()),
        MetadataValue::Described(d) => normalize_described(d),
        MetadataValue::List(items) => Value::Array(items.iter().map(normalize).collect()),
        MetadataValue::Map(entries) => Value::Object(normalize_metadata(entries)),
    }
}

pub fn normalize_metadata(metadata: &Metadata) -> Map<String, Value> {
    metadata
        .iter()
        .map(|(key, value)| (key.clone(), normalize(value)))
        .collect()
}

fn normalize_described(value: &Described) -> Value {
    match value {
        Described::Int(v) => Value::from(*v),
        Described::UInt(v) => Value::from(*v),
        Described::Bool(v) => Value::Bool(*v),
        // `Number::from_f64` rejects NaN and the infinities.
        Described::Float(v) => Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        Described::Timestamp(ts) => Value::String(format_timestamp(ts)),
        Described::Bytes(bytes) => Value::String(BASE64_STANDARD.encode(bytes)),
        Described::Other(s) => Value::String(s.clone()),
    }
}
