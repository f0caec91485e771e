//! Serialization utilities
//!
//! This module maps JSON argument values and serializable records
//! onto the driver value model.

use crate::types::SqlValue;
use serde::Serialize;
use std::collections::HashMap;

/// Map a JSON argument onto the driver value it will be bound as
pub fn json_to_sql_value(value: &serde_json::Value) -> SqlValue {
    match value {
        serde_json::Value::String(s) => {
            // Try to parse as RFC3339 timestamp first
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
                SqlValue::Timestamp(dt.with_timezone(&chrono::Utc))
            } else if let Ok(uuid) = uuid::Uuid::parse_str(s) {
                SqlValue::Uuid(uuid)
            } else {
                SqlValue::Text(s.clone())
            }
        }
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                SqlValue::Float(f)
            } else {
                SqlValue::Text(n.to_string())
            }
        }
        serde_json::Value::Bool(b) => SqlValue::Bool(*b),
        serde_json::Value::Null => SqlValue::Null,
        other => SqlValue::Json(other.clone()),
    }
}

/// Serialize a record into its top-level fields, keyed by lower-cased field name
pub fn serialize_to_fields<T: Serialize>(
    data: &T,
) -> Result<HashMap<String, serde_json::Value>, serde_json::Error> {
    let mut fields = HashMap::new();

    if let serde_json::Value::Object(map) = serde_json::to_value(data)? {
        for (key, value) in map {
            fields.insert(key.to_lowercase(), value);
        }
    }

    Ok(fields)
}
