//! Opaque pagination cursor
//!
//! A cursor snapshots the query state needed to rebuild a page: fields,
//! filters, order, limit and offset. It travels as URL-safe base64 of a
//! five record JSON array:
//!
//! ```text
//! [["id","name"], [["child",">=",1]], ["name"], 10, 20]
//! ```

use super::filter::Filter;
use crate::errors::QueryError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const RECORD_COUNT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    pub(crate) fields: Vec<String>,
    pub(crate) filters: Vec<Filter>,
    pub(crate) order_by: Vec<String>,
    pub(crate) limit: i64,
    pub(crate) offset: i64,
}

impl Cursor {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order_by(&self) -> &[String] {
        &self.order_by
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn encode(&self) -> String {
        let filters: Vec<Value> = self
            .filters
            .iter()
            .map(|f| {
                Value::Array(vec![
                    Value::String(f.field.clone()),
                    Value::String(f.op.clone()),
                    f.value.clone(),
                ])
            })
            .collect();

        let records = Value::Array(vec![
            string_list(&self.fields),
            Value::Array(filters),
            string_list(&self.order_by),
            Value::from(self.limit),
            Value::from(self.offset),
        ]);

        URL_SAFE_NO_PAD.encode(records.to_string())
    }

    pub fn decode(encoded: &str) -> Result<Self, QueryError> {
        let body = URL_SAFE_NO_PAD
            .decode(encoded.trim())
            .map_err(|e| QueryError::MalformedCursor(format!("invalid base64: {}", e)))?;

        let records: Vec<Value> = serde_json::from_slice(&body)
            .map_err(|_| QueryError::MalformedCursor("body is not a record list".to_string()))?;
        if records.len() < RECORD_COUNT {
            return Err(QueryError::MalformedCursor(format!(
                "expected {} records, found {}",
                RECORD_COUNT,
                records.len()
            )));
        }

        Ok(Cursor {
            fields: parse_string_list(&records[0], "fields")?,
            filters: parse_filters(&records[1])?,
            order_by: parse_string_list(&records[2], "order by")?,
            limit: parse_integer(&records[3], "limit")?,
            offset: parse_integer(&records[4], "offset")?,
        })
    }
}

fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

fn parse_string_list(record: &Value, name: &str) -> Result<Vec<String>, QueryError> {
    let malformed = || QueryError::MalformedCursor(format!("{} record is not a list of names", name));
    record
        .as_array()
        .ok_or_else(malformed)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(malformed))
        .collect()
}

fn parse_filters(record: &Value) -> Result<Vec<Filter>, QueryError> {
    let malformed = || QueryError::MalformedCursor("filters record is not a list of triples".to_string());
    record
        .as_array()
        .ok_or_else(malformed)?
        .iter()
        .map(|item| match item.as_array().map(Vec::as_slice) {
            Some([Value::String(field), Value::String(op), value]) => Ok(Filter {
                field: field.clone(),
                op: op.clone(),
                value: value.clone(),
            }),
            _ => Err(malformed()),
        })
        .collect()
}

fn parse_integer(record: &Value, name: &str) -> Result<i64, QueryError> {
    record
        .as_i64()
        .ok_or_else(|| QueryError::MalformedCursor(format!("{} is not an integer", name)))
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Cursor {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cursor::decode(s)
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.encode()
    }
}

impl TryFrom<String> for Cursor {
    type Error = QueryError;

    fn try_from(encoded: String) -> Result<Self, Self::Error> {
        Cursor::decode(&encoded)
    }
}

impl serde::Serialize for Cursor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> serde::Deserialize<'de> for Cursor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Cursor::decode(&encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Cursor {
        Cursor {
            fields: vec!["id".into(), "name".into()],
            filters: vec![
                Filter::new("name", ">=", "a,b;c\nd"),
                Filter::new("child", "<", 120.5),
            ],
            order_by: vec!["name".into()],
            limit: 10,
            offset: 20,
        }
    }

    #[test]
    fn test_encode_decode_preserves_state() {
        let cursor = sample();
        let encoded = cursor.encode();

        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+') && !encoded.contains('/'));
        assert_eq!(Cursor::decode(&encoded).unwrap(), cursor);
        assert_eq!(encoded.parse::<Cursor>().unwrap(), cursor);
    }

    #[test]
    fn test_empty_cursor_round_trips() {
        let cursor = Cursor::default();
        assert_eq!(Cursor::decode(&cursor.to_string()).unwrap(), cursor);
    }

    #[test]
    fn test_malformed_inputs() {
        let cases = [
            "not base64 at all!".to_string(),
            String::new(),
            URL_SAFE_NO_PAD.encode("{\"a\":1}"),
            URL_SAFE_NO_PAD.encode("[[],[],[]]"),
            URL_SAFE_NO_PAD.encode("[[],[],[],\"ten\",0]"),
            URL_SAFE_NO_PAD.encode("[[],[],[],10,1.5]"),
            URL_SAFE_NO_PAD.encode("[[1],[],[],10,0]"),
            URL_SAFE_NO_PAD.encode("[[],[[\"id\",\"=\"]],[],10,0]"),
        ];

        for case in cases {
            assert!(
                matches!(Cursor::decode(&case), Err(QueryError::MalformedCursor(_))),
                "Should reject: {}",
                case
            );
        }
    }

    #[test]
    fn test_serde_as_string() {
        let cursor = sample();
        let json = serde_json::to_value(&cursor).unwrap();
        assert_eq!(json, json!(cursor.encode()));

        let back: Cursor = serde_json::from_value(json).unwrap();
        assert_eq!(back, cursor);
    }
}
