//! Coercion of driver values into Rust field types
//!
//! Every destination kind accepts its native driver value directly and
//! otherwise goes through the textual form of the value, so a `"42"` coming
//! from a text column still lands in an integer field.

use crate::types::SqlValue;
use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// The one textual timestamp layout accepted for temporal fields
/// (`2016-01-02 15:04:05.123+00`, offset minutes optional).
pub const TIMESTAMP_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// Layout used when a timestamp is rendered back to text; readable by `TIMESTAMP_LAYOUT`.
pub const TIMESTAMP_OUTPUT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// Conversion errors raised while scanning a driver value into a field
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("unsupported conversion: {from} value {value:?} into {to}")]
    TypeMismatch {
        from: &'static str,
        to: &'static str,
        value: String,
    },

    #[error("parsing timestamp {value:?} with layout {layout:?}: {message}")]
    TimestampParse {
        value: String,
        layout: &'static str,
        message: String,
    },
}

impl ConversionError {
    fn mismatch(value: &SqlValue, to: &'static str) -> Self {
        ConversionError::TypeMismatch {
            from: value.kind(),
            to,
            value: value.as_text().unwrap_or_default(),
        }
    }
}

/// Types that can be populated from a single driver value.
///
/// Implement it on a custom type to make it self-scanning.
pub trait FromSqlValue: Sized {
    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError>;
}

fn parse_text<T: std::str::FromStr>(value: &SqlValue, to: &'static str) -> Result<T, ConversionError> {
    let text = value
        .as_text()
        .ok_or_else(|| ConversionError::mismatch(value, to))?;
    text.trim()
        .parse::<T>()
        .map_err(|_| ConversionError::mismatch(value, to))
}

macro_rules! int_from_sql_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromSqlValue for $ty {
                fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
                    match value {
                        SqlValue::Int(i) => <$ty>::try_from(*i)
                            .map_err(|_| ConversionError::mismatch(value, stringify!($ty))),
                        // `3.0` renders as "3"; fractional or out-of-range values fail to parse
                        SqlValue::Float(_)
                        | SqlValue::Text(_)
                        | SqlValue::Bytes(_)
                        | SqlValue::Json(_) => {
                            parse_text(value, stringify!($ty))
                        }
                        _ => Err(ConversionError::mismatch(value, stringify!($ty))),
                    }
                }
            }
        )*
    };
}

int_from_sql_value!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

macro_rules! float_from_sql_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromSqlValue for $ty {
                fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
                    match value {
                        SqlValue::Float(f) => Ok(*f as $ty),
                        SqlValue::Int(i) => Ok(*i as $ty),
                        SqlValue::Text(_) | SqlValue::Bytes(_) | SqlValue::Json(_) => {
                            parse_text(value, stringify!($ty))
                        }
                        _ => Err(ConversionError::mismatch(value, stringify!($ty))),
                    }
                }
            }
        )*
    };
}

float_from_sql_value!(f32, f64);

impl FromSqlValue for bool {
    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Int(0) => Ok(false),
            SqlValue::Int(1) => Ok(true),
            SqlValue::Text(_) | SqlValue::Bytes(_) | SqlValue::Json(_) => {
                let text = value.as_text().unwrap_or_default().to_ascii_lowercase();
                match text.trim() {
                    "t" | "true" | "1" | "y" | "yes" | "on" => Ok(true),
                    "f" | "false" | "0" | "n" | "no" | "off" => Ok(false),
                    _ => Err(ConversionError::mismatch(value, "bool")),
                }
            }
            _ => Err(ConversionError::mismatch(value, "bool")),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        value
            .as_text()
            .ok_or_else(|| ConversionError::mismatch(value, "String"))
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Bytes(b) => Ok(b.clone()),
            SqlValue::Text(s) => Ok(s.clone().into_bytes()),
            _ => Err(ConversionError::mismatch(value, "Vec<u8>")),
        }
    }
}

fn parse_timestamp(value: &SqlValue) -> Result<DateTime<Utc>, ConversionError> {
    let text = value.as_text().unwrap_or_default();
    DateTime::parse_from_str(text.trim(), TIMESTAMP_LAYOUT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ConversionError::TimestampParse {
            value: text,
            layout: TIMESTAMP_LAYOUT,
            message: e.to_string(),
        })
}

impl FromSqlValue for DateTime<Utc> {
    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Timestamp(ts) => Ok(*ts),
            SqlValue::Text(_) | SqlValue::Bytes(_) => parse_timestamp(value),
            _ => Err(ConversionError::mismatch(value, "DateTime<Utc>")),
        }
    }
}

impl FromSqlValue for NaiveDateTime {
    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Timestamp(ts) => Ok(ts.naive_utc()),
            SqlValue::Text(_) | SqlValue::Bytes(_) => parse_timestamp(value).map(|ts| ts.naive_utc()),
            _ => Err(ConversionError::mismatch(value, "NaiveDateTime")),
        }
    }
}

impl FromSqlValue for Uuid {
    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Uuid(u) => Ok(*u),
            SqlValue::Text(_) | SqlValue::Bytes(_) => parse_text(value, "Uuid"),
            _ => Err(ConversionError::mismatch(value, "Uuid")),
        }
    }
}

impl FromSqlValue for serde_json::Value {
    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        use serde_json::Value;

        match value {
            SqlValue::Null => Ok(Value::Null),
            SqlValue::Json(v) => Ok(v.clone()),
            SqlValue::Bool(b) => Ok(Value::Bool(*b)),
            SqlValue::Int(i) => Ok(Value::from(*i)),
            SqlValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .ok_or_else(|| ConversionError::mismatch(value, "serde_json::Value")),
            SqlValue::Text(s) => Ok(Value::String(s.clone())),
            SqlValue::Bytes(b) => serde_json::from_slice(b)
                .map_err(|_| ConversionError::mismatch(value, "serde_json::Value")),
            SqlValue::Timestamp(_) | SqlValue::Uuid(_) => {
                Ok(Value::String(value.as_text().unwrap_or_default()))
            }
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_sql_value(value).map(Some)
    }
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text_into_integer() {
        let value = SqlValue::Text("42".to_string());
        assert_eq!(i32::from_sql_value(&value), Ok(42));
        assert_eq!(u64::from_sql_value(&value), Ok(42));
        assert_eq!(i64::from_sql_value(&SqlValue::Bytes(b" 7".to_vec())), Ok(7));
    }

    #[test]
    fn test_garbage_into_integer_is_type_mismatch() {
        let value = SqlValue::Text("forty-two".to_string());
        match i32::from_sql_value(&value) {
            Err(ConversionError::TypeMismatch { from, to, value }) => {
                assert_eq!(from, "text");
                assert_eq!(to, "i32");
                assert_eq!(value, "forty-two");
            }
            other => panic!("Expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_overflow_is_type_mismatch() {
        assert!(matches!(
            i8::from_sql_value(&SqlValue::Int(300)),
            Err(ConversionError::TypeMismatch { .. })
        ));
        assert!(matches!(
            u32::from_sql_value(&SqlValue::Int(-1)),
            Err(ConversionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_integral_float_into_integer() {
        assert_eq!(i32::from_sql_value(&SqlValue::Float(3.0)), Ok(3));
        assert_eq!(u8::from_sql_value(&SqlValue::Float(255.0)), Ok(255));

        match i32::from_sql_value(&SqlValue::Float(3.5)) {
            Err(ConversionError::TypeMismatch { from, to, value }) => {
                assert_eq!(from, "float");
                assert_eq!(to, "i32");
                assert_eq!(value, "3.5");
            }
            other => panic!("Expected TypeMismatch, got {:?}", other),
        }
        assert!(u8::from_sql_value(&SqlValue::Float(256.0)).is_err());
        assert!(i64::from_sql_value(&SqlValue::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_null_only_fits_optional() {
        assert_eq!(Option::<i32>::from_sql_value(&SqlValue::Null), Ok(None));
        assert_eq!(Option::<i32>::from_sql_value(&SqlValue::Int(3)), Ok(Some(3)));
        assert!(String::from_sql_value(&SqlValue::Null).is_err());
        assert!(i64::from_sql_value(&SqlValue::Null).is_err());
    }

    #[test]
    fn test_floats_and_bools() {
        assert_eq!(f64::from_sql_value(&SqlValue::Text("120.50".into())), Ok(120.5));
        assert_eq!(f32::from_sql_value(&SqlValue::Int(2)), Ok(2.0));
        assert_eq!(bool::from_sql_value(&SqlValue::Text("t".into())), Ok(true));
        assert_eq!(bool::from_sql_value(&SqlValue::Text("FALSE".into())), Ok(false));
        assert!(bool::from_sql_value(&SqlValue::Text("maybe".into())).is_err());
    }

    #[test]
    fn test_strings_accept_every_kind() {
        assert_eq!(String::from_sql_value(&SqlValue::Int(5)), Ok("5".to_string()));
        assert_eq!(String::from_sql_value(&SqlValue::Bool(true)), Ok("true".to_string()));
        assert_eq!(
            String::from_sql_value(&SqlValue::Bytes(b"abc".to_vec())),
            Ok("abc".to_string())
        );
    }

    #[test]
    fn test_timestamp_layout() {
        let want = Utc.with_ymd_and_hms(2016, 1, 2, 15, 4, 5).unwrap();
        let parsed = DateTime::<Utc>::from_sql_value(&SqlValue::Text("2016-01-02 15:04:05+00".into()));
        assert_eq!(parsed, Ok(want));

        let parsed = DateTime::<Utc>::from_sql_value(&SqlValue::Text("2016-01-02 17:04:05+02:00".into()));
        assert_eq!(parsed, Ok(want));

        // Rendered text parses back
        let text = SqlValue::Timestamp(want).as_text().unwrap();
        assert_eq!(DateTime::<Utc>::from_sql_value(&SqlValue::Text(text)), Ok(want));
    }

    #[test]
    fn test_timestamp_wrong_layout_is_parse_error() {
        let result = DateTime::<Utc>::from_sql_value(&SqlValue::Text("02/01/2016".into()));
        assert!(matches!(result, Err(ConversionError::TimestampParse { .. })));
    }

    #[test]
    fn test_uuid_and_json() {
        let id = Uuid::new_v4();
        assert_eq!(Uuid::from_sql_value(&SqlValue::Text(id.to_string())), Ok(id));
        assert_eq!(
            serde_json::Value::from_sql_value(&SqlValue::Int(9)),
            Ok(serde_json::json!(9))
        );
    }
}
