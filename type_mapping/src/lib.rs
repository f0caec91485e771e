//! Unified value mapping between PostgreSQL driver values and Rust types
//! This crate provides the value model and coercion rules used across the pagehaus ecosystem

pub mod coerce;
pub mod serialize;
pub mod types;

// Re-export commonly used items
pub use coerce::{ConversionError, FromSqlValue, TIMESTAMP_LAYOUT};
pub use serialize::{json_to_sql_value, serialize_to_fields};
pub use types::SqlValue;
