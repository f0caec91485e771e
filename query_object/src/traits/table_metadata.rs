//! Trait definitions
//!
//! This module defines the entity descriptor every query is built against.

use crate::errors::QueryError;
use crate::table::Table;
use std::fmt::Debug;

/// Describes a table: its name, its columns and its ordered primary key.
///
/// Names are lower-case; primary key columns are ordered by rank and are
/// always a subset of `fields`.
pub trait Tabler: Send + Sync + Debug {
    /// The table name in the database
    fn table_name(&self) -> &str;

    /// All column names, in declaration order
    fn fields(&self) -> &[String];

    /// Primary key column names, ordered by rank
    fn primary_keys(&self) -> &[String];

    fn has_field(&self, field: &str) -> bool {
        self.fields().iter().any(|f| f == field)
    }

    fn is_primary_key(&self, field: &str) -> bool {
        self.primary_keys().iter().any(|f| f == field)
    }
}

/// Static description of a record type, usually derived with `#[derive(Table)]`.
///
/// ```ignore
/// #[derive(Debug, Default, Table)]
/// #[table(name = "emp")]
/// pub struct Emp {
///     #[pk(1)]
///     pub id: String,
///     pub name: String,
///     pub child: i32,
/// }
/// ```
pub trait TableMetadata {
    /// The table name in the database
    const TABLE_NAME: &'static str;

    /// Column names, in declaration order
    const FIELDS: &'static [&'static str];

    /// Primary key column names, ordered by rank
    const PRIMARY_KEYS: &'static [&'static str];

    /// Build the runtime descriptor for this record type
    fn describe() -> Result<Table, QueryError> {
        Table::from_parts(Self::TABLE_NAME, Self::FIELDS, Self::PRIMARY_KEYS)
    }
}
