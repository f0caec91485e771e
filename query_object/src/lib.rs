//! Query Object - table-aware statements, cursor pagination and row materialization
//!
//! This crate provides the entity descriptor, the SELECT / UPDATE / INSERT /
//! DELETE builders, the opaque pagination cursor, and the executor capability
//! rows are fetched through.

#[macro_use]
mod logging;

pub mod errors;
pub mod executor;
pub mod materialize;
pub mod prelude;
pub mod query_builder;
pub mod table;
pub mod traits;
pub mod validation;

// Derived code names this crate by path, including inside its own tests
extern crate self as query_object;

pub use errors::QueryError;
pub use executor::{PgExecutor, QueryExecutor, Row, RowStream};
pub use materialize::{scan_row, FieldRegistry};
pub use query_builder::{
    Cursor, Filter, FilterSet, FragmentBuilder, List, Operator, PqFragments, Select, Update, PQ,
};
pub use table::{Table, TableBuilder};
pub use traits::{ScanArgs, TableMetadata, Tabler};
pub use type_mapping::{ConversionError, FromSqlValue, SqlValue};
pub use validation::{validate_identifier, ValidationError};
