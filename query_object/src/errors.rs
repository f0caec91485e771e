use thiserror::Error;
use type_mapping::ConversionError;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("field {field} doesn't exist on table {table}")]
    UnknownField { table: String, field: String },

    #[error("filter op {0} is not supported")]
    UnsupportedOperator(String),

    #[error("malformed cursor: {0}")]
    MalformedCursor(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("destination has {available} fields, {required} columns need a target")]
    InsufficientFields { required: usize, available: usize },

    #[error("destination must be a mutable reference to a struct")]
    NotAPointer,

    /// End of a result set; the expected way an iteration stops.
    #[error("no more rows")]
    Done,

    /// `seek_last` was asked to move while already on the last page.
    #[error("already on the last page")]
    LastPage,

    #[error("offset {offset} with limit {limit} steps before the first page")]
    OutOfRange { offset: i64, limit: i64 },

    #[error("query returned no rows")]
    RowNotFound,

    #[error("expected {expected} arguments, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    #[error("field {0} is a primary key and cannot be updated")]
    PrimaryKeyUpdate(String),

    #[error("column {column} has unsupported type {type_name}")]
    UnsupportedColumnType { column: String, type_name: String },

    #[error("nothing to update: no field was set")]
    NothingToUpdate,

    #[error("invalid table: {0}")]
    InvalidTable(String),

    #[error("key rank {rank} conflicts between field {existing} and {field}")]
    PrimaryKeyConflict {
        rank: u8,
        existing: String,
        field: String,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl QueryError {
    /// True for the end-of-data sentinel returned by `List::next`
    pub fn is_done(&self) -> bool {
        matches!(self, QueryError::Done)
    }

    /// True when a driver value could not be coerced into its destination type
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            QueryError::Conversion(ConversionError::TypeMismatch { .. })
        )
    }

    pub(crate) fn unknown_field(table: &str, field: &str) -> Self {
        QueryError::UnknownField {
            table: table.to_string(),
            field: field.to_string(),
        }
    }
}
