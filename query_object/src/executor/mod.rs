//! Executor capability
//!
//! Every operation that touches the database takes an executor explicitly.
//! `PgExecutor` runs statements on a `sqlx` pool; tests use an in-memory one.

pub mod pg;
pub mod row;

#[cfg(test)]
pub(crate) mod memory;

pub use pg::PgExecutor;
pub use row::Row;

use crate::errors::QueryError;
use async_trait::async_trait;
use serde_json::Value;

/// Forward-only stream of result rows
#[async_trait]
pub trait RowStream: Send {
    /// Next row, `None` once the stream is exhausted
    async fn next_row(&mut self) -> Result<Option<Row>, QueryError>;

    /// Release the stream. Calling it again is a no-op.
    async fn close(&mut self) -> Result<(), QueryError>;
}

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a statement and stream its rows
    async fn query<'a>(
        &'a self,
        sql: &str,
        args: &[Value],
    ) -> Result<Box<dyn RowStream + 'a>, QueryError>;

    /// First row of a statement, `RowNotFound` when there is none
    async fn query_row(&self, sql: &str, args: &[Value]) -> Result<Row, QueryError>;

    /// Run a statement and return the number of rows affected
    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, QueryError>;
}
