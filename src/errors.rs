//! Error types for the Pagehaus crate
//!
//! This module contains all error types that can be returned by Pagehaus operations.

use config::ConfigError;
use query_object::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PagehausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PagehausError {
    /// End of a result stream, as opposed to a failure
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Query(e) if e.is_done())
    }
}
