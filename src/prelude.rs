//! Convenience re-exports for common Pagehaus usage
//!
//! This prelude module re-exports the most commonly used items from the Pagehaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use pagehaus::prelude::*;
//!
//! // Now you have access to the coordinator, the builders and the derive
//! ```

// Core Pagehaus components
pub use crate::core::Pagehaus;
pub use crate::errors::PagehausError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, PagingConfig};

// Re-export commonly used query-object types for convenience
pub use query_object::prelude::*;

// Re-export query_object module for derive-generated code
pub use query_object;

// Re-export table derive for descriptor creation
pub use table_derive::Table;

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;

// Commonly used value types
pub use chrono::{DateTime, NaiveDateTime, Utc};
pub use uuid::Uuid;
