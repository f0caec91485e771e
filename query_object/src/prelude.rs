//! Convenience re-exports for common query-object usage

// Descriptor and binder traits
pub use crate::traits::{ScanArgs, TableMetadata, Tabler};

// Error types
pub use crate::errors::QueryError;

// Statement building and pagination
pub use crate::query_builder::{Cursor, Filter, FilterSet, List, Operator, Select, Update};
pub use crate::table::{Table, TableBuilder};

// Execution
pub use crate::executor::{PgExecutor, QueryExecutor, Row, RowStream};

// Driver values
pub use type_mapping::{FromSqlValue, SqlValue};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use serde_json::{json, Value};
pub use sqlx::PgPool;
