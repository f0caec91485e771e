//! # Pagehaus
//!
//! Table-aware PostgreSQL statements with cursor pagination and row
//! materialization.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagehaus::prelude::*;
//!
//! #[derive(Debug, Default, Table)]
//! #[table(name = "emp")]
//! pub struct Emp {
//!     #[pk(1)]
//!     pub id: String,
//!     pub name: String,
//!     pub child: i32,
//!     pub joindate: DateTime<Utc>,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PagehausError> {
//!     let config = AppConfig {
//!         database: DatabaseConfig::new(
//!             "localhost".to_string(), 5432, "pagehaus".to_string(),
//!             "postgres".to_string(), "password".to_string(),
//!             1, 5, 30, 600, 3600,
//!         ),
//!         paging: PagingConfig::new(2, true),
//!     };
//!     let pagehaus = Pagehaus::new(config).await?;
//!
//!     let mut select = pagehaus.select::<Emp>()?;
//!     let mut list = select.get(pagehaus.executor()).await?;
//!     for emp in list.get_all::<Emp>().await? {
//!         println!("{} {}", emp.id, emp.name);
//!     }
//!
//!     // Hand the cursor to the caller, resume from it later
//!     if let Some(cursor) = list.cursor() {
//!         list.get_next(pagehaus.executor(), &cursor.to_string()).await?;
//!     }
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::Pagehaus;
pub use errors::PagehausError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, PagingConfig};

// Re-export internal crates used by the derive and public API
// These MUST be public for the generated code to resolve `query_object`
pub use query_object;
pub use table_derive;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use sqlx;
pub use async_trait;
