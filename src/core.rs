//! Core Pagehaus functionality
//!
//! This module contains the `Pagehaus` coordinator: one connection pool, the
//! executor over it, and the paging defaults new statements start from.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::PagehausError;
use config::{AppConfig, DatabaseConfig, PagingConfig};
use query_object::{PgExecutor, Select, Table, TableMetadata, Tabler, Update};

/// Main Pagehaus coordinator
pub struct Pagehaus {
    executor: PgExecutor,
    paging: PagingConfig,
}

impl Pagehaus {
    /// Connect using the database section and keep the paging defaults
    pub async fn new(config: AppConfig) -> Result<Self, PagehausError> {
        let pool = Self::connect(&config.database).await?;
        Ok(Self::from_pool(pool, config.paging))
    }

    /// Load configuration from `$PAGEHAUS_CONFIG` or `./pagehaus.toml` and connect
    pub async fn from_env() -> Result<Self, PagehausError> {
        Self::new(AppConfig::load()?).await
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool, paging: PagingConfig) -> Self {
        Self {
            executor: PgExecutor::new(pool),
            paging,
        }
    }

    async fn connect(config: &DatabaseConfig) -> Result<PgPool, PagehausError> {
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        debug_log!("Connecting to {}:{}/{}", config.host, config.port, config.database);
        Ok(pool_options.connect(&connection_string).await?)
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        self.executor.pool()
    }

    /// Executor statements run through
    pub fn executor(&self) -> &PgExecutor {
        &self.executor
    }

    pub fn paging(&self) -> &PagingConfig {
        &self.paging
    }

    /// New select over `T` seeded with the paging defaults
    pub fn select<T: TableMetadata>(&self) -> Result<Select, PagehausError> {
        let select = Select::of::<T>(self.paging.explicit_fields)?;
        Ok(select.with_limit(self.paging.default_limit))
    }

    /// New update / insert / delete builder over `T`
    pub fn update<T: TableMetadata>(&self) -> Result<Update, PagehausError> {
        let table: Arc<dyn Tabler> = Arc::new(Table::of::<T>()?);
        Ok(Update::new(table))
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), PagehausError> {
        sqlx::query("SELECT 1").fetch_one(self.pool()).await?;
        Ok(())
    }
}
