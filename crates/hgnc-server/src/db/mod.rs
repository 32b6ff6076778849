//! Database pool and schema management
//!
//! The store is SQLite accessed through `sqlx`. In-memory databases live only
//! as long as their connection, so pools for `sqlite::memory:` URLs are pinned
//! to a single connection that is never recycled.

pub mod schema;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// The store could not be opened or reached
    #[error("Cannot connect to database '{url}': {reason}")]
    Connection { url: String, reason: String },

    /// Database configuration is invalid
    #[error("Database configuration error: {0}. Check DATABASE_URL.")]
    Config(String),

    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: crate::config::DEFAULT_DATABASE_URL.to_string(),
            max_connections: crate::config::DEFAULT_DATABASE_MAX_CONNECTIONS,
            connect_timeout_secs: crate::config::DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Open a connection pool
///
/// Every connection enforces foreign keys and matches `LIKE` case-sensitively.
pub async fn create_pool(config: &DbConfig) -> DbResult<SqlitePool> {
    if config.url.trim().is_empty() {
        return Err(DbError::Config("database URL is empty".to_string()));
    }

    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| DbError::Config(format!("invalid database URL '{}': {}", config.url, e)))?
        .create_if_missing(true)
        .foreign_keys(true)
        .pragma("case_sensitive_like", "ON");

    let mut pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs));

    pool_options = if config.is_in_memory() {
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(config.max_connections)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| DbError::Connection {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;

    tracing::debug!(url = %config.url, "Database pool created");

    Ok(pool)
}

pub async fn health_check(pool: &SqlitePool) -> DbResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
