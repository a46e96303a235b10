//! Configuration loaded from environment variables.

use std::env;

use database::Database;

/// Default SQLite database URL.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:exchange.db?mode=rwc";

/// Exchange service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// SQLite database URL.
    pub database_url: String,
    /// Maximum number of pooled database connections.
    pub pool_size: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            pool_size: Database::DEFAULT_POOL_SIZE,
        }
    }
}

impl ExchangeConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `EXCHANGE_DATABASE_URL` | SQLite database URL | `sqlite:exchange.db?mode=rwc` |
    /// | `EXCHANGE_DB_POOL_SIZE` | Connection pool size | `20` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("EXCHANGE_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let pool_size = match lookup("EXCHANGE_DB_POOL_SIZE") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ConfigError::InvalidPoolSize(raw)),
            },
            None => Database::DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            database_url,
            pool_size,
        })
    }

    /// Connect to the configured database and run migrations.
    pub async fn connect(&self) -> database::Result<Database> {
        let db = Database::connect_with_pool_size(&self.database_url, self.pool_size).await?;
        db.migrate().await?;
        Ok(db)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("EXCHANGE_DB_POOL_SIZE must be a positive integer, got {0:?}")]
    InvalidPoolSize(String),
}
