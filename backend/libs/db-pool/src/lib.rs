//! PostgreSQL connection pool management
//!
//! Builds a verified `PgPool` from environment configuration and keeps the
//! pool gauges in `metrics` up to date.

mod metrics;

pub use metrics::update_pool_metrics;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors raised while reading pool configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} not set")]
    Missing(&'static str),

    #[error("environment variable {key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("min_connections ({min}) exceeds max_connections ({max})")]
    InvertedBounds { min: u32, max: u32 },
}

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    /// Service name for metrics labeling
    pub service_name: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Timeout for the verification query after connecting
    pub connect_timeout_secs: u64,
    /// Timeout for acquiring a connection from the pool
    pub acquire_timeout_secs: u64,
    /// Connection idle timeout
    pub idle_timeout_secs: u64,
    /// Connection maximum lifetime
    pub max_lifetime_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            database_url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl DbConfig {
    /// Read pool settings from `DATABASE_URL` and the `DB_*` overrides.
    ///
    /// Unset overrides fall back to [`DbConfig::default`]; set but unparsable
    /// overrides are rejected rather than silently ignored.
    pub fn from_env(service_name: &str) -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let defaults = Self::default();

        let config = Self {
            service_name: service_name.to_string(),
            database_url,
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: env_or("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout_secs: env_or("DB_CONNECT_TIMEOUT_SECS", defaults.connect_timeout_secs)?,
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout_secs)?,
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            max_lifetime_secs: env_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs)?,
        };

        if config.min_connections > config.max_connections {
            return Err(ConfigError::InvertedBounds {
                min: config.min_connections,
                max: config.max_connections,
            });
        }

        Ok(config)
    }

    /// Log pool configuration details
    pub fn log_config(&self) {
        info!(
            service = %self.service_name,
            "Database Pool Configuration: \
             max_connections={}, min_connections={}, \
             connect_timeout={}s, acquire_timeout={}s, idle_timeout={}s, max_lifetime={}s",
            self.max_connections,
            self.min_connections,
            self.connect_timeout_secs,
            self.acquire_timeout_secs,
            self.idle_timeout_secs,
            self.max_lifetime_secs
        );
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

/// Create a PostgreSQL connection pool and verify it with `SELECT 1`
pub async fn create_pool(config: DbConfig) -> Result<PgPool, sqlx::Error> {
    debug!(
        "Creating database pool: service={}, max={}, min={}, acquire_timeout={}s",
        config.service_name,
        config.max_connections,
        config.min_connections,
        config.acquire_timeout_secs,
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(&config.database_url)
        .await?;

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        sqlx::query("SELECT 1").execute(&pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!(
                service = %config.service_name,
                "Database pool created and verified successfully"
            );

            update_pool_metrics(&pool, &config.service_name);

            let pool_clone = pool.clone();
            let service = config.service_name.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(30));
                loop {
                    interval.tick().await;
                    if pool_clone.is_closed() {
                        break;
                    }
                    update_pool_metrics(&pool_clone, &service);
                }
            });

            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(
                service = %config.service_name,
                error = %e,
                "Database connection verification failed"
            );
            Err(e)
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Database verification timeout",
            )))
        }
    }
}
