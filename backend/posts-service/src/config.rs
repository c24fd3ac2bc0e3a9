/// Configuration management for Posts Service
///
/// Settings come from environment variables (optionally seeded from a `.env`
/// file). Only the selected storage backend's connection settings are read.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Storage selection and listing settings
    pub storage: StorageConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Largest urlencoded form body accepted by create and update
    pub max_form_bytes: usize,
}

/// Which engine backs the post repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Hierarchical key-value store (Redis)
    Realtime,
    /// Document collection (MongoDB)
    Document,
    /// Relational table (PostgreSQL)
    Relational,
    /// Process-local map, for development and tests
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Realtime => "realtime",
            StorageBackend::Document => "document",
            StorageBackend::Relational => "relational",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "realtime" | "firebase" | "kv" | "redis" => Ok(StorageBackend::Realtime),
            "document" | "mongodb" | "mongo" => Ok(StorageBackend::Document),
            "relational" | "postgres" | "postgresql" | "sql" => Ok(StorageBackend::Relational),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Storage configuration; exactly one connection section is populated
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Posts per list page
    pub page_size: u64,
    pub relational: Option<RelationalConfig>,
    pub realtime: Option<RealtimeConfig>,
    pub document: Option<DocumentConfig>,
}

/// PostgreSQL settings; pool sizing is read by `db_pool::DbConfig`
#[derive(Debug, Clone)]
pub struct RelationalConfig {
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// Redis settings for the hierarchical store
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    pub url: String,
    /// Root node path under which posts are children
    pub root: String,
}

/// MongoDB settings
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Matches PHP's stock `post_max_size` of 8M
pub const DEFAULT_MAX_FORM_BYTES: usize = 8 * 1024 * 1024;
const MAX_PAGE_SIZE: u64 = 100;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let backend = match std::env::var("POSTS_STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageBackend::Relational,
        };

        if app_env.eq_ignore_ascii_case("production") && backend == StorageBackend::Memory {
            return Err("POSTS_STORAGE_BACKEND=memory is not allowed in production".to_string());
        }

        let page_size = parse_env_or_default("POSTS_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(format!(
                "POSTS_PAGE_SIZE must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            ));
        }

        let max_form_bytes = parse_env_or_default("POSTS_MAX_FORM_BYTES", DEFAULT_MAX_FORM_BYTES)?;
        if max_form_bytes == 0 {
            return Err("POSTS_MAX_FORM_BYTES must be greater than 0".to_string());
        }

        let mut storage = StorageConfig {
            backend,
            page_size,
            relational: None,
            realtime: None,
            document: None,
        };

        match backend {
            StorageBackend::Relational => {
                if std::env::var("DATABASE_URL").is_err() {
                    return Err("DATABASE_URL must be set for the relational backend".to_string());
                }
                storage.relational = Some(RelationalConfig {
                    run_migrations: parse_env_or_default("DATABASE_RUN_MIGRATIONS", true)?,
                });
            }
            StorageBackend::Realtime => {
                let root = std::env::var("POSTS_REALTIME_ROOT")
                    .unwrap_or_else(|_| "posts".to_string())
                    .trim_matches('/')
                    .to_string();
                if root.is_empty() {
                    return Err("POSTS_REALTIME_ROOT cannot be empty".to_string());
                }
                storage.realtime = Some(RealtimeConfig {
                    url: std::env::var("REDIS_URL")
                        .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                    root,
                });
            }
            StorageBackend::Document => {
                storage.document = Some(DocumentConfig {
                    uri: std::env::var("MONGODB_URI")
                        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
                    database: std::env::var("MONGODB_DATABASE")
                        .unwrap_or_else(|_| "posts_app".to_string()),
                    collection: std::env::var("MONGODB_COLLECTION")
                        .unwrap_or_else(|_| "posts".to_string()),
                });
            }
            StorageBackend::Memory => {}
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("POSTS_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("POSTS_SERVICE_PORT", 8080)?,
                max_form_bytes,
            },
            storage,
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
