/// Posts Service Library
///
/// A server-rendered CRUD application for blog posts. One controller talks to
/// a storage-agnostic repository; the backing engine (Redis, MongoDB,
/// PostgreSQL or process memory) is chosen once at startup.
///
/// # Modules
///
/// - `handlers`: HTTP controller, health and route registration
/// - `repository`: `PostRepository` contract and its storage adapters
/// - `models`: posts, ids, form validation and pagination
/// - `views`: HTML rendering
/// - `flash`: one-shot status messages across redirects
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors and exposition
pub mod config;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod repository;
pub mod views;

pub use config::Config;
pub use error::{AppError, Result};
pub use repository::{PostRepository, RepositoryError};
