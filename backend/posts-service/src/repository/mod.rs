mod document_repository;
mod error;
mod instrumented_repository;
mod memory_repository;
mod postgres_repository;
pub mod push_id;
mod realtime_repository;
mod r#trait;

pub use document_repository::DocumentPostRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use instrumented_repository::InstrumentedPostRepository;
pub use memory_repository::InMemoryPostRepository;
pub use postgres_repository::PostgresPostRepository;
pub use realtime_repository::RealtimePostRepository;
#[cfg(test)]
pub use r#trait::MockPostRepository;
pub use r#trait::PostRepository;

use crate::config::{StorageBackend, StorageConfig};
use anyhow::{anyhow, Context, Result};
use redis_utils::RedisPool;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the repository selected by configuration, wrapped with metrics.
///
/// Connection failures are fatal here; the process never falls back to
/// another backend.
pub async fn connect(storage: &StorageConfig) -> Result<Arc<dyn PostRepository>> {
    let repository: Arc<dyn PostRepository> = match storage.backend {
        StorageBackend::Relational => {
            let settings = storage
                .relational
                .as_ref()
                .ok_or_else(|| anyhow!("relational storage settings missing"))?;

            let db_config = db_pool::DbConfig::from_env("posts-service")
                .context("Invalid PostgreSQL pool configuration")?;
            db_config.log_config();
            let pool = db_pool::create_pool(db_config)
                .await
                .context("Failed to connect to PostgreSQL")?;

            let repo = PostgresPostRepository::new(pool);
            if settings.run_migrations {
                repo.migrate()
                    .await
                    .context("Failed to run database migrations")?;
                info!("Database migrations applied");
            }
            Arc::new(repo)
        }
        StorageBackend::Realtime => {
            let settings = storage
                .realtime
                .as_ref()
                .ok_or_else(|| anyhow!("realtime storage settings missing"))?;

            let pool = RedisPool::connect(&settings.url)
                .await
                .context("Failed to connect to Redis")?;
            let repo = RealtimePostRepository::new(pool.manager(), &settings.root)
                .with_context(|| format!("Invalid realtime root path '{}'", settings.root))?;
            info!(endpoint = %pool.endpoint(), root = %repo.root(), "Realtime store ready");
            Arc::new(repo)
        }
        StorageBackend::Document => {
            let settings = storage
                .document
                .as_ref()
                .ok_or_else(|| anyhow!("document storage settings missing"))?;

            let client = mongodb::Client::with_uri_str(&settings.uri)
                .await
                .context("Failed to create MongoDB client")?;
            let repo = DocumentPostRepository::new(&client, &settings.database, &settings.collection);
            if let Err(e) = repo.ensure_indexes().await {
                warn!(error = %e, "Failed to create posts listing index");
            }
            info!(
                database = %settings.database,
                collection = %settings.collection,
                "Document store ready"
            );
            Arc::new(repo)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; posts are lost on restart");
            Arc::new(InMemoryPostRepository::new())
        }
    };

    repository
        .health_check()
        .await
        .with_context(|| format!("{} backend health check failed", storage.backend))?;

    Ok(Arc::new(InstrumentedPostRepository::new(repository)))
}
