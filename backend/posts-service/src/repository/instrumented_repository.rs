//! Metrics decorator for post repositories
//!
//! Wraps any PostRepository implementation, timing each call and counting it
//! by outcome.

use super::error::{RepositoryError, RepositoryResult};
use super::r#trait::PostRepository;
use crate::config::StorageBackend;
use crate::metrics::repository::{
    REPOSITORY_OPERATIONS_TOTAL, REPOSITORY_OPERATION_DURATION_SECONDS,
};
use crate::models::{PageRequest, Post, PostDraft, PostId, PostPage};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

pub struct InstrumentedPostRepository {
    inner: Arc<dyn PostRepository>,
}

impl InstrumentedPostRepository {
    pub fn new(inner: Arc<dyn PostRepository>) -> Self {
        Self { inner }
    }

    async fn observe<T, F>(&self, operation: &'static str, call: F) -> RepositoryResult<T>
    where
        F: Future<Output = RepositoryResult<T>>,
    {
        let backend = self.inner.backend().as_str();
        let started = Instant::now();
        let result = call.await;
        let elapsed = started.elapsed();

        REPOSITORY_OPERATION_DURATION_SECONDS
            .with_label_values(&[backend, operation])
            .observe(elapsed.as_secs_f64());
        REPOSITORY_OPERATIONS_TOTAL
            .with_label_values(&[backend, operation, outcome(&result)])
            .inc();

        match &result {
            Err(e @ RepositoryError::Unavailable { .. }) | Err(e @ RepositoryError::Corrupt { .. }) => {
                warn!(backend, operation, error = %e, "Repository call failed");
            }
            _ => {
                debug!(
                    backend,
                    operation,
                    elapsed_ms = elapsed.as_millis() as u64,
                    outcome = outcome(&result),
                    "Repository call finished"
                );
            }
        }

        result
    }
}

fn outcome<T>(result: &RepositoryResult<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(RepositoryError::NotFound(_)) => "not_found",
        Err(_) => "error",
    }
}

#[async_trait::async_trait]
impl PostRepository for InstrumentedPostRepository {
    fn backend(&self) -> StorageBackend {
        self.inner.backend()
    }

    async fn list(&self) -> RepositoryResult<Vec<Post>> {
        self.observe("list", self.inner.list()).await
    }

    async fn list_page(&self, page: PageRequest) -> RepositoryResult<PostPage> {
        self.observe("list_page", self.inner.list_page(page)).await
    }

    async fn create(&self, draft: PostDraft) -> RepositoryResult<Post> {
        self.observe("create", self.inner.create(draft)).await
    }

    async fn read(&self, id: &PostId) -> RepositoryResult<Post> {
        self.observe("read", self.inner.read(id)).await
    }

    async fn update(&self, id: &PostId, draft: PostDraft) -> RepositoryResult<Post> {
        self.observe("update", self.inner.update(id, draft)).await
    }

    async fn delete(&self, id: &PostId) -> RepositoryResult<()> {
        self.observe("delete", self.inner.delete(id)).await
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        self.observe("health_check", self.inner.health_check()).await
    }
}
