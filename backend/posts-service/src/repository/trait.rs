use super::error::RepositoryResult;
use crate::config::StorageBackend;
use crate::models::{PageRequest, Post, PostDraft, PostId, PostPage};

/// Storage-agnostic persistence contract for posts.
///
/// Implemented by the realtime (Redis), document (MongoDB), relational
/// (PostgreSQL) and in-memory adapters. Every lookup by id reports a missing
/// post as `RepositoryError::NotFound`, including ids that cannot exist in the
/// adapter's native key format.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    /// Engine label used for logs and metrics
    fn backend(&self) -> StorageBackend;

    /// All posts in backend order; empty when none exist
    async fn list(&self) -> RepositoryResult<Vec<Post>>;

    /// One page of posts in the same order as `list`
    async fn list_page(&self, page: PageRequest) -> RepositoryResult<PostPage> {
        let all = self.list().await?;
        Ok(page.slice(all))
    }

    /// Persist a new post and return it with its assigned id
    async fn create(&self, draft: PostDraft) -> RepositoryResult<Post>;

    /// Fetch a single post
    async fn read(&self, id: &PostId) -> RepositoryResult<Post>;

    /// Replace title and body of an existing post
    async fn update(&self, id: &PostId, draft: PostDraft) -> RepositoryResult<Post>;

    /// Remove a post
    async fn delete(&self, id: &PostId) -> RepositoryResult<()>;

    /// Health check (optional)
    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
