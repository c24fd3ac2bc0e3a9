use super::error::{RepositoryError, RepositoryResult};
use super::r#trait::PostRepository;
use crate::config::StorageBackend;
use crate::models::{Post, PostDraft, PostId};
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Process-local repository for development and tests.
///
/// Ids are a decimal counter starting at 1; listings are newest first,
/// matching the relational adapter.
#[derive(Default)]
pub struct InMemoryPostRepository {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    next_id: u64,
    posts: BTreeMap<u64, Post>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter key for `id`; only the canonical decimal spelling matches
    fn key(id: &PostId) -> RepositoryResult<u64> {
        match id.as_str().parse::<u64>() {
            Ok(key) if key.to_string() == id.as_str() => Ok(key),
            _ => Err(RepositoryError::NotFound(id.clone())),
        }
    }
}

#[async_trait::async_trait]
impl PostRepository for InMemoryPostRepository {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn list(&self) -> RepositoryResult<Vec<Post>> {
        let state = self.state.read().await;
        Ok(state.posts.values().rev().cloned().collect())
    }

    async fn create(&self, draft: PostDraft) -> RepositoryResult<Post> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let key = state.next_id;
        let now = Utc::now();
        let post = Post {
            id: PostId::new(key.to_string()),
            title: draft.title,
            body: draft.body,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(key, post.clone());
        Ok(post)
    }

    async fn read(&self, id: &PostId) -> RepositoryResult<Post> {
        let key = Self::key(id)?;
        let state = self.state.read().await;
        state
            .posts
            .get(&key)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }

    async fn update(&self, id: &PostId, draft: PostDraft) -> RepositoryResult<Post> {
        let key = Self::key(id)?;
        let mut state = self.state.write().await;
        let post = state
            .posts
            .get_mut(&key)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        post.title = draft.title;
        post.body = draft.body;
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn delete(&self, id: &PostId) -> RepositoryResult<()> {
        let key = Self::key(id)?;
        let mut state = self.state.write().await;
        state
            .posts
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }
}
