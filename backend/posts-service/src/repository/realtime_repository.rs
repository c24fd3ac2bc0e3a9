use super::error::{RepositoryError, RepositoryResult};
use super::push_id::{InvalidKey, NodePath, PushIdGenerator};
use super::r#trait::PostRepository;
use crate::config::StorageBackend;
use crate::models::{Post, PostDraft, PostId};
use chrono::{DateTime, Utc};
use redis::Script;
use redis_utils::SharedConnectionManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Merge title/body/updated_at into an existing child and return the new
/// node, or nil when the child does not exist.
const UPDATE_CHILD_SCRIPT: &str = r#"
local current = redis.call('HGET', KEYS[1], ARGV[1])
if not current then
    return false
end
local node = cjson.decode(current)
node['title'] = ARGV[2]
node['body'] = ARGV[3]
node['updated_at'] = ARGV[4]
local encoded = cjson.encode(node)
redis.call('HSET', KEYS[1], ARGV[1], encoded)
return encoded
"#;

/// Hierarchical key-value repository on Redis.
///
/// The root path (e.g. `posts`) is a single hash; each post is a child field
/// addressed as `{root}/{push id}` whose value is a JSON node. Reading the
/// root returns every child in key order, which is creation order.
pub struct RealtimePostRepository {
    redis: SharedConnectionManager,
    root: NodePath,
    ids: PushIdGenerator,
    update_script: Script,
}

#[derive(Debug, Serialize, Deserialize)]
struct PostNode {
    title: String,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostNode {
    fn into_post(self, key: &str) -> Post {
        Post {
            id: PostId::new(key),
            title: self.title,
            body: self.body,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl RealtimePostRepository {
    pub fn new(redis: SharedConnectionManager, root: &str) -> Result<Self, InvalidKey> {
        Ok(Self {
            redis,
            root: NodePath::parse(root)?,
            ids: PushIdGenerator::new(),
            update_script: Script::new(UPDATE_CHILD_SCRIPT),
        })
    }

    pub fn root(&self) -> &NodePath {
        &self.root
    }

    /// Path of the child node for `id`; ids that break key rules cannot exist
    fn child_path(&self, id: &PostId) -> RepositoryResult<NodePath> {
        self.root
            .child(id.as_str())
            .map_err(|_| RepositoryError::NotFound(id.clone()))
    }

    fn decode(path: &NodePath, raw: &str) -> RepositoryResult<Post> {
        serde_json::from_str::<PostNode>(raw)
            .map(|node| node.into_post(path.key()))
            .map_err(|e| RepositoryError::corrupt(path.to_string(), e))
    }
}

#[async_trait::async_trait]
impl PostRepository for RealtimePostRepository {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Realtime
    }

    async fn list(&self) -> RepositoryResult<Vec<Post>> {
        let mut conn = self.redis.lock().await;
        let children: BTreeMap<String, String> = redis::cmd("HGETALL")
            .arg(self.root.to_string())
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        let mut posts = Vec::with_capacity(children.len());
        for (key, raw) in children {
            let path = match self.root.child(&key) {
                Ok(path) => path,
                Err(e) => {
                    warn!(root = %self.root, key = %key, error = %e, "Skipping child with invalid key");
                    continue;
                }
            };
            match Self::decode(&path, &raw) {
                Ok(post) => posts.push(post),
                Err(e) => warn!(path = %path, error = %e, "Skipping malformed child node"),
            }
        }

        Ok(posts)
    }

    async fn create(&self, draft: PostDraft) -> RepositoryResult<Post> {
        let key = self.ids.next_id();
        let path = self
            .root
            .child(&key)
            .map_err(|e| RepositoryError::unavailable(StorageBackend::Realtime, e))?;
        let now = Utc::now();
        let node = PostNode {
            title: draft.title,
            body: draft.body,
            created_at: now,
            updated_at: now,
        };
        let encoded = serde_json::to_string(&node)
            .map_err(|e| RepositoryError::corrupt(path.to_string(), e))?;

        let mut conn = self.redis.lock().await;
        let inserted: bool = redis::cmd("HSETNX")
            .arg(self.root.to_string())
            .arg(&key)
            .arg(encoded)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        if !inserted {
            return Err(RepositoryError::unavailable(
                StorageBackend::Realtime,
                format!("push id collision at {}", path),
            ));
        }

        debug!(path = %path, "Pushed child node");
        Ok(node.into_post(&key))
    }

    async fn read(&self, id: &PostId) -> RepositoryResult<Post> {
        let path = self.child_path(id)?;

        let mut conn = self.redis.lock().await;
        let raw: Option<String> = redis::cmd("HGET")
            .arg(self.root.to_string())
            .arg(path.key())
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        match raw {
            Some(raw) => Self::decode(&path, &raw),
            None => Err(RepositoryError::NotFound(id.clone())),
        }
    }

    async fn update(&self, id: &PostId, draft: PostDraft) -> RepositoryResult<Post> {
        let path = self.child_path(id)?;
        let updated_at = Utc::now().to_rfc3339();

        let mut conn = self.redis.lock().await;
        let raw: Option<String> = self.update_script
            .key(self.root.to_string())
            .arg(path.key())
            .arg(&draft.title)
            .arg(&draft.body)
            .arg(updated_at)
            .invoke_async(&mut *conn)
            .await?;
        drop(conn);

        match raw {
            Some(raw) => Self::decode(&path, &raw),
            None => Err(RepositoryError::NotFound(id.clone())),
        }
    }

    async fn delete(&self, id: &PostId) -> RepositoryResult<()> {
        let path = self.child_path(id)?;

        let mut conn = self.redis.lock().await;
        let removed: i64 = redis::cmd("HDEL")
            .arg(self.root.to_string())
            .arg(path.key())
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        if removed == 0 {
            return Err(RepositoryError::NotFound(id.clone()));
        }

        debug!(path = %path, "Removed child node");
        Ok(())
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        redis_utils::ping(&self.redis).await?;
        Ok(())
    }
}
