use super::error::{RepositoryError, RepositoryResult};
use super::r#trait::PostRepository;
use crate::config::StorageBackend;
use crate::models::{PageRequest, Post, PostDraft, PostId, PostPage};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

/// PostgreSQL repository; one row per post keyed by a `BIGSERIAL` id
#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: PostId::from(row.id),
            title: row.title,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Integer primary key for `id`; only the canonical decimal spelling matches
    fn key(id: &PostId) -> RepositoryResult<i64> {
        match id.as_str().parse::<i64>() {
            Ok(key) if key > 0 && key.to_string() == id.as_str() => Ok(key),
            _ => Err(RepositoryError::NotFound(id.clone())),
        }
    }
}

#[async_trait::async_trait]
impl PostRepository for PostgresPostRepository {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Relational
    }

    async fn list(&self) -> RepositoryResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, body, created_at, updated_at
            FROM posts
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn list_page(&self, page: PageRequest) -> RepositoryResult<PostPage> {
        let limit = i64::try_from(page.per_page).unwrap_or(i64::MAX);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, body, created_at, updated_at
            FROM posts
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(PostPage {
            items: rows.into_iter().map(Post::from).collect(),
            page: page.page,
            per_page: page.per_page,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn create(&self, draft: PostDraft) -> RepositoryResult<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (title, body)
            VALUES ($1, $2)
            RETURNING id, title, body, created_at, updated_at
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.body)
        .fetch_one(&self.pool)
        .await?;

        debug!(post_id = row.id, "Inserted post row");
        Ok(row.into())
    }

    async fn read(&self, id: &PostId) -> RepositoryResult<Post> {
        let key = Self::key(id)?;

        sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, body, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        .map(Post::from)
        .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }

    async fn update(&self, id: &PostId, draft: PostDraft) -> RepositoryResult<Post> {
        let key = Self::key(id)?;

        sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = $1, body = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, title, body, created_at, updated_at
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.body)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        .map(Post::from)
        .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }

    async fn delete(&self, id: &PostId) -> RepositoryResult<()> {
        let key = Self::key(id)?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.clone()));
        }

        debug!(post_id = key, "Deleted post row");
        Ok(())
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
