use super::error::{RepositoryError, RepositoryResult};
use super::r#trait::PostRepository;
use crate::config::StorageBackend;
use crate::models::{PageRequest, Post, PostDraft, PostId, PostPage};
use chrono::{DateTime, TimeZone, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// MongoDB repository; one document per post keyed by a generated ObjectId
pub struct DocumentPostRepository {
    database: Database,
    collection: Collection<PostDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PostDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    body: String,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl TryFrom<PostDocument> for Post {
    type Error = RepositoryError;

    fn try_from(document: PostDocument) -> Result<Self, Self::Error> {
        let id = document.id.to_hex();
        Ok(Post {
            created_at: to_utc(&id, document.created_at)?,
            updated_at: to_utc(&id, document.updated_at)?,
            id: PostId::new(id),
            title: document.title,
            body: document.body,
        })
    }
}

fn to_utc(id: &str, value: bson::DateTime) -> RepositoryResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value.timestamp_millis())
        .single()
        .ok_or_else(|| RepositoryError::corrupt(id, "timestamp out of range"))
}

fn newest_first() -> Document {
    doc! { "created_at": -1, "_id": -1 }
}

impl DocumentPostRepository {
    pub fn new(client: &Client, database: &str, collection: &str) -> Self {
        let database = client.database(database);
        let collection = database.collection::<PostDocument>(collection);
        Self {
            database,
            collection,
        }
    }

    /// Create the listing index if it does not exist yet
    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let index = IndexModel::builder().keys(newest_first()).build();
        self.collection.create_index(index, None).await?;
        Ok(())
    }

    /// ObjectId for `id`; anything that is not 24 hex digits cannot exist
    fn object_id(id: &PostId) -> RepositoryResult<ObjectId> {
        ObjectId::parse_str(id.as_str()).map_err(|_| RepositoryError::NotFound(id.clone()))
    }

    async fn find(&self, options: FindOptions) -> RepositoryResult<Vec<Post>> {
        let documents: Vec<PostDocument> = self
            .collection
            .find(doc! {}, options)
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(Post::try_from).collect()
    }
}

#[async_trait::async_trait]
impl PostRepository for DocumentPostRepository {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Document
    }

    async fn list(&self) -> RepositoryResult<Vec<Post>> {
        self.find(FindOptions::builder().sort(newest_first()).build())
            .await
    }

    async fn list_page(&self, page: PageRequest) -> RepositoryResult<PostPage> {
        let options = FindOptions::builder()
            .sort(newest_first())
            .skip(page.offset())
            .limit(i64::try_from(page.per_page).unwrap_or(i64::MAX))
            .build();
        let items = self.find(options).await?;
        let total = self.collection.count_documents(doc! {}, None).await?;

        Ok(PostPage {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
        })
    }

    async fn create(&self, draft: PostDraft) -> RepositoryResult<Post> {
        let now = bson::DateTime::now();
        let document = PostDocument {
            id: ObjectId::new(),
            title: draft.title,
            body: draft.body,
            created_at: now,
            updated_at: now,
        };

        self.collection.insert_one(&document, None).await?;

        debug!(post_id = %document.id, "Inserted post document");
        Post::try_from(document)
    }

    async fn read(&self, id: &PostId) -> RepositoryResult<Post> {
        let oid = Self::object_id(id)?;

        match self.collection.find_one(doc! { "_id": oid }, None).await? {
            Some(document) => Post::try_from(document),
            None => Err(RepositoryError::NotFound(id.clone())),
        }
    }

    async fn update(&self, id: &PostId, draft: PostDraft) -> RepositoryResult<Post> {
        let oid = Self::object_id(id)?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": oid },
                doc! {
                    "$set": {
                        "title": draft.title,
                        "body": draft.body,
                        "updated_at": bson::DateTime::now(),
                    }
                },
                options,
            )
            .await?;

        match updated {
            Some(document) => Post::try_from(document),
            None => Err(RepositoryError::NotFound(id.clone())),
        }
    }

    async fn delete(&self, id: &PostId) -> RepositoryResult<()> {
        let oid = Self::object_id(id)?;

        let result = self.collection.delete_one(doc! { "_id": oid }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::NotFound(id.clone()));
        }

        debug!(post_id = %oid, "Deleted post document");
        Ok(())
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}
