use crate::config::StorageBackend;
use crate::models::PostId;
use thiserror::Error;

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Failures surfaced by any post repository
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No post stored under this id
    #[error("post {0} not found")]
    NotFound(PostId),

    /// The storage engine could not serve the request
    #[error("{backend} backend unavailable: {message}")]
    Unavailable {
        backend: StorageBackend,
        message: String,
    },

    /// A stored record could not be decoded into a post
    #[error("stored post {id} is malformed: {reason}")]
    Corrupt { id: String, reason: String },
}

impl RepositoryError {
    pub fn unavailable(backend: StorageBackend, err: impl std::fmt::Display) -> Self {
        RepositoryError::Unavailable {
            backend,
            message: err.to_string(),
        }
    }

    pub fn corrupt(id: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        RepositoryError::Corrupt {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::unavailable(StorageBackend::Relational, err)
    }
}

impl From<redis::RedisError> for RepositoryError {
    fn from(err: redis::RedisError) -> Self {
        RepositoryError::unavailable(StorageBackend::Realtime, err)
    }
}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        RepositoryError::unavailable(StorageBackend::Document, err)
    }
}
