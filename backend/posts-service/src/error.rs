/// Error types for Posts Service
///
/// Repository failures are converted here into HTML error pages. Validation
/// problems never reach this type; handlers re-render the form instead.
use crate::repository::RepositoryError;
use crate::views;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;
use tracing::error;

/// Result type for posts-service handlers
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested post does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend failed or returned unreadable data
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (heading, message) = match self {
            AppError::NotFound(_) => ("Not Found", "The requested post does not exist."),
            AppError::Storage(_) | AppError::Internal(_) => (
                "Server Error",
                "Something went wrong while handling your request.",
            ),
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(views::error_page(status.as_u16(), heading, message))
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => AppError::NotFound(format!("post {}", id)),
            other => AppError::Storage(other.to_string()),
        }
    }
}
