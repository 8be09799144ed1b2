/// Error types for wall-service
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::domain::FeedParamError;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Any failed fetch in the feed pipeline. Callers get no partial feed.
    #[error("could not load feed")]
    FeedUnavailable(#[source] anyhow::Error),

    #[error("Data store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] s3_utils::StorageError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FeedParamError> for ServiceError {
    fn from(err: FeedParamError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::FeedUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Store(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Storage(_) => StatusCode::BAD_GATEWAY,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Store and storage details stay in the logs
        let message = match self {
            ServiceError::Store(_) | ServiceError::Internal(_) => {
                "internal error".to_string()
            }
            ServiceError::Storage(_) => "file storage unavailable".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        }))
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
