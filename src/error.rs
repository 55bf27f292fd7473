/// Unified error types for the Tubely thumbnail service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or invalid bearer credential
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authenticated, but not allowed to touch the resource
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Malformed identifier or form
    #[error("Validation error: {0}")]
    Validation(String),

    /// Thumbnail content type outside the accepted set
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Upload exceeds the configured ceiling
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Blob storage errors
    #[error("Blob storage error: {0}")]
    BlobStorage(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Short machine-readable code, also used as the metrics label
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Authentication(_) => "AuthenticationRequired",
            ApiError::Authorization(_) => "Forbidden",
            ApiError::Validation(_) => "InvalidRequest",
            ApiError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            ApiError::PayloadTooLarge(_) => "PayloadTooLarge",
            ApiError::NotFound(_) => "NotFound",
            ApiError::BlobStorage(_) => "BlobStorageError",
            ApiError::Database(_) | ApiError::Internal(_) | ApiError::Io(_) => {
                "InternalServerError"
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BlobStorage(_)
            | ApiError::Database(_)
            | ApiError::Internal(_)
            | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert ApiError to HTTP response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Database(_)
            | ApiError::Internal(_)
            | ApiError::Io(_)
            | ApiError::BlobStorage(_) => {
                "Internal server error".to_string() // Don't leak details
            }
            _ => self.to_string(),
        };

        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type ApiResult<T> = Result<T, ApiError>;
