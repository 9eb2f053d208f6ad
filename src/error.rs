//! Error types for the circulation server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::{HolderId, ItemId};

/// Numeric error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    StorageFailure = 3,
    NoSuchHolder = 4,
    NoSuchItem = 5,
    ItemNotAvailable = 7,
    AlreadyBorrowed = 8,
    StorageUnavailable = 10,
    MaxBorrowsReached = 11,
    NotBorrowed = 13,
    BadValue = 18,
    ConcurrentModification = 20,
    HolderHasLoans = 21,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Holder {0} not found")]
    HolderNotFound(HolderId),

    #[error("Item {0} not found")]
    ItemNotFound(ItemId),

    #[error("Loan limit exceeded: holder has {current} loan(s), requested {requested}, maximum is {max}")]
    LoanLimitExceeded {
        current: usize,
        requested: usize,
        max: usize,
    },

    #[error("No copies of item {0} are available")]
    NoCopiesAvailable(ItemId),

    #[error("Item {0} is already borrowed by this holder")]
    AlreadyBorrowed(ItemId),

    #[error("Item {0} is not borrowed by this holder")]
    NotBorrowedByHolder(ItemId),

    #[error("Holder {0} has pending items to return")]
    HolderHasLoans(HolderId),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::StorageUnavailable(e.to_string())
            }
            other => AppError::Database(other),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    /// HTTP status and error code for this error
    pub fn status(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::HolderNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchHolder),
            AppError::ItemNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchItem),
            AppError::LoanLimitExceeded { .. } => {
                (StatusCode::CONFLICT, ErrorCode::MaxBorrowsReached)
            }
            AppError::NoCopiesAvailable(_) => (StatusCode::CONFLICT, ErrorCode::ItemNotAvailable),
            AppError::AlreadyBorrowed(_) => (StatusCode::CONFLICT, ErrorCode::AlreadyBorrowed),
            AppError::NotBorrowedByHolder(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::NotBorrowed)
            }
            AppError::HolderHasLoans(_) => (StatusCode::CONFLICT, ErrorCode::HolderHasLoans),
            AppError::ConcurrentModification(_) => {
                (StatusCode::CONFLICT, ErrorCode::ConcurrentModification)
            }
            AppError::StorageUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::StorageUnavailable)
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::StorageFailure),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::StorageUnavailable(msg) => {
                tracing::error!("Storage unavailable: {}", msg);
                "Storage unavailable".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
