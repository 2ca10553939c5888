//! Reaction Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::id::IdError;
use thiserror::Error;

pub type ReactionResult<T> = Result<T, ReactionError>;

#[derive(Debug, Error)]
pub enum ReactionError {
    /// Missing or malformed subject reference
    #[error("Invalid subject: {0}")]
    InvalidSubject(String),

    #[error("Subject not found")]
    SubjectNotFound,

    /// Two first-time toggles raced on the primary key and retries ran out
    #[error("Concurrent reaction update")]
    Conflict,

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReactionError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ReactionError::InvalidSubject(_) => ErrorKind::BadRequest,
            ReactionError::SubjectNotFound => ErrorKind::NotFound,
            ReactionError::Conflict | ReactionError::Storage(_) | ReactionError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn into_app_error(self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            ReactionError::Storage(e) => err.with_source(e),
            _ => err,
        }
    }

    fn log(&self) {
        if !self.kind().is_server_error() {
            tracing::debug!(error = %self, "Reaction request rejected");
        }
    }
}

impl IntoResponse for ReactionError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<IdError> for ReactionError {
    fn from(err: IdError) -> Self {
        ReactionError::InvalidSubject(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ReactionError {
    fn from(err: tokio::task::JoinError) -> Self {
        ReactionError::Internal(format!("Background task failed: {err}"))
    }
}
