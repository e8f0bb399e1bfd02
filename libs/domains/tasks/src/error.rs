use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task with ID {0} not found")]
    NotFound(Uuid),

    #[error("task with name {0} already exists")]
    AlreadyExists(String),

    #[error("{0}")]
    Validation(String),

    /// Store or serialization failure; the detail is logged, never returned to clients
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TaskResult<T> = Result<T, TaskError>;

/// Convert TaskError to AppError for standardized error responses
impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => AppError::NotFound(format!("task with ID {id} not found")),
            TaskError::AlreadyExists(name) => {
                AppError::Conflict(format!("task with name {name} already exists"))
            }
            TaskError::Validation(msg) => AppError::BadRequest(msg),
            TaskError::Internal(detail) => {
                tracing::error!(error = %detail, "Task operation failed");
                AppError::internal()
            }
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
