use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Task, TaskChanges};

/// Failure reported by the durable store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The statement matched zero rows
    #[error("no rows affected")]
    NoRows,

    /// The unique constraint on `name` rejected the write
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("store error: {0}")]
    Backend(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return StoreError::UniqueViolation;
        }
        match err {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => StoreError::NoRows,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Durable storage for task records.
///
/// The store is the only authority on existence and name uniqueness.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new row and return it as stored.
    async fn insert(&self, task: &Task) -> Result<Task, StoreError>;

    /// Overwrite the mutable columns of row `id`; [`StoreError::NoRows`] when it does not exist.
    async fn update(&self, id: Uuid, changes: &TaskChanges) -> Result<Task, StoreError>;

    /// [`StoreError::NoRows`] when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// All rows, oldest first.
    async fn find_all(&self) -> Result<Vec<Task>, StoreError>;
}
