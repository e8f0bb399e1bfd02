use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::TaskResult;
use crate::models::{Task, TaskRequest};
use crate::repository::TaskRepository;

/// Service layer for Task business logic
///
/// Validates payloads and sequences repository calls. Repository errors pass through unchanged.
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> Clone for TaskService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new task with validation
    #[instrument(skip(self, input), fields(task_name = %input.name))]
    pub async fn create_task(&self, input: TaskRequest) -> TaskResult<Task> {
        let task = input.into_task()?;
        self.repository.insert(task).await
    }

    /// Replace the mutable fields of a task
    #[instrument(skip(self, input), fields(task_id = %id))]
    pub async fn update_task(&self, id: Uuid, input: TaskRequest) -> TaskResult<Task> {
        let changes = input.into_changes()?;
        self.repository.update(id, changes).await
    }

    /// Delete a task, reporting not-found before touching the delete path
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: Uuid) -> TaskResult<()> {
        self.repository.get_by_id(id).await?;
        self.repository.delete(id).await
    }

    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get_task(&self, id: Uuid) -> TaskResult<Task> {
        self.repository.get_by_id(id).await
    }

    pub async fn list_tasks(&self) -> TaskResult<Vec<Task>> {
        self.repository.get_all().await
    }
}
