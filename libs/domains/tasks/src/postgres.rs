use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entity,
    models::{Task, TaskChanges},
    store::{StoreError, TaskStore},
};

/// PostgreSQL-backed [`TaskStore`]
#[derive(Clone)]
pub struct PgTaskStore {
    db: DatabaseConnection,
}

impl PgTaskStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn insert(&self, task: &Task) -> Result<Task, StoreError> {
        let active_model: entity::ActiveModel = task.into();
        let model = active_model.insert(&self.db).await?;

        tracing::debug!("Inserted task row");
        Ok(model.into())
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: Uuid, changes: &TaskChanges) -> Result<Task, StoreError> {
        let model = entity::changes_for(id, changes).update(&self.db).await?;

        tracing::debug!("Updated task row");
        Ok(model.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NoRows);
        }
        tracing::debug!("Deleted task row");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Task>, StoreError> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
