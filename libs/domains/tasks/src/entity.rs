use crate::models::{Task, TaskStatus};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::entity::prelude::*;

/// Sea-ORM Entity for the tasks table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub description: String,
    #[sea_orm(column_name = "situation")]
    pub status: TaskStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Task {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            status: model.status,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<&Task> for ActiveModel {
    fn from(task: &Task) -> Self {
        ActiveModel {
            id: Set(task.id),
            name: Set(task.name.clone()),
            description: Set(task.description.clone()),
            status: Set(task.status),
            created_at: Set(task.created_at.into()),
            updated_at: Set(task.updated_at.into()),
        }
    }
}

/// Active model that rewrites the mutable columns of row `id` and leaves `created_at` alone.
pub(crate) fn changes_for(id: Uuid, changes: &crate::models::TaskChanges) -> ActiveModel {
    ActiveModel {
        id: Unchanged(id),
        name: Set(changes.name.clone()),
        description: Set(changes.description.clone()),
        status: Set(changes.status),
        updated_at: Set(changes.updated_at.into()),
        ..Default::default()
    }
}
