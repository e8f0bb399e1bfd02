use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{TaskError, TaskResult};

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 32;
pub const DESCRIPTION_MAX_LEN: usize = 255;

/// Progress of a task
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TaskStatus {
    #[sea_orm(string_value = "not started")]
    #[serde(rename = "not started")]
    #[strum(serialize = "not started")]
    NotStarted,
    #[sea_orm(string_value = "in progress")]
    #[serde(rename = "in progress")]
    #[strum(serialize = "in progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    #[serde(rename = "completed")]
    #[strum(serialize = "completed")]
    Completed,
}

/// Task record, as stored and as cached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    /// Server-generated, never changes
    pub id: Uuid,
    /// Unique across all tasks, 3-32 characters
    pub name: String,
    /// At most 255 characters
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a new task with a fresh identifier and both timestamps set to now.
    pub fn new(name: String, description: String, status: TaskStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name,
            description,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate_fields(&self) -> TaskResult<()> {
        validate_fields(&self.name, &self.description)
    }
}

/// Mutable part of a task applied by an update.
///
/// The identifier and `created_at` are not part of it; the store supplies them on read-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub updated_at: DateTime<Utc>,
}

impl TaskChanges {
    pub fn new(name: String, description: String, status: TaskStatus) -> Self {
        Self {
            name,
            description,
            status,
            updated_at: Utc::now(),
        }
    }

    pub fn validate_fields(&self) -> TaskResult<()> {
        validate_fields(&self.name, &self.description)
    }
}

fn validate_fields(name: &str, description: &str) -> TaskResult<()> {
    let name_len = name.chars().count();

    if name.is_empty() {
        return Err(TaskError::Validation("name cannot be empty".to_string()));
    }
    if name_len < NAME_MIN_LEN {
        return Err(TaskError::Validation(format!(
            "name must be at least {NAME_MIN_LEN} characters long"
        )));
    }
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(TaskError::Validation(format!(
            "description must have a maximum of {DESCRIPTION_MAX_LEN} characters"
        )));
    }
    if name_len > NAME_MAX_LEN {
        return Err(TaskError::Validation(format!(
            "name must have a maximum of {NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Payload for creating or replacing a task
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct TaskRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub description: String,
    /// One of "not started", "in progress", "completed"
    #[serde(default, alias = "situation")]
    #[validate(length(min = 1))]
    pub status: String,
}

impl TaskRequest {
    const FIELDS: [&'static str; 3] = ["name", "description", "status"];

    /// Reject payloads with empty fields, listing every missing one.
    fn require_fields(&self) -> TaskResult<()> {
        self.validate().map_err(|errors| {
            let failed = errors.field_errors();
            let missing: Vec<&str> = Self::FIELDS
                .into_iter()
                .filter(|field| failed.contains_key(*field))
                .collect();
            TaskError::Validation(format!("missing required fields: {}", missing.join(", ")))
        })
    }

    fn parse_status(&self) -> TaskResult<TaskStatus> {
        TaskStatus::from_str(&self.status)
            .map_err(|_| TaskError::Validation("invalid status value".to_string()))
    }

    /// Convert into a new, field-validated task.
    pub fn into_task(self) -> TaskResult<Task> {
        self.require_fields()?;
        validate_fields(&self.name, &self.description)?;
        let status = self.parse_status()?;
        Ok(Task::new(self.name, self.description, status))
    }

    /// Convert into field-validated update changes.
    pub fn into_changes(self) -> TaskResult<TaskChanges> {
        self.require_fields()?;
        validate_fields(&self.name, &self.description)?;
        let status = self.parse_status()?;
        Ok(TaskChanges::new(self.name, self.description, status))
    }
}
