use async_trait::async_trait;
use std::time::Duration;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::cache::{TaskCache, entry_key, name_key};
use crate::error::{TaskError, TaskResult};
use crate::models::{Task, TaskChanges};
use crate::store::{StoreError, TaskStore};

/// Lifetime of every cache entry written by the repository
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Repository trait for Task persistence
///
/// Errors are already classified as not-found, already-exists or internal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: Task) -> TaskResult<Task>;

    async fn update(&self, id: Uuid, changes: TaskChanges) -> TaskResult<Task>;

    async fn delete(&self, id: Uuid) -> TaskResult<()>;

    async fn get_by_id(&self, id: Uuid) -> TaskResult<Task>;

    async fn get_all(&self) -> TaskResult<Vec<Task>>;
}

/// What the name index says about a name. Only ever used to reject early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameHint {
    /// Missing entry or unreadable cache; the store decides
    Unknown,
    /// Indexed, with the owning id when it parses
    Taken(Option<Uuid>),
}

/// Cache-aside repository over a durable [`TaskStore`] and a [`TaskCache`].
///
/// Keeps `task:<id>` holding the serialized record and `task:name:<name>`
/// holding the owning id. The store stays authoritative for existence and
/// name uniqueness; cache failures are logged and never change an outcome.
pub struct CachedTaskRepository<S, C> {
    store: S,
    cache: C,
    ttl: Duration,
}

impl<S: TaskStore, C: TaskCache> CachedTaskRepository<S, C> {
    pub fn new(store: S, cache: C) -> Self {
        Self::with_ttl(store, cache, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(store: S, cache: C, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    async fn probe_name(&self, name: &str) -> NameHint {
        match self.cache.get(&name_key(name)).await {
            Ok(Some(value)) if !value.is_empty() => NameHint::Taken(value.parse().ok()),
            Ok(_) => NameHint::Unknown,
            Err(e) => {
                warn!(error = %e, name, "Name index probe failed");
                NameHint::Unknown
            }
        }
    }

    /// Cached record for `id`; misses, cache errors and undecodable values all read as `None`.
    async fn cached_task(&self, id: Uuid) -> Option<Task> {
        let raw = match self.cache.get(&entry_key(id)).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, task_id = %id, "Cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(task) => Some(task),
            Err(e) => {
                warn!(error = %e, task_id = %id, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Cache `task` under its entry key. Returns whether the entry now holds it.
    async fn remember(&self, task: &Task) -> bool {
        let value = match serde_json::to_string(task) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, task_id = %task.id, "Failed to serialize task for cache");
                return false;
            }
        };
        let key = entry_key(task.id);
        match self.cache.set(&key, &value, self.ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, key = %key, "Cache write failed");
                false
            }
        }
    }

    async fn remember_name(&self, task: &Task) {
        let key = name_key(&task.name);
        if let Err(e) = self.cache.set(&key, &task.id.to_string(), self.ttl).await {
            warn!(error = %e, key = %key, "Name index write failed");
        }
    }

    async fn forget(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            warn!(error = %e, key = %key, "Cache eviction failed");
        }
    }

    /// Name the task had before an update, so its index entry can be evicted.
    async fn previous_name(&self, id: Uuid) -> Option<String> {
        if let Some(task) = self.cached_task(id).await {
            return Some(task.name);
        }
        match self.store.find_by_id(id).await {
            Ok(task) => task.map(|t| t.name),
            Err(e) => {
                warn!(error = %e, task_id = %id, "Could not read previous name");
                None
            }
        }
    }
}

#[async_trait]
impl<S: TaskStore, C: TaskCache> TaskRepository for CachedTaskRepository<S, C> {
    #[instrument(skip(self, task), fields(task_id = %task.id, name = %task.name))]
    async fn insert(&self, task: Task) -> TaskResult<Task> {
        if let NameHint::Taken(_) = self.probe_name(&task.name).await {
            return Err(TaskError::AlreadyExists(task.name));
        }

        let stored = match self.store.insert(&task).await {
            Ok(stored) => stored,
            Err(StoreError::UniqueViolation) => return Err(TaskError::AlreadyExists(task.name)),
            Err(e) => return Err(TaskError::Internal(e.to_string())),
        };

        self.remember(&stored).await;
        self.remember_name(&stored).await;

        tracing::info!("Created task");
        Ok(stored)
    }

    #[instrument(skip(self, changes), fields(name = %changes.name))]
    async fn update(&self, id: Uuid, changes: TaskChanges) -> TaskResult<Task> {
        match self.probe_name(&changes.name).await {
            NameHint::Taken(Some(holder)) if holder != id => {
                return Err(TaskError::AlreadyExists(changes.name));
            }
            _ => {}
        }

        let previous_name = self.previous_name(id).await;

        let updated = match self.store.update(id, &changes).await {
            Ok(updated) => updated,
            Err(StoreError::NoRows) => return Err(TaskError::NotFound(id)),
            Err(StoreError::UniqueViolation) => {
                return Err(TaskError::AlreadyExists(changes.name));
            }
            Err(e) => return Err(TaskError::Internal(e.to_string())),
        };

        // A failed refresh must not leave the pre-update record readable
        if !self.remember(&updated).await {
            self.forget(&entry_key(id)).await;
        }
        self.remember_name(&updated).await;
        if let Some(old) = previous_name.filter(|old| *old != updated.name) {
            self.forget(&name_key(&old)).await;
        }

        tracing::info!("Updated task");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> TaskResult<()> {
        let current = match self.cached_task(id).await {
            Some(task) => task,
            None => self
                .store
                .find_by_id(id)
                .await
                .map_err(|e| TaskError::Internal(e.to_string()))?
                .ok_or(TaskError::NotFound(id))?,
        };

        self.forget(&entry_key(id)).await;
        self.forget(&name_key(&current.name)).await;

        match self.store.delete(id).await {
            Ok(()) => {
                tracing::info!("Deleted task");
                Ok(())
            }
            Err(StoreError::NoRows) => Err(TaskError::NotFound(id)),
            Err(e) => Err(TaskError::Internal(e.to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> TaskResult<Task> {
        if let Some(task) = self.cached_task(id).await {
            return Ok(task);
        }

        let task = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| TaskError::Internal(e.to_string()))?
            .ok_or(TaskError::NotFound(id))?;

        self.remember(&task).await;
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn get_all(&self) -> TaskResult<Vec<Task>> {
        self.store
            .find_all()
            .await
            .map_err(|e| TaskError::Internal(e.to_string()))
    }
}
