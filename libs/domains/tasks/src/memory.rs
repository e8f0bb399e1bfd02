//! In-process store and cache for tests and local runs.
//!
//! Both fakes keep the contracts of their production counterparts: the store
//! enforces name uniqueness and reports zero-row writes, the cache expires entries.
//! [`InMemoryTaskCache`] can additionally be told to fail reads, writes or evictions
//! independently.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::cache::{CacheError, CacheResult, TaskCache};
use crate::models::{Task, TaskChanges};
use crate::store::{StoreError, TaskStore};

#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    rows: Arc<RwLock<Vec<Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: &Task) -> Result<Task, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.name == task.name) {
            return Err(StoreError::UniqueViolation);
        }
        if rows.iter().any(|row| row.id == task.id) {
            return Err(StoreError::Backend(format!("duplicate key {}", task.id)));
        }
        rows.push(task.clone());
        Ok(task.clone())
    }

    async fn update(&self, id: Uuid, changes: &TaskChanges) -> Result<Task, StoreError> {
        let mut rows = self.rows.write().await;
        if rows
            .iter()
            .any(|row| row.id != id && row.name == changes.name)
        {
            return Err(StoreError::UniqueViolation);
        }
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(StoreError::NoRows)?;

        row.name = changes.name.clone();
        row.description = changes.description.clone();
        row.status = changes.status;
        row.updated_at = changes.updated_at;
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(StoreError::NoRows);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Task>, StoreError> {
        let mut rows = self.rows.read().await.clone();
        rows.sort_by_key(|row| row.created_at);
        Ok(rows)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryTaskCache {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    fail_evictions: Arc<AtomicBool>,
}

impl InMemoryTaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `get` fail until reset.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every `set` fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every `delete` fail until reset.
    pub fn fail_evictions(&self, fail: bool) {
        self.fail_evictions.store(fail, Ordering::SeqCst);
    }

    /// Read an entry without fault injection. Expired entries are dropped on the way.
    pub async fn peek(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => return Some(value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    /// Number of entries held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Write an entry without fault injection, with a one hour expiry.
    pub async fn insert_raw(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            (value.to_string(), Instant::now() + Duration::from_secs(3600)),
        );
    }
}

#[async_trait]
impl TaskCache for InMemoryTaskCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.peek(key).await)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("writes disabled".to_string()));
        }
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        if self.fail_evictions.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("evictions disabled".to_string()));
        }
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
