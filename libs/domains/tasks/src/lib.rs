//! Tasks Domain
//!
//! Task records kept in PostgreSQL with a Redis read-through cache and a
//! name index used to reject duplicate names early.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP, status mapping
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │   Service   │  ← Payload validation, call sequencing
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │ Repository  │  ← Cache-aside over store + cache
//! └──┬───────┬──┘
//! ┌──▼───┐ ┌─▼─────┐
//! │Store │ │ Cache │  ← PgTaskStore / RedisTaskCache (or in-memory fakes)
//! └──────┘ └───────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tasks::{CachedTaskRepository, PgTaskStore, RedisTaskCache, TaskService};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//! let client = redis::Client::open("redis://127.0.0.1:6379")?;
//! let manager = redis::aio::ConnectionManager::new(client).await?;
//!
//! let repository = CachedTaskRepository::new(PgTaskStore::new(db), RedisTaskCache::new(manager));
//! let service = TaskService::new(repository);
//! let router = domain_tasks::handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod store;

pub use cache::{CacheError, RedisTaskCache, TaskCache};
pub use error::{TaskError, TaskResult};
pub use handlers::ApiDoc;
pub use memory::{InMemoryTaskCache, InMemoryTaskStore};
pub use models::{Task, TaskChanges, TaskRequest, TaskStatus};
pub use postgres::PgTaskStore;
pub use repository::{CachedTaskRepository, DEFAULT_CACHE_TTL, TaskRepository};
pub use service::TaskService;
pub use store::{StoreError, TaskStore};
