//! Connection management for the durable store (PostgreSQL via SeaORM) and the
//! volatile cache (Redis via `ConnectionManager`).
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL support with SeaORM
//! - `redis` (default) - Redis support
//! - `config` - `core_config::FromEnv` implementations for the config structs
//!
//! # Example
//!
//! ```ignore
//! use database::{postgres, redis};
//!
//! let db = postgres::connect_from_config_with_retry(pg_config, None).await?;
//! let cache = redis::connect_from_config_with_retry(redis_config, None).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;

pub use common::{DatabaseError, DatabaseResult};
