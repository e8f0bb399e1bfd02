use axum::Router;
use domain_tasks::{CachedTaskRepository, PgTaskStore, RedisTaskCache, TaskService, handlers};

/// Wires the Postgres store and Redis cache into the task router.
pub fn router(state: &crate::state::AppState) -> Router {
    let repository = CachedTaskRepository::with_ttl(
        PgTaskStore::new(state.db.clone()),
        RedisTaskCache::new(state.redis.clone()),
        state.config.cache_ttl,
    );
    handlers::router(TaskService::new(repository))
}
