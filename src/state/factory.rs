use crate::config::{CacheConfig, StateBackend, StateConfig};
use crate::error::{AppError, Result};
use crate::state::{CachedStore, DocumentStore, InMemoryStore, RedisStore, SledStore};
use std::sync::Arc;

/// Create a document store based on configuration
pub async fn create_store(
    config: &StateConfig,
    cache: &CacheConfig,
) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.backend {
        StateBackend::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                AppError::Configuration("Sled backend requires 'path' configuration".to_string())
            })?;

            tracing::info!(path = ?path, "Initializing Sled storage backend");

            Arc::new(SledStore::new(path)?)
        }

        StateBackend::Redis => {
            let redis_url = config.redis_url.as_ref().ok_or_else(|| {
                AppError::Configuration(
                    "Redis backend requires 'redis_url' configuration".to_string(),
                )
            })?;

            tracing::info!(url = %redis_url, "Initializing Redis storage backend");

            Arc::new(RedisStore::new_with_prefix(redis_url, &config.key_prefix).await?)
        }

        StateBackend::Memory => create_in_memory_store(),
    };

    if cache.enabled {
        tracing::info!(
            max_capacity = cache.max_capacity,
            ttl_secs = cache.ttl_secs,
            "Enabling document read cache"
        );
        return Ok(Arc::new(CachedStore::new(store, cache)));
    }

    Ok(store)
}

/// Create an in-memory store (for testing and development)
pub fn create_in_memory_store() -> Arc<dyn DocumentStore> {
    tracing::info!("Initializing in-memory storage backend");
    Arc::new(InMemoryStore::new())
}
