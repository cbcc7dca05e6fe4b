use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::Document;
use crate::state::{CombinationQuery, DocumentStore};
use async_trait::async_trait;
use moka::future::Cache;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// Generic cache wrapper using Moka
#[derive(Clone)]
pub struct AppCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache: Cache<K, V>,
}

impl<K, V> AppCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: K, value: V) {
        self.cache.insert(key, value).await;
    }

    pub async fn invalidate(&self, key: &K) {
        self.cache.invalidate(key).await;
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

/// Store decorator that keeps recently read documents in memory.
///
/// Only exact-key reads are served from the cache; combination queries always
/// reach the underlying store. Misses are not cached so a document created by
/// another instance becomes visible on the next read.
pub struct CachedStore {
    inner: Arc<dyn DocumentStore>,
    cache: AppCache<String, Document>,
}

impl CachedStore {
    pub fn new(inner: Arc<dyn DocumentStore>, config: &CacheConfig) -> Self {
        Self {
            inner,
            cache: AppCache::new(config.max_capacity, Duration::from_secs(config.ttl_secs)),
        }
    }

    pub fn cached_entries(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl DocumentStore for CachedStore {
    async fn get_by_key(&self, key: &str) -> Result<Option<Document>> {
        if let Some(document) = self.cache.get(&key.to_string()).await {
            tracing::trace!(words = %key, "Document cache hit");
            return Ok(Some(document));
        }

        let document = self.inner.get_by_key(key).await?;
        if let Some(ref doc) = document {
            self.cache.insert(key.to_string(), doc.clone()).await;
        }
        Ok(document)
    }

    async fn find_by_word_or_plural(&self, word: &str) -> Result<Vec<Document>> {
        self.inner.find_by_word_or_plural(word).await
    }

    async fn query(&self, query: &CombinationQuery) -> Result<Vec<Document>> {
        self.inner.query(query).await
    }

    async fn put(&self, document: &Document) -> Result<()> {
        self.inner.put(document).await?;
        self.cache
            .insert(document.words.clone(), document.clone())
            .await;
        Ok(())
    }

    async fn put_if_absent(&self, document: &Document) -> Result<bool> {
        let created = self.inner.put_if_absent(document).await?;
        if created {
            self.cache
                .insert(document.words.clone(), document.clone())
                .await;
        } else {
            self.cache.invalidate(&document.words).await;
        }
        Ok(created)
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }
}
