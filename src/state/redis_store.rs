use crate::error::{AppError, Result};
use crate::models::Document;
use crate::state::{CombinationQuery, DocumentStore};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use std::collections::BTreeSet;

/// Redis-based persistent document store.
///
/// Documents are stored as JSON strings. Each combination and plural form is
/// a set of phrase keys, and one more set holds every stored key.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    key_prefix: String,
}

fn redis_error(context: &str, e: RedisError) -> AppError {
    AppError::Database(format!("{}: {}", context, e))
}

impl RedisStore {
    /// Create a new Redis store
    pub async fn new(redis_url: &str) -> Result<Self> {
        Self::new_with_prefix(redis_url, "llm-dict").await
    }

    /// Create a new Redis store with custom key prefix
    pub async fn new_with_prefix(redis_url: &str, prefix: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AppError::Configuration(format!("Invalid Redis URL: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| redis_error("Failed to connect to Redis", e))?;

        // Test connection
        let mut test_conn = connection.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut test_conn)
            .await
            .map_err(|e| redis_error("Redis connection test failed", e))?;

        tracing::info!("Initialized Redis store with prefix '{}'", prefix);

        Ok(Self {
            connection,
            key_prefix: prefix.to_string(),
        })
    }

    fn document_key(&self, words: &str) -> String {
        format!("{}:word:{}", self.key_prefix, words)
    }

    fn words_set_key(&self) -> String {
        format!("{}:words", self.key_prefix)
    }

    fn combination_key(&self, combination: &str) -> String {
        format!("{}:combination:{}", self.key_prefix, combination)
    }

    fn plural_key(&self, plural: &str) -> String {
        format!("{}:plural:{}", self.key_prefix, plural)
    }

    fn serialize_document(document: &Document) -> Result<String> {
        Ok(serde_json::to_string(document)?)
    }

    fn deserialize_document(json: &str) -> Result<Document> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add (or remove) a document's key to every index set it belongs to
    async fn write_indices(&self, document: &Document, add: bool) -> Result<()> {
        let mut sets = vec![self.words_set_key()];
        sets.extend(document.combinations.iter().map(|c| self.combination_key(c)));
        if let Some(ref plural) = document.plural {
            sets.push(self.plural_key(plural));
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for set in &sets {
            if add {
                pipe.sadd(set, &document.words).ignore();
            } else {
                pipe.srem(set, &document.words).ignore();
            }
        }

        let mut conn = self.connection.clone();
        pipe.query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| redis_error("Failed to update indices", e))
    }

    /// Undo a create whose indexing failed.
    ///
    /// A transaction still applies the commands that did not fail, so every
    /// set is cleaned up individually.
    async fn rollback_create(&self, document: &Document) {
        let mut conn = self.connection.clone();

        let mut sets = vec![self.words_set_key()];
        sets.extend(document.combinations.iter().map(|c| self.combination_key(c)));
        if let Some(ref plural) = document.plural {
            sets.push(self.plural_key(plural));
        }
        for set in sets {
            if let Err(e) = conn.srem::<_, _, ()>(&set, &document.words).await {
                tracing::warn!(words = %document.words, set = %set, error = %e, "Failed to roll back index entry");
            }
        }

        if let Err(e) = conn.del::<_, ()>(self.document_key(&document.words)).await {
            tracing::error!(words = %document.words, error = %e, "Failed to roll back document");
        }
    }

    /// Load documents for a set of keys with a single MGET
    async fn load_documents(&self, keys: &BTreeSet<String>) -> Result<Vec<Document>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let redis_keys: Vec<String> = keys.iter().map(|k| self.document_key(k)).collect();
        let mut conn = self.connection.clone();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&redis_keys)
            .query_async(&mut conn)
            .await
            .map_err(|e| redis_error("Failed to load documents", e))?;

        values
            .into_iter()
            .flatten()
            .map(|json| Self::deserialize_document(&json))
            .collect()
    }
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn get_by_key(&self, key: &str) -> Result<Option<Document>> {
        let mut conn = self.connection.clone();
        let json: Option<String> = conn
            .get(self.document_key(key))
            .await
            .map_err(|e| redis_error("Failed to get document", e))?;

        json.map(|j| Self::deserialize_document(&j)).transpose()
    }

    async fn find_by_word_or_plural(&self, word: &str) -> Result<Vec<Document>> {
        let mut conn = self.connection.clone();
        let plural_of: Vec<String> = conn
            .smembers(self.plural_key(word))
            .await
            .map_err(|e| redis_error("Failed to read plural index", e))?;

        let mut keys: BTreeSet<String> = plural_of.into_iter().collect();
        keys.insert(word.to_string());
        self.load_documents(&keys).await
    }

    async fn query(&self, query: &CombinationQuery) -> Result<Vec<Document>> {
        query.validate()?;
        if query.any_of.is_empty() {
            return Ok(Vec::new());
        }

        let sets: Vec<String> = query
            .any_of
            .iter()
            .map(|c| self.combination_key(c))
            .collect();

        let mut conn = self.connection.clone();
        let members: Vec<String> = conn
            .sunion(sets)
            .await
            .map_err(|e| redis_error("Failed to query combinations", e))?;

        let keys: BTreeSet<String> = members
            .into_iter()
            .filter(|key| !query.is_excluded(key))
            .collect();
        self.load_documents(&keys).await
    }

    async fn put(&self, document: &Document) -> Result<()> {
        if let Some(previous) = self.get_by_key(&document.words).await? {
            self.write_indices(&previous, false).await?;
        }

        let json = Self::serialize_document(document)?;
        let mut conn = self.connection.clone();
        let _: () = conn
            .set(self.document_key(&document.words), json)
            .await
            .map_err(|e| redis_error("Failed to save document", e))?;

        self.write_indices(document, true).await?;

        tracing::debug!(words = %document.words, "Document saved to Redis");
        Ok(())
    }

    async fn put_if_absent(&self, document: &Document) -> Result<bool> {
        let json = Self::serialize_document(document)?;
        let mut conn = self.connection.clone();
        let created: bool = conn
            .set_nx(self.document_key(&document.words), json)
            .await
            .map_err(|e| redis_error("Failed to create document", e))?;

        if !created {
            tracing::debug!(words = %document.words, "Document already present in Redis");
            return Ok(false);
        }

        if let Err(e) = self.write_indices(document, true).await {
            self.rollback_create(document).await;
            return Err(e);
        }

        tracing::debug!(words = %document.words, "Document created in Redis");
        Ok(true)
    }

    async fn count(&self) -> Result<u64> {
        let mut conn = self.connection.clone();
        conn.scard(self.words_set_key())
            .await
            .map_err(|e| redis_error("Failed to count documents", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Phrase;

    async fn redis_available() -> bool {
        match Client::open("redis://127.0.0.1:6379/15") {
            Ok(client) => match ConnectionManager::new(client).await {
                Ok(mut conn) => redis::cmd("PING")
                    .query_async::<_, String>(&mut conn)
                    .await
                    .is_ok(),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    /// Each test gets its own prefix so runs do not see each other's keys
    async fn create_test_store() -> Option<RedisStore> {
        if !redis_available().await {
            return None;
        }

        let prefix = format!("test-{}", uuid::Uuid::new_v4());
        RedisStore::new_with_prefix("redis://127.0.0.1:6379/15", &prefix)
            .await
            .ok()
    }

    fn doc(words: &str) -> Document {
        Document::new(&Phrase::normalize(words))
    }

    #[tokio::test]
    async fn test_put_and_get_document() {
        let Some(store) = create_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        store.put(&doc("kick the bucket")).await.unwrap();

        let retrieved = store.get_by_key("kick the bucket").await.unwrap();
        assert_eq!(retrieved.unwrap().words, "kick the bucket");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_query_and_exclusions() {
        let Some(store) = create_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        store.put(&doc("kick the bucket")).await.unwrap();
        store.put(&doc("kick off")).await.unwrap();

        let mut query = CombinationQuery::new(vec!["kick bucket".to_string(), "kick off".to_string()]);
        assert_eq!(store.query(&query).await.unwrap().len(), 2);

        query.exclude_words.push("kick off".to_string());
        let found = store.query(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].words, "kick the bucket");
    }

    #[tokio::test]
    async fn test_put_if_absent() {
        let Some(store) = create_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let mut goose = doc("goose");
        goose.plural = Some("geese".to_string());
        assert!(store.put_if_absent(&goose).await.unwrap());
        assert!(!store.put_if_absent(&doc("goose")).await.unwrap());

        let found = store.find_by_word_or_plural("geese").await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_create_is_rolled_back() {
        let Some(store) = create_test_store().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        // A plain string where a set is expected makes SADD fail
        let mut conn = store.connection.clone();
        let _: () = conn
            .set(store.combination_key("cat sat"), "not a set")
            .await
            .unwrap();

        assert!(store.put_if_absent(&doc("the cat sat")).await.is_err());
        assert!(store.get_by_key("the cat sat").await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);

        let query = CombinationQuery::new(vec!["the cat".to_string(), "the sat".to_string()]);
        assert!(store.query(&query).await.unwrap().is_empty());

        let _: () = conn.del(store.combination_key("cat sat")).await.unwrap();
        assert!(store.put_if_absent(&doc("the cat sat")).await.unwrap());
    }
}
