pub mod store;
pub mod cache;
pub mod sled_store;
pub mod redis_store;
pub mod factory;

pub use store::*;
pub use cache::*;
pub use sled_store::SledStore;
pub use redis_store::RedisStore;
pub use factory::{create_store, create_in_memory_store};

use crate::error::{AppError, Result};
use crate::indexing::MAX_ARRAY_QUERY_VALUES;
use crate::models::Document;
use async_trait::async_trait;

/// Document storage operations.
///
/// The interface mirrors what a hosted document database offers: exact key
/// reads, "array contains any" queries over the `combinations` field with an
/// optional "not in" filter on the key, and inserts. Both filters accept at
/// most [`MAX_ARRAY_QUERY_VALUES`] values.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get a document by its phrase key
    async fn get_by_key(&self, key: &str) -> Result<Option<Document>>;

    /// Find documents whose key or plural form equals `word`
    async fn find_by_word_or_plural(&self, word: &str) -> Result<Vec<Document>>;

    /// Find documents containing any of the query's combinations
    async fn query(&self, query: &CombinationQuery) -> Result<Vec<Document>>;

    /// Store a document under its key, replacing any previous one
    async fn put(&self, document: &Document) -> Result<()>;

    /// Store a document unless its key is already taken.
    ///
    /// Returns `false` when a document already existed; it is left untouched.
    async fn put_if_absent(&self, document: &Document) -> Result<bool>;

    /// Number of stored documents
    async fn count(&self) -> Result<u64>;
}

/// An "array contains any" query over document combinations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinationQuery {
    /// Match documents holding at least one of these combinations
    pub any_of: Vec<String>,

    /// Skip documents with these keys
    pub exclude_words: Vec<String>,
}

impl CombinationQuery {
    pub fn new(any_of: Vec<String>) -> Self {
        Self {
            any_of,
            exclude_words: Vec::new(),
        }
    }

    /// Reject queries the backend would refuse
    pub fn validate(&self) -> Result<()> {
        if self.any_of.len() > MAX_ARRAY_QUERY_VALUES {
            return Err(AppError::Validation(format!(
                "contains-any filter supports at most {} values, got {}",
                MAX_ARRAY_QUERY_VALUES,
                self.any_of.len()
            )));
        }

        if self.exclude_words.len() > MAX_ARRAY_QUERY_VALUES {
            return Err(AppError::Validation(format!(
                "not-in filter supports at most {} values, got {}",
                MAX_ARRAY_QUERY_VALUES,
                self.exclude_words.len()
            )));
        }

        Ok(())
    }

    /// Whether a document satisfies both filters
    pub fn matches(&self, document: &Document) -> bool {
        document.has_any_combination(&self.any_of) && !self.is_excluded(document.key())
    }

    pub fn is_excluded(&self, key: &str) -> bool {
        self.exclude_words.iter().any(|w| w == key)
    }
}
