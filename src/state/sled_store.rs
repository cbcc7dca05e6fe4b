use crate::error::{AppError, Result};
use crate::models::Document;
use crate::state::{CombinationQuery, DocumentStore};
use async_trait::async_trait;
use sled::Db;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Persistent document store using Sled embedded database.
///
/// Documents live in the `words` tree keyed by phrase. The `combinations` and
/// `plurals` trees map an index value to the sorted list of phrase keys that
/// carry it.
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    words_tree: sled::Tree,
    combinations_tree: sled::Tree,
    plurals_tree: sled::Tree,
}

impl SledStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref();
        let db = sled::open(&path)
            .map_err(|e| AppError::Database(format!("Failed to open Sled database: {}", e)))?;

        let words_tree = db
            .open_tree("words")
            .map_err(|e| AppError::Database(format!("Failed to open words tree: {}", e)))?;

        let combinations_tree = db
            .open_tree("combinations")
            .map_err(|e| AppError::Database(format!("Failed to open combinations tree: {}", e)))?;

        let plurals_tree = db
            .open_tree("plurals")
            .map_err(|e| AppError::Database(format!("Failed to open plurals tree: {}", e)))?;

        tracing::info!("Initialized Sled store at {:?}", path_str);

        Ok(Self {
            db: Arc::new(db),
            words_tree,
            combinations_tree,
            plurals_tree,
        })
    }

    fn serialize_document(document: &Document) -> Result<Vec<u8>> {
        Ok(bincode::serialize(document)?)
    }

    fn deserialize_document(bytes: &[u8]) -> Result<Document> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn decode_keys(bytes: Option<&[u8]>) -> Result<BTreeSet<String>> {
        match bytes {
            Some(bytes) => Ok(bincode::deserialize(bytes)?),
            None => Ok(BTreeSet::new()),
        }
    }

    /// Add or remove `words` under `value` in an index tree.
    ///
    /// An entry that does not decode is left untouched and reported.
    fn update_index(tree: &sled::Tree, value: &str, words: &str, add: bool) -> Result<()> {
        let mut decode_error = None;

        tree.fetch_and_update(value.as_bytes(), |existing| {
            decode_error = None;
            let mut keys = match Self::decode_keys(existing) {
                Ok(keys) => keys,
                Err(e) => {
                    decode_error = Some(e);
                    return existing.map(|bytes| bytes.to_vec());
                }
            };

            if add {
                keys.insert(words.to_string());
            } else {
                keys.remove(words);
            }

            if keys.is_empty() {
                None
            } else {
                bincode::serialize(&keys).ok()
            }
        })
        .map_err(|e| AppError::Database(format!("Failed to update index: {}", e)))?;

        match decode_error {
            Some(e) => {
                tracing::warn!(index = %value, error = %e, "Corrupt index entry");
                Err(e)
            }
            None => Ok(()),
        }
    }

    fn index(&self, document: &Document) -> Result<()> {
        for combination in &document.combinations {
            Self::update_index(&self.combinations_tree, combination, &document.words, true)?;
        }
        if let Some(ref plural) = document.plural {
            Self::update_index(&self.plurals_tree, plural, &document.words, true)?;
        }
        Ok(())
    }

    fn unindex(&self, document: &Document) -> Result<()> {
        for combination in &document.combinations {
            Self::update_index(&self.combinations_tree, combination, &document.words, false)?;
        }
        if let Some(ref plural) = document.plural {
            Self::update_index(&self.plurals_tree, plural, &document.words, false)?;
        }
        Ok(())
    }

    /// Undo a create whose indexing failed, so a later fill can retry it
    fn rollback_create(&self, document: &Document, value: &[u8]) {
        let entries = document
            .combinations
            .iter()
            .map(|c| (&self.combinations_tree, c))
            .chain(document.plural.iter().map(|p| (&self.plurals_tree, p)));
        for (tree, entry) in entries {
            if let Err(e) = Self::update_index(tree, entry, &document.words, false) {
                tracing::warn!(words = %document.words, index = %entry, error = %e, "Failed to roll back index entry");
            }
        }

        if let Err(e) = self.words_tree.compare_and_swap(
            document.words.as_bytes(),
            Some(value),
            None as Option<&[u8]>,
        ) {
            tracing::error!(words = %document.words, error = %e, "Failed to roll back document");
        }
    }

    fn read_keys(tree: &sled::Tree, value: &str) -> Result<BTreeSet<String>> {
        let bytes = tree
            .get(value.as_bytes())
            .map_err(|e| AppError::Database(format!("Failed to read index: {}", e)))?;
        Self::decode_keys(bytes.as_deref())
    }

    fn read_document(&self, key: &str) -> Result<Option<Document>> {
        match self.words_tree.get(key.as_bytes()) {
            Ok(Some(bytes)) => Ok(Some(Self::deserialize_document(&bytes)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(AppError::Database(format!("Failed to get document: {}", e))),
        }
    }

    fn read_documents(&self, keys: BTreeSet<String>) -> Result<Vec<Document>> {
        let mut documents = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(document) = self.read_document(&key)? {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| AppError::Database(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SledStore {
    async fn get_by_key(&self, key: &str) -> Result<Option<Document>> {
        self.read_document(key)
    }

    async fn find_by_word_or_plural(&self, word: &str) -> Result<Vec<Document>> {
        let mut keys = Self::read_keys(&self.plurals_tree, word)?;
        keys.insert(word.to_string());
        self.read_documents(keys)
    }

    async fn query(&self, query: &CombinationQuery) -> Result<Vec<Document>> {
        query.validate()?;

        let mut keys = BTreeSet::new();
        for combination in &query.any_of {
            keys.extend(Self::read_keys(&self.combinations_tree, combination)?);
        }
        keys.retain(|key| !query.is_excluded(key));

        self.read_documents(keys)
    }

    async fn put(&self, document: &Document) -> Result<()> {
        let value = Self::serialize_document(document)?;

        let previous = self
            .words_tree
            .insert(document.words.as_bytes(), value)
            .map_err(|e| AppError::Database(format!("Failed to save document: {}", e)))?;

        if let Some(bytes) = previous {
            self.unindex(&Self::deserialize_document(&bytes)?)?;
        }
        self.index(document)?;

        self.words_tree
            .flush()
            .map_err(|e| AppError::Database(format!("Failed to flush words tree: {}", e)))?;

        tracing::debug!(words = %document.words, "Document saved to Sled");
        Ok(())
    }

    async fn put_if_absent(&self, document: &Document) -> Result<bool> {
        let value = Self::serialize_document(document)?;

        let swapped = self
            .words_tree
            .compare_and_swap(
                document.words.as_bytes(),
                None as Option<&[u8]>,
                Some(value.as_slice()),
            )
            .map_err(|e| AppError::Database(format!("Failed to create document: {}", e)))?;

        if swapped.is_err() {
            tracing::debug!(words = %document.words, "Document already present in Sled");
            return Ok(false);
        }

        if let Err(e) = self.index(document) {
            self.rollback_create(document, &value);
            return Err(e);
        }

        self.words_tree
            .flush()
            .map_err(|e| AppError::Database(format!("Failed to flush words tree: {}", e)))?;

        tracing::debug!(words = %document.words, "Document created in Sled");
        Ok(true)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.words_tree.len() as u64)
    }
}
