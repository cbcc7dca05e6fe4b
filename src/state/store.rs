use crate::error::Result;
use crate::models::Document;
use crate::state::{CombinationQuery, DocumentStore};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;

/// In-memory document store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    documents: Arc<DashMap<String, Document>>,
    combination_index: Arc<DashMap<String, BTreeSet<String>>>,
    plural_index: Arc<DashMap<String, BTreeSet<String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(DashMap::new()),
            combination_index: Arc::new(DashMap::new()),
            plural_index: Arc::new(DashMap::new()),
        }
    }

    fn index(&self, document: &Document) {
        for combination in &document.combinations {
            self.combination_index
                .entry(combination.clone())
                .or_default()
                .insert(document.words.clone());
        }

        if let Some(ref plural) = document.plural {
            self.plural_index
                .entry(plural.clone())
                .or_default()
                .insert(document.words.clone());
        }
    }

    fn unindex(&self, document: &Document) {
        for combination in &document.combinations {
            if let Some(mut keys) = self.combination_index.get_mut(combination) {
                keys.remove(&document.words);
            }
        }

        if let Some(ref plural) = document.plural {
            if let Some(mut keys) = self.plural_index.get_mut(plural) {
                keys.remove(&document.words);
            }
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get_by_key(&self, key: &str) -> Result<Option<Document>> {
        Ok(self.documents.get(key).map(|entry| entry.clone()))
    }

    async fn find_by_word_or_plural(&self, word: &str) -> Result<Vec<Document>> {
        let mut keys: BTreeSet<String> = self
            .plural_index
            .get(word)
            .map(|entry| entry.clone())
            .unwrap_or_default();
        keys.insert(word.to_string());

        Ok(keys
            .iter()
            .filter_map(|key| self.documents.get(key).map(|entry| entry.clone()))
            .filter(|document| document.matches_word_or_plural(word))
            .collect())
    }

    async fn query(&self, query: &CombinationQuery) -> Result<Vec<Document>> {
        query.validate()?;

        let mut keys = BTreeSet::new();
        for combination in &query.any_of {
            if let Some(entry) = self.combination_index.get(combination) {
                keys.extend(entry.iter().cloned());
            }
        }

        // The document may have been replaced since the index was read
        Ok(keys
            .into_iter()
            .filter_map(|key| self.documents.get(&key).map(|entry| entry.clone()))
            .filter(|document| query.matches(document))
            .collect())
    }

    async fn put(&self, document: &Document) -> Result<()> {
        if let Some(previous) = self
            .documents
            .insert(document.words.clone(), document.clone())
        {
            self.unindex(&previous);
        }
        self.index(document);

        tracing::debug!(words = %document.words, "Document saved");
        Ok(())
    }

    async fn put_if_absent(&self, document: &Document) -> Result<bool> {
        match self.documents.entry(document.words.clone()) {
            Entry::Occupied(_) => {
                tracing::debug!(words = %document.words, "Document already present");
                Ok(false)
            }
            Entry::Vacant(entry) => {
                entry.insert(document.clone());
                self.index(document);
                tracing::debug!(words = %document.words, "Document created");
                Ok(true)
            }
        }
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.documents.len() as u64)
    }
}
