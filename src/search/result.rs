//! Merged search results

use crate::models::Document;
use std::collections::BTreeMap;

/// Documents found for a phrase, deduplicated by key
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    documents: BTreeMap<String, Document>,

    /// The phrase itself is stored as a document
    pub exact_match: bool,

    /// Batch queries that failed or timed out
    pub failed_batches: usize,
}

impl SearchResult {
    pub fn exact(document: Document) -> Self {
        let mut result = Self {
            exact_match: true,
            ..Default::default()
        };
        result.documents.insert(document.words.clone(), document);
        result
    }

    /// Add documents; a key that is already present keeps its first document
    pub fn merge_documents(&mut self, documents: Vec<Document>) {
        for document in documents {
            self.documents
                .entry(document.words.clone())
                .or_insert(document);
        }
    }

    pub fn merge(&mut self, other: SearchResult) {
        self.exact_match |= other.exact_match;
        self.failed_batches += other.failed_batches;
        self.merge_documents(other.documents.into_values().collect());
    }

    /// Found keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents.into_values().collect()
    }
}
