//! Shared fixtures for the integration tests
//!
//! Provides scripted generators, a store wrapper that records and can fail
//! calls, and a parser for the Prometheus exposition format.

#![allow(dead_code)]

use async_trait::async_trait;
use llm_dictionary::{
    error::{AppError, ErrorKind, LookupError, Result},
    models::{Document, Phrase},
    state::{CombinationQuery, DocumentStore, InMemoryStore},
    generator::DocumentGenerator,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Create a document the way the generator would, indexed by its phrase
pub fn document(words: &str) -> Document {
    Document::new(&Phrase::normalize(words))
}

/// Generator returning a fixed result after an optional delay
pub struct ScriptedGenerator {
    calls: AtomicUsize,
    delay: Duration,
    corrected_words: Option<String>,
    error: Option<LookupError>,
}

impl ScriptedGenerator {
    /// Echo the requested phrase back as a document
    pub fn echo() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            corrected_words: None,
            error: None,
        }
    }

    /// Return a document for a different (corrected) phrase
    pub fn correcting(words: &str) -> Self {
        Self {
            corrected_words: Some(words.to_string()),
            ..Self::echo()
        }
    }

    /// Fail every call with the given kind
    pub fn failing(kind: ErrorKind, message: &str) -> Self {
        Self {
            error: Some(LookupError::new(kind, message)),
            ..Self::echo()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentGenerator for ScriptedGenerator {
    async fn generate(&self, phrase: &Phrase) -> std::result::Result<Document, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(ref error) = self.error {
            return Err(error.clone());
        }

        let mut generated = Document::new(phrase);
        if let Some(ref words) = self.corrected_words {
            // Index fields stay stale here; storage has to rebuild them
            generated.words = words.clone();
        }
        Ok(generated)
    }
}

/// In-memory store that records queries and can be told to fail
#[derive(Default)]
pub struct RecordingStore {
    pub inner: InMemoryStore,
    queries: Mutex<Vec<CombinationQuery>>,
    returned: AtomicUsize,
    fail_exact_probe: bool,
    fail_writes: bool,
    fail_queries_with: Option<String>,
    query_delay: Option<Duration>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_exact_probe(mut self) -> Self {
        self.fail_exact_probe = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Fail every combination query that contains `combination`
    pub fn failing_queries_with(mut self, combination: &str) -> Self {
        self.fail_queries_with = Some(combination.to_string());
        self
    }

    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    pub async fn seed(&self, words: &[&str]) {
        for w in words {
            self.inner.put(&document(w)).await.unwrap();
        }
    }

    pub fn queries(&self) -> Vec<CombinationQuery> {
        self.queries.lock().unwrap().clone()
    }

    /// Documents returned by combination queries, duplicates included
    pub fn returned(&self) -> usize {
        self.returned.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn get_by_key(&self, key: &str) -> Result<Option<Document>> {
        if self.fail_exact_probe {
            return Err(AppError::Database("exact probe unavailable".to_string()));
        }
        self.inner.get_by_key(key).await
    }

    async fn find_by_word_or_plural(&self, word: &str) -> Result<Vec<Document>> {
        self.inner.find_by_word_or_plural(word).await
    }

    async fn query(&self, query: &CombinationQuery) -> Result<Vec<Document>> {
        self.queries.lock().unwrap().push(query.clone());

        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(ref combination) = self.fail_queries_with {
            if query.any_of.contains(combination) {
                return Err(AppError::Database("batch query failed".to_string()));
            }
        }

        let documents = self.inner.query(query).await?;
        self.returned.fetch_add(documents.len(), Ordering::SeqCst);
        Ok(documents)
    }

    async fn put(&self, document: &Document) -> Result<()> {
        if self.fail_writes {
            return Err(AppError::Database("write rejected".to_string()));
        }
        self.inner.put(document).await
    }

    async fn put_if_absent(&self, document: &Document) -> Result<bool> {
        if self.fail_writes {
            return Err(AppError::Database("write rejected".to_string()));
        }
        self.inner.put_if_absent(document).await
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }
}

/// Parse Prometheus exposition format into metric name -> lines
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics = HashMap::new();
    let mut current_metric = String::new();

    for line in output.lines() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with("# HELP") || line.starts_with("# TYPE") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                current_metric = parts[2].to_string();
                metrics
                    .entry(current_metric.clone())
                    .or_insert_with(Vec::new)
                    .push(line.to_string());
            }
        } else if !line.starts_with('#') && !current_metric.is_empty() {
            metrics
                .entry(current_metric.clone())
                .or_insert_with(Vec::new)
                .push(line.to_string());
        }
    }

    metrics
}
