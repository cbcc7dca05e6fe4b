//! Combination search over the document store

use crate::indexing::divide_into_batches;
use crate::metrics::{SEARCH_BATCH_QUERIES_TOTAL, SEARCH_EXACT_MATCHES_TOTAL};
use crate::models::Phrase;
use crate::search::config::SearchConfig;
use crate::search::query::QueryOptimizer;
use crate::search::SearchResult;
use crate::state::{CombinationQuery, DocumentStore};
use futures::future::join_all;
use std::sync::Arc;

/// Batch query wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Wave {
    /// Unoptimized groups, sent first
    First,
    /// Remaining groups, narrowed by what the first wave found
    Second,
}

/// Finds stored documents related to a phrase
pub struct SearchOrchestrator {
    store: Arc<dyn DocumentStore>,
    config: SearchConfig,
    optimizer: QueryOptimizer,
}

impl SearchOrchestrator {
    pub fn new(store: Arc<dyn DocumentStore>, config: SearchConfig) -> Self {
        let optimizer = QueryOptimizer::new(config.effective_max_exclusions());
        Self {
            store,
            config,
            optimizer,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search for a normalized phrase.
    ///
    /// An exact key hit is returned on its own. Otherwise single words are
    /// matched against keys and plural forms, and longer phrases go through
    /// the batched combination search. Store failures never abort a search:
    /// they are logged and the affected part contributes nothing.
    pub async fn search(&self, phrase: &Phrase) -> SearchResult {
        match self.store.get_by_key(phrase.as_str()).await {
            Ok(Some(document)) => {
                SEARCH_EXACT_MATCHES_TOTAL.inc();
                tracing::debug!(phrase = %phrase, "Exact match");
                return SearchResult::exact(document);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(phrase = %phrase, error = %e, "Exact match probe failed");
            }
        }

        let combinations = phrase.combinations();
        if combinations.is_empty() {
            return self.search_single_word(phrase).await;
        }

        self.search_combinations(phrase, &combinations).await
    }

    async fn search_single_word(&self, phrase: &Phrase) -> SearchResult {
        let mut result = SearchResult::default();

        match self.store.find_by_word_or_plural(phrase.as_str()).await {
            Ok(documents) => result.merge_documents(documents),
            Err(e) => {
                tracing::warn!(phrase = %phrase, error = %e, "Single word search failed");
                result.failed_batches += 1;
            }
        }

        result
    }

    async fn search_combinations(&self, phrase: &Phrase, combinations: &[String]) -> SearchResult {
        let groups = divide_into_batches(combinations, self.config.effective_batch_size());
        let first_wave_len = self.config.first_wave_len(groups.len());
        let (first, second) = groups.split_at(first_wave_len);

        tracing::debug!(
            phrase = %phrase,
            combinations = combinations.len(),
            groups = groups.len(),
            first_wave = first.len(),
            "Starting combination search"
        );

        let mut result = SearchResult::default();

        let queries = first
            .iter()
            .map(|group| CombinationQuery::new(group.clone()))
            .collect();
        result.merge(self.run_wave(Wave::First, queries).await);

        if !second.is_empty() {
            let queries = second
                .iter()
                .map(|group| {
                    let query = CombinationQuery::new(group.clone());
                    if self.config.optimize_later_batches {
                        self.optimizer.narrow(query, &result)
                    } else {
                        query
                    }
                })
                .collect();
            result.merge(self.run_wave(Wave::Second, queries).await);
        }

        tracing::debug!(
            phrase = %phrase,
            found = result.len(),
            failed_batches = result.failed_batches,
            "Combination search finished"
        );

        result
    }

    /// Run every query of a wave concurrently and wait for all of them
    async fn run_wave(&self, wave: Wave, queries: Vec<CombinationQuery>) -> SearchResult {
        let timeout = self.config.batch_timeout();

        let pending = queries.iter().map(|query| async move {
            tokio::time::timeout(timeout, self.store.query(query)).await
        });
        let outcomes = join_all(pending).await;

        let mut result = SearchResult::default();
        for outcome in outcomes {
            match outcome {
                Ok(Ok(documents)) => {
                    SEARCH_BATCH_QUERIES_TOTAL
                        .with_label_values(&[wave.as_ref(), "success"])
                        .inc();
                    result.merge_documents(documents);
                }
                Ok(Err(e)) => {
                    SEARCH_BATCH_QUERIES_TOTAL
                        .with_label_values(&[wave.as_ref(), "error"])
                        .inc();
                    tracing::warn!(wave = %wave, error = %e, "Batch query failed");
                    result.failed_batches += 1;
                }
                Err(_) => {
                    SEARCH_BATCH_QUERIES_TOTAL
                        .with_label_values(&[wave.as_ref(), "timeout"])
                        .inc();
                    tracing::warn!(wave = %wave, timeout_ms = self.config.batch_timeout_ms, "Batch query timed out");
                    result.failed_batches += 1;
                }
            }
        }

        result
    }
}
