use crate::config::GeneratorConfig;
use crate::error::LookupError;
use crate::generator::DocumentGenerator;
use crate::metrics::{CACHE_FILL_TOTAL, GENERATOR_ATTEMPTS_TOTAL, IN_FLIGHT_GENERATIONS};
use crate::models::{Document, LookupOutcome, Phrase};
use crate::search::SearchResult;
use crate::state::DocumentStore;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use std::time::Duration;

type FillFuture = Shared<BoxFuture<'static, LookupOutcome>>;

/// Turns search misses into stored documents.
///
/// Concurrent fills for the same phrase share one generation. Each generation
/// runs on its own task, so a caller that goes away does not cancel it.
#[derive(Clone)]
pub struct CacheFillCoordinator {
    store: Arc<dyn DocumentStore>,
    generator: Arc<dyn DocumentGenerator>,
    attempt_timeout: Duration,
    max_attempts: u32,
    in_flight: Arc<DashMap<String, FillFuture>>,
}

impl CacheFillCoordinator {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn DocumentGenerator>,
        config: &GeneratorConfig,
    ) -> Self {
        Self {
            store,
            generator,
            attempt_timeout: Duration::from_secs(config.timeout_secs),
            max_attempts: config.max_attempts.max(1),
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Return the prior result when it found anything, otherwise generate
    pub async fn ensure_result(&self, phrase: &Phrase, prior: SearchResult) -> LookupOutcome {
        if prior.exact_match || !prior.is_empty() {
            let exact_match = prior.exact_match;
            return LookupOutcome::Found {
                documents: prior.into_documents(),
                exact_match,
            };
        }

        self.fill(phrase).await
    }

    /// Number of phrases currently being generated
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Generate and store a document, joining a running generation for the
    /// same phrase if there is one
    pub async fn fill(&self, phrase: &Phrase) -> LookupOutcome {
        let pending = match self.in_flight.entry(phrase.as_str().to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(phrase = %phrase, "Joining in-flight generation");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let task = FillTask {
                    store: self.store.clone(),
                    generator: self.generator.clone(),
                    attempt_timeout: self.attempt_timeout,
                    max_attempts: self.max_attempts,
                    in_flight: self.in_flight.clone(),
                    phrase: phrase.clone(),
                };

                let handle = tokio::spawn(task.run());
                let shared = async move {
                    handle.await.unwrap_or_else(|e| {
                        LookupOutcome::failed(LookupError::generator_call(format!(
                            "Generation task failed: {}",
                            e
                        )))
                    })
                }
                .boxed()
                .shared();

                entry.insert(shared.clone());
                shared
            }
        };

        pending.await
    }
}

/// One generation, owned by its spawned task
struct FillTask {
    store: Arc<dyn DocumentStore>,
    generator: Arc<dyn DocumentGenerator>,
    attempt_timeout: Duration,
    max_attempts: u32,
    in_flight: Arc<DashMap<String, FillFuture>>,
    phrase: Phrase,
}

impl FillTask {
    async fn run(self) -> LookupOutcome {
        IN_FLIGHT_GENERATIONS.inc();
        let outcome = self.generate_and_store().await;
        IN_FLIGHT_GENERATIONS.dec();

        self.in_flight.remove(self.phrase.as_str());
        outcome
    }

    async fn generate_and_store(&self) -> LookupOutcome {
        let document = match self.generate().await {
            Ok(document) => document.prepare_for_storage(&self.phrase),
            Err(error) => {
                CACHE_FILL_TOTAL.with_label_values(&["generator_error"]).inc();
                tracing::error!(phrase = %self.phrase, error = %error, "Document generation failed");
                return LookupOutcome::failed(error);
            }
        };

        match self.store.put_if_absent(&document).await {
            Ok(true) => {
                CACHE_FILL_TOTAL.with_label_values(&["created"]).inc();
                tracing::info!(
                    phrase = %self.phrase,
                    words = %document.words,
                    "Stored generated document"
                );
                LookupOutcome::Found {
                    documents: vec![document],
                    exact_match: false,
                }
            }
            Ok(false) => {
                CACHE_FILL_TOTAL.with_label_values(&["existing"]).inc();
                tracing::debug!(words = %document.words, "Document already stored, returning stored copy");
                let stored = match self.store.get_by_key(&document.words).await {
                    Ok(Some(stored)) => stored,
                    Ok(None) => document,
                    Err(e) => {
                        tracing::warn!(words = %document.words, error = %e, "Failed to read stored document");
                        document
                    }
                };
                LookupOutcome::Found {
                    documents: vec![stored],
                    exact_match: false,
                }
            }
            Err(e) => {
                CACHE_FILL_TOTAL.with_label_values(&["persistence_error"]).inc();
                tracing::error!(words = %document.words, error = %e, "Failed to store generated document");
                LookupOutcome::Failed {
                    documents: vec![document],
                    error: LookupError::persistence(e.to_string()),
                }
            }
        }
    }

    async fn generate(&self) -> Result<Document, LookupError> {
        let mut last_error = LookupError::generator_call("Generator was not called");

        for attempt in 1..=self.max_attempts {
            match tokio::time::timeout(self.attempt_timeout, self.generator.generate(&self.phrase))
                .await
            {
                Ok(Ok(document)) => {
                    GENERATOR_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();
                    return Ok(document);
                }
                Ok(Err(error)) => {
                    GENERATOR_ATTEMPTS_TOTAL.with_label_values(&["error"]).inc();
                    tracing::warn!(
                        phrase = %self.phrase,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "Generator attempt failed"
                    );
                    last_error = error;
                }
                Err(_) => {
                    GENERATOR_ATTEMPTS_TOTAL.with_label_values(&["timeout"]).inc();
                    tracing::warn!(
                        phrase = %self.phrase,
                        attempt,
                        max_attempts = self.max_attempts,
                        "Generator attempt timed out"
                    );
                    last_error = LookupError::generator_call(format!(
                        "Generator timed out after {} seconds",
                        self.attempt_timeout.as_secs()
                    ));
                }
            }
        }

        Err(last_error)
    }
}
