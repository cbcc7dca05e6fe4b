use crate::config::Config;
use crate::config::LimitsConfig;
use crate::error::LookupError;
use crate::generator::{CacheFillCoordinator, DocumentGenerator};
use crate::metrics::{LOOKUP_DURATION_SECONDS, LOOKUP_REQUESTS_TOTAL};
use crate::models::{LookupOutcome, Phrase};
use crate::search::SearchOrchestrator;
use crate::state::DocumentStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main lookup processor
pub struct LookupProcessor {
    store: Arc<dyn DocumentStore>,
    search: SearchOrchestrator,
    cache_fill: CacheFillCoordinator,
    limits: LimitsConfig,
    deadline: Duration,
}

impl LookupProcessor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn DocumentGenerator>,
        config: &Config,
    ) -> Self {
        Self {
            search: SearchOrchestrator::new(store.clone(), config.search.clone()),
            cache_fill: CacheFillCoordinator::new(store.clone(), generator, &config.generator),
            limits: config.limits.clone(),
            deadline: Duration::from_secs(config.server.request_timeout_secs.max(1)),
            store,
        }
    }

    /// Get a reference to the document store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn cache_fill(&self) -> &CacheFillCoordinator {
        &self.cache_fill
    }

    /// Look up raw request text.
    ///
    /// Text that fails normalization or the request limits is rejected
    /// without touching the store or the generator. A lookup that runs past
    /// the request timeout fails with a generator call error; a generation it
    /// started keeps running and stores its document.
    pub async fn lookup(&self, raw: &str) -> LookupOutcome {
        let start = Instant::now();

        let outcome = match Phrase::parse(raw, &self.limits) {
            Ok(phrase) => {
                tracing::info!(phrase = %phrase, "Processing lookup");
                match tokio::time::timeout(self.deadline, self.resolve(&phrase)).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::warn!(
                            phrase = %phrase,
                            timeout_secs = self.deadline.as_secs(),
                            "Lookup timed out"
                        );
                        LookupOutcome::failed(LookupError::generator_call(format!(
                            "Lookup timed out after {} seconds",
                            self.deadline.as_secs()
                        )))
                    }
                }
            }
            Err(error) => {
                tracing::info!(error = %error, "Rejected lookup request");
                LookupOutcome::failed(error)
            }
        };

        let elapsed = start.elapsed();
        LOOKUP_DURATION_SECONDS.observe(elapsed.as_secs_f64());
        LOOKUP_REQUESTS_TOTAL
            .with_label_values(&[outcome.label()])
            .inc();

        tracing::info!(
            outcome = outcome.label(),
            documents = outcome.documents().len(),
            duration_ms = elapsed.as_millis() as u64,
            "Lookup completed"
        );

        outcome
    }

    async fn resolve(&self, phrase: &Phrase) -> LookupOutcome {
        let found = self.search.search(phrase).await;
        self.cache_fill.ensure_result(phrase, found).await
    }
}
