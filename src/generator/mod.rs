//! Document generation for phrases that are not stored yet
//!
//! The generator itself is an external service; [`HttpDocumentGenerator`]
//! talks to it over HTTP. [`CacheFillCoordinator`] wraps a generator with
//! retries, timeouts, single-flight deduplication and persistence.

mod coordinator;
mod http;

pub use coordinator::CacheFillCoordinator;
pub use http::HttpDocumentGenerator;

use crate::config::GeneratorConfig;
use crate::error::{LookupError, Result};
use crate::models::{Document, Phrase};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces a dictionary document for a phrase
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    /// Generate a document.
    ///
    /// The returned document may carry a corrected phrase in `words`; it is
    /// canonicalized before storage.
    async fn generate(&self, phrase: &Phrase) -> std::result::Result<Document, LookupError>;
}

/// Generator used when no endpoint is configured; every call fails
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl DocumentGenerator for UnconfiguredGenerator {
    async fn generate(&self, phrase: &Phrase) -> std::result::Result<Document, LookupError> {
        tracing::warn!(phrase = %phrase, "No document generator endpoint configured");
        Err(LookupError::generator_call(
            "Document generator endpoint is not configured",
        ))
    }
}

/// Create the generator described by configuration
pub fn create_generator(config: &GeneratorConfig) -> Result<Arc<dyn DocumentGenerator>> {
    match config.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(endpoint) => {
            tracing::info!(endpoint = %endpoint, "Using HTTP document generator");
            Ok(Arc::new(HttpDocumentGenerator::new(endpoint, config.timeout_secs)?))
        }
        None => {
            tracing::warn!("generator.endpoint is not set; lookups that miss will fail");
            Ok(Arc::new(UnconfiguredGenerator))
        }
    }
}
