use crate::error::{AppError, ErrorKind, LookupError, Result};
use crate::models::{Document, GrammaticalType, Phrase, WordVariety};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Calls a remote dictionary generator over HTTP
#[derive(Clone)]
pub struct HttpDocumentGenerator {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    words: &'a str,
}

/// Generator reply, either bare or wrapped in `data`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateEnvelope {
    Wrapped { data: GenerateResponse },
    Plain(GenerateResponse),
}

impl GenerateEnvelope {
    fn into_inner(self) -> GenerateResponse {
        match self {
            GenerateEnvelope::Wrapped { data } => data,
            GenerateEnvelope::Plain(response) => response,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    docs: Vec<WireDocument>,
    #[serde(default)]
    error: String,
    #[serde(default = "missing_code")]
    error_code: i32,
}

/// A reply without `errorCode` is only trusted if it carries documents
fn missing_code() -> i32 {
    crate::error::SUCCESS_CODE
}

/// Generated document as sent by the generator.
///
/// Besides the stored shape, older generators send the dictionary content as
/// flat arrays on the document; those are folded into a single variety.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireDocument {
    words: Option<String>,
    plural: Option<String>,
    types: Vec<GrammaticalType>,
    varieties: Vec<WordVariety>,
    image_url: Option<String>,
    meanings: Vec<String>,
    translations: Vec<String>,
    synonyms: Vec<String>,
    antonyms: Vec<String>,
    examples: Vec<String>,
}

impl WireDocument {
    fn into_document(self, requested: &Phrase) -> Document {
        let mut varieties = self.varieties;
        let has_flat_content = !(self.meanings.is_empty()
            && self.translations.is_empty()
            && self.synonyms.is_empty()
            && self.antonyms.is_empty()
            && self.examples.is_empty());

        if varieties.is_empty() && has_flat_content {
            let kind = self.types.first().copied().unwrap_or(GrammaticalType::Other);
            let mut variety = WordVariety::new(kind);
            variety.meanings = self.meanings;
            variety.translations = self.translations;
            variety.synonyms = self.synonyms;
            variety.antonyms = self.antonyms;
            variety.examples = self.examples;
            varieties.push(variety);
        }

        let words = self
            .words
            .filter(|w| !w.trim().is_empty())
            .unwrap_or_else(|| requested.as_str().to_string());

        Document {
            word_count: 0,
            words,
            plural: self.plural,
            types: self.types,
            varieties,
            combinations: Vec::new(),
            image_url: self.image_url,
            created_at: Utc::now(),
        }
    }
}

impl HttpDocumentGenerator {
    /// Create a new HTTP generator client
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, phrase: &Phrase) -> std::result::Result<GenerateResponse, LookupError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("User-Agent", "llm-dictionary/1.0")
            .json(&GenerateRequest {
                words: phrase.as_str(),
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::generator_call(format!(
                        "Generator request timed out after {} seconds",
                        self.timeout_secs
                    ))
                } else if e.is_connect() {
                    LookupError::generator_call(format!("Failed to connect to generator: {}", e))
                } else {
                    LookupError::generator_call(format!("Generator request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::generator_call(format!(
                "Generator returned status {}: {}",
                status, body
            )));
        }

        let envelope: GenerateEnvelope = response.json().await.map_err(|e| {
            LookupError::generator_call(format!("Failed to decode generator response: {}", e))
        })?;

        Ok(envelope.into_inner())
    }
}

#[async_trait::async_trait]
impl super::DocumentGenerator for HttpDocumentGenerator {
    async fn generate(&self, phrase: &Phrase) -> std::result::Result<Document, LookupError> {
        let response = self.call(phrase).await?;

        match ErrorKind::from_code(response.error_code) {
            None => {
                let first = response.docs.into_iter().next().ok_or_else(|| {
                    LookupError::generator_call("Generator reported success without a document")
                })?;
                tracing::debug!(phrase = %phrase, "Generator returned a document");
                Ok(first.into_document(phrase))
            }
            Some(kind) => {
                let message = if response.error.is_empty() {
                    format!("Generator reported error code {}", response.error_code)
                } else {
                    response.error
                };
                Err(LookupError::new(kind, message))
            }
        }
    }
}
