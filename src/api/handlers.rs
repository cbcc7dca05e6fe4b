use crate::api::AppState;
use crate::error::{ErrorKind, LookupError};
use crate::metrics::gather_metrics;
use crate::models::{LookupOutcome, LookupResponse};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        documents: None,
    })
}

/// Readiness check: the document store must answer
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime_seconds = state.started_at.elapsed().as_secs();

    match state.processor.store().count().await {
        Ok(count) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                uptime_seconds,
                documents: Some(count),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Document store is not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    uptime_seconds,
                    documents: None,
                }),
            )
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<u64>,
}

/// Prometheus exposition
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

/// Lookup request, optionally wrapped in `data`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LookupRequest {
    Wrapped { data: LookupBody },
    Plain(LookupBody),
}

#[derive(Debug, Deserialize)]
pub struct LookupBody {
    pub words: String,
}

impl LookupRequest {
    pub fn is_wrapped(&self) -> bool {
        matches!(self, LookupRequest::Wrapped { .. })
    }

    pub fn words(&self) -> &str {
        match self {
            LookupRequest::Wrapped { data } | LookupRequest::Plain(data) => &data.words,
        }
    }
}

/// Lookup reply, wrapped in `data` when the request was
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LookupReply {
    Wrapped { data: LookupResponse },
    Plain(LookupResponse),
}

impl LookupReply {
    fn new(response: LookupResponse, wrapped: bool) -> Self {
        if wrapped {
            LookupReply::Wrapped { data: response }
        } else {
            LookupReply::Plain(response)
        }
    }
}

/// Look up a word or phrase.
///
/// Always answers 200; failures are reported in `error` and `errorCode`.
/// The body is parsed by hand so that malformed requests get the same
/// response shape as everything else.
pub async fn lookup(State(state): State<AppState>, body: Bytes) -> Json<LookupReply> {
    let request_id = Uuid::new_v4();

    let request: LookupRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::info!(request_id = %request_id, error = %e, "Malformed lookup request");
            let outcome = LookupOutcome::failed(LookupError::new(
                ErrorKind::InvalidRequest,
                "Invalid request format",
            ));
            return Json(LookupReply::new(outcome.into(), false));
        }
    };

    let outcome = state
        .processor
        .lookup(request.words())
        .instrument(tracing::info_span!("lookup", request_id = %request_id))
        .await;

    Json(LookupReply::new(outcome.into(), request.is_wrapped()))
}
