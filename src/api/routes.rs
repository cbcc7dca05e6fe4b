use crate::api::{handlers, AppState};
use crate::config::ServerConfig;
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router.
///
/// Lookups enforce the request timeout themselves so that they can answer
/// in-band; only the operational endpoints sit behind `TimeoutLayer`.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let request_timeout = Duration::from_secs(config.request_timeout_secs);

    let operational = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::readiness_check))
        // Metrics
        .route("/metrics", get(handlers::metrics))
        .route_layer(TimeoutLayer::new(request_timeout));

    let lookup = Router::new()
        .route("/", post(handlers::lookup))
        .route("/v1/lookup", post(handlers::lookup));

    operational
        .merge(lookup)
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
