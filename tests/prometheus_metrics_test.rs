//! Tests for the Prometheus metrics exported by the lookup pipeline

mod common;

use common::{parse_prometheus_output, RecordingStore, ScriptedGenerator};
use llm_dictionary::{
    config::Config,
    metrics::{gather_metrics, init_metrics, LOOKUP_REQUESTS_TOTAL},
    processing::LookupProcessor,
};
use std::sync::Arc;

/// Metric names follow Prometheus conventions
fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

#[tokio::test]
async fn test_lookup_pipeline_exports_metrics() {
    init_metrics().unwrap();

    let store = Arc::new(RecordingStore::new());
    let generator = Arc::new(ScriptedGenerator::echo());
    let processor = LookupProcessor::new(store, generator, &Config::default());

    let before = LOOKUP_REQUESTS_TOTAL.with_label_values(&["found"]).get();

    // Miss, generate, then a hit on the stored document
    processor.lookup("a b c d e f g h").await;
    processor.lookup("a b c d e f g h").await;
    // Rejected
    processor.lookup("").await;

    let after = LOOKUP_REQUESTS_TOTAL.with_label_values(&["found"]).get();
    assert!(after >= before + 1.0);

    let metrics = parse_prometheus_output(&gather_metrics());
    for name in [
        "llm_dictionary_lookup_requests_total",
        "llm_dictionary_lookup_duration_seconds",
        "llm_dictionary_search_batch_queries_total",
        "llm_dictionary_search_exact_matches_total",
        "llm_dictionary_cache_fill_total",
        "llm_dictionary_generator_attempts_total",
        "llm_dictionary_in_flight_generations",
    ] {
        assert!(metrics.contains_key(name), "missing metric {}", name);
    }

    let batches = &metrics["llm_dictionary_search_batch_queries_total"];
    assert!(batches.iter().any(|line| line.contains("wave=\"first\"")));
    assert!(batches.iter().any(|line| line.contains("wave=\"second\"")));

    let lookups = &metrics["llm_dictionary_lookup_requests_total"];
    assert!(lookups.iter().any(|line| line.contains("outcome=\"rejected\"")));
    assert!(lookups.iter().any(|line| line.contains("outcome=\"exact\"")));
}

#[test]
fn test_metric_names_are_valid() {
    init_metrics().unwrap();
    for name in parse_prometheus_output(&gather_metrics()).keys() {
        assert!(is_valid_metric_name(name), "invalid metric name {}", name);
    }
}
