//! Tests for the combination search

mod common;

use common::RecordingStore;
use llm_dictionary::models::Phrase;
use llm_dictionary::search::*;
use std::sync::Arc;
use std::time::Duration;

/// 8 words -> 28 combinations -> groups of 10, 10 and 8
const EIGHT_WORDS: &str = "a b c d e f g h";

async fn search_with(store: Arc<RecordingStore>, config: SearchConfig) -> SearchResult {
    SearchOrchestrator::new(store, config)
        .search(&Phrase::normalize(EIGHT_WORDS))
        .await
}

#[tokio::test]
async fn test_exact_match_skips_combination_queries() {
    let store = Arc::new(RecordingStore::new());
    store.seed(&["dog", "hot dog"]).await;

    let search = SearchOrchestrator::new(store.clone(), SearchConfig::default());
    let result = search.search(&Phrase::normalize("dog")).await;

    assert!(result.exact_match);
    assert_eq!(result.keys().collect::<Vec<_>>(), vec!["dog"]);
    assert!(store.queries().is_empty());
}

#[tokio::test]
async fn test_single_word_does_not_batch() {
    let store = Arc::new(RecordingStore::new());
    store.seed(&["hot dog"]).await;

    let search = SearchOrchestrator::new(store.clone(), SearchConfig::default());
    let result = search.search(&Phrase::normalize("hot")).await;

    assert!(result.is_empty());
    assert!(!result.exact_match);
    assert!(store.queries().is_empty());
}

#[tokio::test]
async fn test_batches_respect_backend_limit() {
    let store = Arc::new(RecordingStore::new());

    let result = search_with(store.clone(), SearchConfig::default()).await;
    assert!(result.is_empty());

    let mut sizes: Vec<usize> = store.queries().iter().map(|q| q.any_of.len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![8, 10, 10]);
    assert!(store.queries().iter().all(|q| q.validate().is_ok()));
}

#[tokio::test]
async fn test_second_wave_excludes_first_wave_results() {
    let store = Arc::new(RecordingStore::new());
    store.seed(&["a b", "g h"]).await;

    let result = search_with(store.clone(), SearchConfig::default()).await;
    assert_eq!(result.keys().collect::<Vec<_>>(), vec!["a b", "g h"]);

    let queries = store.queries();
    assert_eq!(queries.len(), 3);
    assert!(queries[0].exclude_words.is_empty());
    for later in &queries[1..] {
        assert_eq!(later.exclude_words, vec!["a b"]);
    }
}

#[tokio::test]
async fn test_narrowing_can_be_disabled() {
    let store = Arc::new(RecordingStore::new());
    store.seed(&["a b"]).await;

    let config = SearchConfigBuilder::new()
        .optimize_later_batches(false)
        .build();
    search_with(store.clone(), config).await;

    assert!(store.queries().iter().all(|q| q.exclude_words.is_empty()));
}

#[tokio::test]
async fn test_document_found_by_two_batches_is_returned_once() {
    let store = Arc::new(RecordingStore::new());
    // "a b" lands in the first group, "b f" in the second
    store.seed(&["a b f"]).await;

    let config = SearchConfigBuilder::new().unoptimized_fraction(1.0).build();
    let result = search_with(store.clone(), config).await;

    assert_eq!(store.returned(), 2);
    assert_eq!(result.len(), 1);
    assert_eq!(result.keys().next(), Some("a b f"));
}

#[tokio::test]
async fn test_failing_batch_does_not_abort_search() {
    let store = Arc::new(RecordingStore::new().failing_queries_with("g h"));
    store.seed(&["a b", "c d", "g h"]).await;

    let result = search_with(store.clone(), SearchConfig::default()).await;

    assert_eq!(result.failed_batches, 1);
    assert_eq!(result.keys().collect::<Vec<_>>(), vec!["a b", "c d"]);
}

#[tokio::test]
async fn test_slow_batches_time_out() {
    let store = Arc::new(RecordingStore::new().with_query_delay(Duration::from_millis(300)));
    store.seed(&["a b"]).await;

    let config = SearchConfigBuilder::new().batch_timeout_ms(20).build();
    let result = search_with(store, config).await;

    assert!(result.is_empty());
    assert_eq!(result.failed_batches, 3);
}

#[tokio::test]
async fn test_failed_exact_probe_is_treated_as_miss() {
    let store = Arc::new(RecordingStore::new().failing_exact_probe());
    store.seed(&["break the ice"]).await;

    let search = SearchOrchestrator::new(store.clone(), SearchConfig::default());
    let result = search.search(&Phrase::normalize("break the ice")).await;

    assert!(!result.exact_match);
    assert_eq!(result.keys().collect::<Vec<_>>(), vec!["break the ice"]);
    assert_eq!(store.queries().len(), 1);
}

#[tokio::test]
async fn test_related_phrase_found_through_shared_combination() {
    let store = Arc::new(RecordingStore::new());
    store.seed(&["hot under the collar", "cold feet"]).await;

    let search = SearchOrchestrator::new(store, SearchConfig::default());
    let result = search.search(&Phrase::normalize("hot collar")).await;

    assert!(!result.exact_match);
    assert_eq!(result.keys().collect::<Vec<_>>(), vec!["hot under the collar"]);
}
