//! Query narrowing for later search waves

use crate::search::SearchResult;
use crate::state::CombinationQuery;

/// Adds a "not in" filter on already-found keys so later batches do not
/// fetch documents a previous wave returned.
///
/// Narrowing only saves reads; deduplication of the merged result does not
/// depend on it.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptimizer {
    max_exclusions: usize,
}

impl QueryOptimizer {
    pub fn new(max_exclusions: usize) -> Self {
        Self { max_exclusions }
    }

    /// Exclude up to `max_exclusions` found keys, taking the
    /// lexicographically first ones
    pub fn narrow(&self, mut query: CombinationQuery, already_found: &SearchResult) -> CombinationQuery {
        query.exclude_words = already_found
            .keys()
            .take(self.max_exclusions)
            .map(str::to_string)
            .collect();
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Document, Phrase};

    fn found(words: &[&str]) -> SearchResult {
        let mut result = SearchResult::default();
        result.merge_documents(
            words
                .iter()
                .map(|w| Document::new(&Phrase::normalize(w)))
                .collect(),
        );
        result
    }

    #[test]
    fn test_narrow_excludes_found_keys() {
        let optimizer = QueryOptimizer::new(10);
        let query = CombinationQuery::new(vec!["a b".to_string()]);

        let narrowed = optimizer.narrow(query, &found(&["zeta", "alpha"]));
        assert_eq!(narrowed.exclude_words, vec!["alpha", "zeta"]);
        assert_eq!(narrowed.any_of, vec!["a b"]);
    }

    #[test]
    fn test_narrow_caps_exclusions() {
        let optimizer = QueryOptimizer::new(10);
        let words: Vec<String> = (0..15).map(|i| format!("word{:02}", i)).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();

        let narrowed = optimizer.narrow(CombinationQuery::default(), &found(&refs));
        assert_eq!(narrowed.exclude_words.len(), 10);
        assert_eq!(narrowed.exclude_words.first().map(String::as_str), Some("word00"));
        assert_eq!(narrowed.exclude_words.last().map(String::as_str), Some("word09"));
        assert!(narrowed.validate().is_ok());
    }

    #[test]
    fn test_narrow_with_nothing_found() {
        let optimizer = QueryOptimizer::new(10);
        let narrowed = optimizer.narrow(CombinationQuery::default(), &SearchResult::default());
        assert!(narrowed.exclude_words.is_empty());
    }
}
