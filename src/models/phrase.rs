use crate::config::LimitsConfig;
use crate::error::{ErrorKind, LookupError};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref MARKUP_TAG: Regex = Regex::new(r"<[^>]*>").expect("valid markup regex");
    static ref DISALLOWED_CHARS: Regex =
        Regex::new(r"[^\p{L}\p{N}\s'\-]").expect("valid character class regex");
}

/// A normalized word or phrase; also the storage key of a document.
///
/// Normalization fuses lines, drops markup and punctuation (apostrophes and
/// hyphens survive), lowercases, collapses whitespace and removes adjacent
/// repeated words.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phrase(String);

impl Phrase {
    /// Normalize raw text without enforcing any limits
    pub fn normalize(raw: &str) -> Self {
        let without_tags = MARKUP_TAG.replace_all(raw, " ");
        let cleaned = DISALLOWED_CHARS.replace_all(&without_tags, "");
        let lowered = cleaned.to_lowercase();

        let mut words: Vec<&str> = Vec::new();
        for word in lowered.split_whitespace() {
            if words.last() != Some(&word) {
                words.push(word);
            }
        }

        Phrase(words.join(" "))
    }

    /// Normalize raw request text and check it against the request limits
    pub fn parse(raw: &str, limits: &LimitsConfig) -> Result<Self, LookupError> {
        let phrase = Self::normalize(raw);

        if phrase.is_empty() {
            return Err(LookupError::new(ErrorKind::EmptyRequest, "Empty request."));
        }

        if phrase.word_count() > limits.max_words {
            return Err(LookupError::new(
                ErrorKind::TooManyWords,
                format!("Limit of {} words exceeded", limits.max_words),
            ));
        }

        if phrase.char_count() > limits.max_chars {
            return Err(LookupError::new(
                ErrorKind::TooManyCharacters,
                format!("Limit of {} characters exceeded", limits.max_chars),
            ));
        }

        Ok(phrase)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|w| !w.is_empty())
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Two-word combinations used to index and query this phrase
    pub fn combinations(&self) -> Vec<String> {
        crate::indexing::make_combinations(&self.0)
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Phrase {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> LimitsConfig {
        LimitsConfig::default()
    }

    #[test]
    fn test_normalize_trims_lowercases_and_collapses() {
        let phrase = Phrase::normalize("  Hot\tUnder\n\nthe   Collar ");
        assert_eq!(phrase.as_str(), "hot under the collar");
        assert_eq!(phrase.word_count(), 4);
    }

    #[test]
    fn test_normalize_removes_adjacent_duplicates() {
        assert_eq!(Phrase::normalize("the the cat cat sat").as_str(), "the cat sat");
        // Only adjacent repeats are collapsed
        assert_eq!(Phrase::normalize("so what so").as_str(), "so what so");
    }

    #[test]
    fn test_normalize_strips_markup_and_punctuation() {
        assert_eq!(Phrase::normalize("<b>break</b> the ice!").as_str(), "break the ice");
        assert_eq!(Phrase::normalize("don't give up.").as_str(), "don't give up");
        assert_eq!(Phrase::normalize("well-known").as_str(), "well-known");
    }

    #[test]
    fn test_normalize_keeps_accented_letters() {
        assert_eq!(Phrase::normalize("Canción Ñandú").as_str(), "canción ñandú");
    }

    #[test]
    fn test_parse_rejects_empty() {
        let err = Phrase::parse("  ?! ", &limits()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyRequest);
    }

    #[test]
    fn test_parse_rejects_too_many_words() {
        let raw = (0..14).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let err = Phrase::parse(&raw, &limits()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TooManyWords);
    }

    #[test]
    fn test_parse_rejects_too_many_characters() {
        let raw = "a".repeat(131);
        let err = Phrase::parse(&raw, &limits()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TooManyCharacters);
    }

    #[test]
    fn test_parse_accepts_limits_exactly() {
        let raw = "a".repeat(130);
        assert_eq!(Phrase::parse(&raw, &limits()).unwrap().char_count(), 130);

        let raw = (0..13).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let phrase = Phrase::parse(&raw, &limits()).unwrap();
        assert_eq!(phrase.word_count(), 13);
    }

    #[test]
    fn test_combinations_follow_normalized_text() {
        let phrase = Phrase::normalize("The CAT sat");
        assert_eq!(phrase.combinations(), vec!["the cat", "the sat", "cat sat"]);
    }
}
