use crate::indexing::make_combinations;
use crate::models::Phrase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored dictionary record.
///
/// Documents are keyed by `words` and never updated once persisted. The
/// `combinations` field is the inverted-index entry for the record and is
/// always recomputed from `words` before storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Canonical phrase, also the storage key
    pub words: String,

    #[serde(default)]
    pub word_count: usize,

    /// Plural form, when the phrase has one
    #[serde(default)]
    pub plural: Option<String>,

    /// Grammatical categories the phrase belongs to
    #[serde(default)]
    pub types: Vec<GrammaticalType>,

    /// One entry per grammatical type
    #[serde(default)]
    pub varieties: Vec<WordVariety>,

    /// Every two-word combination of `words`
    #[serde(default)]
    pub combinations: Vec<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Create an empty document for a phrase
    pub fn new(phrase: &Phrase) -> Self {
        Self {
            words: phrase.as_str().to_string(),
            word_count: phrase.word_count(),
            plural: None,
            types: Vec::new(),
            varieties: Vec::new(),
            combinations: phrase.combinations(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    /// Storage key
    pub fn key(&self) -> &str {
        &self.words
    }

    /// Canonicalize a generated document before it is persisted.
    ///
    /// The key is normalized the same way request text is, falling back to
    /// `requested` when the generator returned nothing usable, and the index
    /// fields are derived from the resulting key.
    pub fn prepare_for_storage(mut self, requested: &Phrase) -> Self {
        let mut canonical = Phrase::normalize(&self.words);
        if canonical.is_empty() {
            canonical = requested.clone();
        }

        self.words = canonical.as_str().to_string();
        self.word_count = canonical.word_count();
        self.combinations = canonical.combinations();
        self.plural = self
            .plural
            .map(|plural| Phrase::normalize(&plural).into_string())
            .filter(|plural| !plural.is_empty() && *plural != self.words);
        self.image_url = self.image_url.filter(|url| !url.trim().is_empty());
        self
    }

    /// Whether the document is reachable through any of `combinations`
    pub fn has_any_combination(&self, combinations: &[String]) -> bool {
        combinations.iter().any(|c| self.combinations.contains(c))
    }

    /// Whether a single word names this document directly
    pub fn matches_word_or_plural(&self, word: &str) -> bool {
        self.words == word || self.plural.as_deref() == Some(word)
    }
}

/// Grammatical category of a phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammaticalType {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Preposition,
    Conjunction,
    Interjection,
    Idiom,
    #[serde(other)]
    Other,
}

/// Dictionary content for one grammatical use of a phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordVariety {
    #[serde(rename = "type")]
    pub kind: GrammaticalType,
    #[serde(default)]
    pub meanings: Vec<String>,
    #[serde(default)]
    pub translations: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub variants: Vec<String>,
}

impl WordVariety {
    pub fn new(kind: GrammaticalType) -> Self {
        Self {
            kind,
            meanings: Vec::new(),
            translations: Vec::new(),
            synonyms: Vec::new(),
            antonyms: Vec::new(),
            examples: Vec::new(),
            variants: Vec::new(),
        }
    }
}
