use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from bincode::Error
impl From<bincode::Error> for AppError {
    fn from(err: bincode::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

/// Classification of a failed lookup.
///
/// Numeric codes only exist on the wire; everything inside the crate matches
/// on the variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyRequest,
    InvalidWord,
    InvalidPhraseWord,
    InvalidPhrase,
    TooManyWords,
    TooManyCharacters,
    InvalidRequest,
    GeneratorCall,
    Persistence,
    /// A code reported by the generator that this service does not know.
    Unclassified(i32),
}

impl ErrorKind {
    /// Wire code reported in `errorCode`
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::EmptyRequest => 0,
            ErrorKind::InvalidWord => 1,
            ErrorKind::InvalidPhraseWord => 2,
            ErrorKind::InvalidPhrase => 3,
            ErrorKind::TooManyWords => 4,
            ErrorKind::TooManyCharacters => 5,
            ErrorKind::InvalidRequest => 6,
            ErrorKind::GeneratorCall => 7,
            ErrorKind::Persistence => 8,
            ErrorKind::Unclassified(code) => *code,
        }
    }

    /// Map a code reported by the generator back to a kind.
    ///
    /// Returns `None` for the success code.
    pub fn from_code(code: i32) -> Option<Self> {
        let kind = match code {
            SUCCESS_CODE => return None,
            0 => ErrorKind::EmptyRequest,
            1 => ErrorKind::InvalidWord,
            2 => ErrorKind::InvalidPhraseWord,
            3 => ErrorKind::InvalidPhrase,
            4 => ErrorKind::TooManyWords,
            5 => ErrorKind::TooManyCharacters,
            6 => ErrorKind::InvalidRequest,
            7 => ErrorKind::GeneratorCall,
            8 => ErrorKind::Persistence,
            other => ErrorKind::Unclassified(other),
        };
        Some(kind)
    }

    /// Whether the failure was caused by the request text itself
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::EmptyRequest
                | ErrorKind::InvalidWord
                | ErrorKind::InvalidPhraseWord
                | ErrorKind::InvalidPhrase
                | ErrorKind::TooManyWords
                | ErrorKind::TooManyCharacters
                | ErrorKind::InvalidRequest
        )
    }
}

/// `errorCode` value of a successful lookup
pub const SUCCESS_CODE: i32 = -1;

/// Domain error carried by a failed lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct LookupError {
    pub kind: ErrorKind,
    pub message: String,
}

impl LookupError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn generator_call(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneratorCall, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Persistence, message)
    }

    pub fn code(&self) -> i32 {
        self.kind.code()
    }
}
