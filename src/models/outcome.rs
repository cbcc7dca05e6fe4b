use crate::error::{LookupError, SUCCESS_CODE};
use crate::models::Document;
use serde::{Deserialize, Serialize};

/// Result of a lookup request
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// Documents were found in storage or generated and persisted
    Found {
        documents: Vec<Document>,
        exact_match: bool,
    },

    /// The lookup failed; `documents` may still hold a generated document
    /// that could not be persisted
    Failed {
        documents: Vec<Document>,
        error: LookupError,
    },
}

impl LookupOutcome {
    pub fn failed(error: LookupError) -> Self {
        LookupOutcome::Failed {
            documents: Vec::new(),
            error,
        }
    }

    pub fn documents(&self) -> &[Document] {
        match self {
            LookupOutcome::Found { documents, .. } | LookupOutcome::Failed { documents, .. } => {
                documents
            }
        }
    }

    pub fn is_exact_match(&self) -> bool {
        matches!(self, LookupOutcome::Found { exact_match: true, .. })
    }

    pub fn error(&self) -> Option<&LookupError> {
        match self {
            LookupOutcome::Found { .. } => None,
            LookupOutcome::Failed { error, .. } => Some(error),
        }
    }

    /// Short label used for metrics and logs
    pub fn label(&self) -> &'static str {
        match self {
            LookupOutcome::Found { exact_match: true, .. } => "exact",
            LookupOutcome::Found { .. } => "found",
            LookupOutcome::Failed { error, .. } if error.kind.is_input_error() => "rejected",
            LookupOutcome::Failed { .. } => "failed",
        }
    }
}

/// Wire shape of a lookup response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    #[serde(default)]
    pub docs: Vec<Document>,
    #[serde(default)]
    pub error: String,
    #[serde(default = "success_code")]
    pub error_code: i32,
    #[serde(default)]
    pub exact_match: bool,
}

fn success_code() -> i32 {
    SUCCESS_CODE
}

impl LookupResponse {
    pub fn is_success(&self) -> bool {
        self.error_code == SUCCESS_CODE
    }
}

impl From<LookupOutcome> for LookupResponse {
    fn from(outcome: LookupOutcome) -> Self {
        match outcome {
            LookupOutcome::Found {
                documents,
                exact_match,
            } => LookupResponse {
                docs: documents,
                error: String::new(),
                error_code: SUCCESS_CODE,
                exact_match,
            },
            LookupOutcome::Failed { documents, error } => LookupResponse {
                docs: documents,
                error_code: error.code(),
                error: error.message,
                exact_match: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::Phrase;

    #[test]
    fn test_found_outcome_maps_to_success_response() {
        let doc = Document::new(&Phrase::normalize("dog"));
        let response = LookupResponse::from(LookupOutcome::Found {
            documents: vec![doc.clone()],
            exact_match: true,
        });

        assert!(response.is_success());
        assert!(response.exact_match);
        assert_eq!(response.docs, vec![doc]);
        assert!(response.error.is_empty());
    }

    #[test]
    fn test_failed_outcome_carries_code_and_message() {
        let response = LookupResponse::from(LookupOutcome::failed(LookupError::new(
            ErrorKind::InvalidPhrase,
            "Invalid phrase",
        )));

        assert_eq!(response.error_code, 3);
        assert_eq!(response.error, "Invalid phrase");
        assert!(response.docs.is_empty());
        assert!(!response.exact_match);
    }

    #[test]
    fn test_response_field_names() {
        let response = LookupResponse::from(LookupOutcome::Found {
            documents: vec![],
            exact_match: false,
        });
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["errorCode"], -1);
        assert_eq!(value["exactMatch"], false);
        assert!(value["docs"].is_array());
    }

    #[test]
    fn test_outcome_labels() {
        let rejected = LookupOutcome::failed(LookupError::new(ErrorKind::EmptyRequest, "empty"));
        let failed = LookupOutcome::failed(LookupError::generator_call("down"));
        assert_eq!(rejected.label(), "rejected");
        assert_eq!(failed.label(), "failed");
    }
}
