use std::path::Path;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ExtractPatchError {
    #[error("Failed to access file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize response JSON: {source}")]
    ResponseSerialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("File '{path}' is busy: another extractpatch run holds its lock")]
    ResourceBusy { path: String },

    #[error(
        "File changed while it was being rewritten. Expected hash '{expected_hash}', got '{actual_hash}'"
    )]
    PreconditionFailed {
        expected_hash: String,
        actual_hash: String,
    },

    #[error("{} rewrite rule(s) matched nothing in '{path}': {}", .rules.len(), .rules.join(", "))]
    UnmatchedRules { path: String, rules: Vec<String> },
}

impl ExtractPatchError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let (kind, suggestion) = match self {
            Self::Io { .. } => ("io_error", None),
            Self::ResponseSerialization { .. } => ("serialization_error", None),
            Self::InvalidRequest { .. } => ("invalid_request", None),
            Self::ResourceBusy { .. } => (
                "resource_busy",
                Some("Retry after the other run completes".to_string()),
            ),
            Self::PreconditionFailed { .. } => (
                "precondition_failed",
                Some("Re-run once nothing else is editing the file".to_string()),
            ),
            Self::UnmatchedRules { .. } => (
                "unmatched_rules",
                Some(
                    "Check that the file still has the original extractGoldPrice layout, or drop --strict to accept partial rewrites"
                        .to_string(),
                ),
            ),
        };

        ErrorResponse {
            error: ErrorBody {
                r#type: kind.to_string(),
                message: self.to_string(),
                suggestion,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub r#type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}
