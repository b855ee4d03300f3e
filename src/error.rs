use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tellme
#[derive(Error, Debug)]
pub enum TellmeError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required input (run, qrels, query definitions) could not be opened
    #[error("Cannot open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Collection shard file missing or unreadable
    #[error("Cannot open collection {}", path.display())]
    CollectionNotFound { path: PathBuf },

    /// Document id not present in its collection shard
    #[error("Can't find document {document_id} in {}", path.display())]
    DocumentNotFound { document_id: String, path: PathBuf },

    /// Document id too short to derive a shard number
    #[error("Invalid document id: {0}")]
    InvalidDocumentId(String),

    /// Fewer whitespace-delimited fields than the format requires
    #[error("Malformed line: expected at least {expected} fields, found {found}")]
    MalformedLine { expected: usize, found: usize },

    /// Score or relevance field that is not a number
    #[error("Non-numeric {field}: '{value}'")]
    NumericFormat { field: &'static str, value: String },

    /// Line longer than the configured limit under the reject policy
    #[error("Line {line_no} is {len} bytes, limit is {max}")]
    LineTooLong { line_no: usize, len: usize, max: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TellmeError {
    /// True for errors that only affect a single record and should be
    /// skipped and counted rather than abort the evaluation.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            TellmeError::MalformedLine { .. } | TellmeError::NumericFormat { .. }
        )
    }
}

/// Convenient Result type using TellmeError
pub type Result<T> = std::result::Result<T, TellmeError>;
