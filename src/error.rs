//! Error types for dialog operations

use thiserror::Error;

/// Dialog operation result type
pub type Result<T> = std::result::Result<T, DialogError>;

/// Dialog operation errors
#[derive(Error, Debug)]
pub enum DialogError {
    /// Dialog type outside the closed set
    #[error("Invalid dialog type: {value} (must be one of: {valid})")]
    InvalidType { value: String, valid: String },

    /// `incomplete` dialogs must carry a disposition
    #[error("Dialog type 'incomplete' requires a disposition")]
    MissingDisposition,

    /// Start timestamp could not be parsed
    #[error("Invalid start timestamp: {0}")]
    InvalidStart(String),

    /// A field failed structural validation
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// HEAD or GET returned a non-success status
    #[error("Failed to fetch {method} {url}: status {status}")]
    Fetch {
        method: &'static str,
        url: String,
        status: u16,
    },

    /// Response body exceeds the configured limit
    #[error("Response from {url} exceeds the {limit} byte body limit")]
    TooLarge { url: String, limit: u64 },

    /// Connection-level failure talking to the remote host
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed external reference
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DialogError {
    pub(crate) fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DialogError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised while validating dialog fields
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DialogError::InvalidType { .. }
                | DialogError::MissingDisposition
                | DialogError::InvalidStart(_)
                | DialogError::InvalidField { .. }
        )
    }

    /// True when a remote fetch came back with a non-success status or an
    /// oversized body
    pub fn is_fetch(&self) -> bool {
        matches!(self, DialogError::Fetch { .. } | DialogError::TooLarge { .. })
    }
}
