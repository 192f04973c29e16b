//! Error types for classifier operations.

use thiserror::Error;

/// Errors that can occur while talking to the classification service.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Failed to reach the classifier service
    #[error("Failed to connect to classifier service: {0}")]
    Connection(String),

    /// Request timed out
    #[error("Classifier request timed out after {0} seconds")]
    Timeout(u64),

    /// Service answered with a non-success status
    #[error("Classifier API error (HTTP {status}): {body}")]
    Http { status: u16, body: String },

    /// Response did not parse as the expected structured output
    #[error("Failed to parse classifier output: {0}")]
    Parse(String),

    /// Returned pattern is not a valid regular expression
    #[error("Classifier returned an invalid pattern: {0}")]
    InvalidPattern(String),
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        ClassifierError::Parse(err.to_string())
    }
}

/// Result type for classifier operations.
pub type ClassifierResult<T> = Result<T, ClassifierError>;
