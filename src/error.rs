//! Error types for the evaluation harness.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur while pairing, scoring or exporting.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data directory does not exist or is not a directory.
    #[error("Data directory '{0}' does not exist or is not a directory")]
    DataDirNotFound(PathBuf),

    /// A discovered image has no ground-truth transcription next to it.
    #[error("Ground-truth file '{expected}' for image '{image}' is missing")]
    MissingReference { image: PathBuf, expected: PathBuf },

    /// A discovered image has no OCR output next to it.
    #[error(
        "OCR output '{expected}' for image '{image}' is missing; generate evaluation data first"
    )]
    MissingHypothesis { image: PathBuf, expected: PathBuf },

    /// Nothing left to score after discovery and filtering.
    #[error("No evaluable units found in '{0}'")]
    EmptyCorpus(PathBuf),

    /// Configuration file or value error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The external recognizer failed.
    #[error("OCR engine error: {0}")]
    Ocr(String),
}

impl EvalError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means an upstream generation step did not run.
    pub fn is_missing_input(&self) -> bool {
        matches!(
            self,
            EvalError::MissingReference { .. } | EvalError::MissingHypothesis { .. }
        )
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for EvalError {
    fn from(err: csv::Error) -> Self {
        EvalError::Serialization(err.to_string())
    }
}
