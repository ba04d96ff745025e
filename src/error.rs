//! Error types for the Pigeonhole library.
//!
//! All failures are represented by the [`PigeonholeError`] enum. The
//! training pipeline is optimistic batch code: only missing inputs,
//! malformed datasets, and misuse of unfitted components are fatal.

use std::io;

use thiserror::Error;

/// The main error type for Pigeonhole operations.
#[derive(Error, Debug)]
pub enum PigeonholeError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Dataset loading errors (missing file, missing columns).
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Vectorizer errors (fitting, unfitted transform).
    #[error("Vectorizer error: {0}")]
    Vectorizer(String),

    /// Feature fusion errors (row-count mismatches).
    #[error("Fusion error: {0}")]
    Fusion(String),

    /// Model errors (training, prediction, persistence).
    #[error("Model error: {0}")]
    Model(String),

    /// CSV parsing errors.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PigeonholeError.
pub type Result<T> = std::result::Result<T, PigeonholeError>;

impl PigeonholeError {
    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        PigeonholeError::Dataset(msg.into())
    }

    /// Create a new vectorizer error.
    pub fn vectorizer<S: Into<String>>(msg: S) -> Self {
        PigeonholeError::Vectorizer(msg.into())
    }

    /// Create a new fusion error.
    pub fn fusion<S: Into<String>>(msg: S) -> Self {
        PigeonholeError::Fusion(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        PigeonholeError::Model(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        PigeonholeError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PigeonholeError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = PigeonholeError::dataset("missing column");
        assert_eq!(error.to_string(), "Dataset error: missing column");

        let error = PigeonholeError::fusion("row mismatch");
        assert_eq!(error.to_string(), "Fusion error: row mismatch");

        let error = PigeonholeError::model("not trained");
        assert_eq!(error.to_string(), "Model error: not trained");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = PigeonholeError::from(io_error);

        match error {
            PigeonholeError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
