//! Error types for the tabrix pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tabrix operations
pub type Result<T> = std::result::Result<T, TabrixError>;

/// Main error type for the tabrix pipeline
#[derive(Error, Debug)]
pub enum TabrixError {
    /// Schema could not be inferred: empty sample, duplicate column names,
    /// or a mixed-type column under strict typing.
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    #[error("Dimension mismatch: expected {expected} columns, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Training error: {0}")]
    Training(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TabrixError {
    fn from(err: serde_json::Error) -> Self {
        TabrixError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for TabrixError {
    fn from(err: csv::Error) -> Self {
        TabrixError::Data(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TabrixError::Schema("no rows available".to_string());
        assert_eq!(err.to_string(), "Schema error: no rows available");
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = TabrixError::DimensionMismatch {
            expected: 48,
            actual: 50,
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected 48 columns, got 50"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TabrixError = io_err.into();
        assert!(matches!(err, TabrixError::Io(_)));
    }
}
