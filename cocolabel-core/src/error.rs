// ============================================================================
// cocolabel-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for cocolabel-core
//
// This module defines the error types used throughout the cocolabel-core
// library. It provides a unified error enum covering input validation
// failures, derived-data consistency failures, I/O and collaborator errors.
//
// KEY COMPONENTS:
// - CoreError: Main error enum with variants for different error categories
// - CoreResult: Type alias for Result with CoreError as the error type
//
// ERROR CATEGORIES:
// - Input errors: Parse, UnknownCategories, TimestampFormat, InputNotFound
// - Output errors: OutputExists
// - Internal errors: InternalConsistency (a bug in the filter stage)
// - Collaborator errors: ChecksumMismatch, Download, Archive, Storage

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the cocolabel-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The dataset document did not parse or had an unexpected shape.
    #[error("Failed to parse dataset '{context}': {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Requested category names that the source dataset does not define.
    #[error("Categories not found in dataset: {}", .0.join(", "))]
    UnknownCategories(Vec<String>),

    /// The write target already exists and the caller did not allow overwriting.
    #[error("Output path already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Image {image_id} has unparsable capture date '{value}' (expected YYYY-MM-DD HH:MM:SS)")]
    TimestampFormat { image_id: i64, value: String },

    /// Derived data broke an invariant the filter stage guarantees.
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),

    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Download failed: {0}")]
    Download(String),

    /// A downloaded archive could not be read or unpacked.
    #[error("Archive extraction failed: {0}")]
    Archive(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for cocolabel-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Download(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_categories_lists_every_name() {
        let err = CoreError::UnknownCategories(vec!["dragon".to_string(), "unicorn".to_string()]);
        assert_eq!(
            err.to_string(),
            "Categories not found in dataset: dragon, unicorn"
        );
    }

    #[test]
    fn timestamp_error_names_the_image() {
        let err = CoreError::TimestampFormat {
            image_id: 42,
            value: "yesterday".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Image 42"));
        assert!(msg.contains("'yesterday'"));
    }
}
