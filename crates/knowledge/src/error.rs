//! Error types produced while loading knowledge datasets.
//!
//! Errors carry owned strings rather than wrapped `io::Error` / `serde_json`
//! values so they stay cloneable and comparable in tests.

use thiserror::Error;

/// Errors that can occur while loading knowledge datasets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KnowledgeError {
    /// The dataset directory does not exist or is not a directory.
    #[error("dataset directory not found: {0}")]
    DirectoryNotFound(String),

    /// A dataset file could not be read.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// A dataset file is not valid JSON or not a recognized dataset shape.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// A single record failed validation.
    #[error("{source_name} entry {position}: {reason}")]
    InvalidRecord {
        source_name: String,
        position: usize,
        reason: String,
    },
}

impl KnowledgeError {
    /// True for errors that reject a single record but leave the rest of the
    /// dataset usable.
    pub fn is_record_level(&self) -> bool {
        matches!(self, KnowledgeError::InvalidRecord { .. })
    }
}
