use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while ingesting and correlating threat feeds.
#[derive(Error, Debug)]
pub enum ThreatError {
    /// A feed file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A duration field was not three colon-separated non-negative integers.
    #[error("Invalid duration format: {0}")]
    DurationFormat(String),

    /// The leaked-megabytes field was not a non-negative integer.
    #[error("Invalid data leaked value: {0}")]
    DataLeakedFormat(String),

    /// A feed record did not have the expected number of fields.
    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    /// Connection credentials failed the shape checks.
    #[error("Invalid connection credentials: {0}")]
    InvalidCredentials(String),

    /// The relational store rejected a connection or a statement.
    #[error("Storage error during {operation}: {message}")]
    Storage { operation: String, message: String },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be serialised.
    #[error("Failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ThreatError {
    /// Build a [`ThreatError::Storage`] from any displayable driver error.
    pub fn storage(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Storage {
            operation: operation.into(),
            message: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the threat crates.
pub type Result<T> = std::result::Result<T, ThreatError>;
