//! Persistence error types.
//!
//! All persistence operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use std::path::PathBuf;

use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings document on disk could not be parsed or encoded.
    #[error("Failed to {operation} settings file: {path}")]
    InvalidFormat {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Stored value could not be encoded.
    #[error("Failed to serialize value for key '{key}'")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored value could not be decoded.
    #[error("Failed to deserialize value for key '{key}'")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing store is unusable (e.g. a poisoned lock).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::InvalidFormat {
                operation, path, ..
            } => {
                if *operation == "parse" {
                    format!(
                        "The settings file at {} is not valid JSON and was ignored.",
                        path.display()
                    )
                } else {
                    format!("Could not encode the settings file at {}", path.display())
                }
            }
            Self::Serialization { key, .. } => {
                format!("An error occurred while saving the table settings ({key}).")
            }
            Self::Deserialization { key, .. } => {
                format!("The saved table settings ({key}) could not be read and were ignored.")
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::Unavailable(reason) => format!("Table settings storage is unavailable: {reason}"),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::InvalidFormat { operation, .. } => {
                if *operation == "parse" {
                    Some("The next column change will replace the file.".into())
                } else {
                    None
                }
            }
            Self::Serialization { .. } => None,
            Self::Deserialization { .. } => {
                Some("Re-add the columns you need; the saved layout will be replaced.".into())
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
            Self::Unavailable(_) => Some("Restart the session.".into()),
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
