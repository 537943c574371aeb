//! Error types for moa-core.

use std::path::Path;

/// Errors shared across the MOA crates.
///
/// Variants are `#[non_exhaustive]` so downstream crates match with a
/// wildcard arm.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A record that was looked up does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record ("user", "card", ...)
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The operation conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input failed a validation rule.
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation, if known
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// Configuration is missing or malformed.
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error with the path that caused it.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read or written
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` alias used throughout moa-core.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a not-found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a validation error without a field name.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a validation error tied to a field.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path being accessed.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::Conflict(_) | Error::Validation { .. }
        )
    }
}
