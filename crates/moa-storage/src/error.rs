//! Error types for moa-storage

use thiserror::Error;

/// Result type alias for moa-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in moa-storage
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from moa-core
    #[error("Core error: {0}")]
    Core(#[from] moa_core::Error),

    /// The record to update or delete does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A unique key is already taken.
    #[error("{entity} with this {field} already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
    },

    /// A stored row could not be turned back into a domain value.
    #[error("Invalid stored {entity}: {message}")]
    InvalidData {
        entity: &'static str,
        message: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn duplicate(entity: &'static str, field: &'static str) -> Self {
        Error::Duplicate { entity, field }
    }

    pub fn invalid_data(entity: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidData {
            entity,
            message: message.into(),
        }
    }

    /// Whether the error is about the request rather than the backend.
    pub fn is_client_error(&self) -> bool {
        match self {
            Error::NotFound { .. } | Error::Duplicate { .. } => true,
            Error::Core(e) => e.is_client_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_display() {
        assert_eq!(
            Error::duplicate("user", "login id").to_string(),
            "user with this login id already exists"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::not_found("card", "x").is_client_error());
        assert!(Error::duplicate("share", "token").is_client_error());
        assert!(!Error::invalid_data("user", "bad gender").is_client_error());
        assert!(Error::Core(moa_core::Error::validation("bad")).is_client_error());
    }
}
