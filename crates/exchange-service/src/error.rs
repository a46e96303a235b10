//! Error types for service operations.

use database::{DatabaseError, ValidationError};
use exchange_core::ExchangeError;
use thiserror::Error;

/// Errors that can occur on the message write path.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The write was rejected by the message rules.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// A text field failed validation.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The message changed between read and write.
    #[error("message {id} was modified concurrently")]
    Conflict { id: String },

    /// A stored record could not be interpreted.
    #[error("invalid {entity} record {id}: {reason}")]
    InvalidRecord {
        entity: &'static str,
        id: String,
        reason: String,
    },

    /// Storage failure.
    #[error("database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict { id, .. } => ServiceError::Conflict { id },
            other => ServiceError::Database(other),
        }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
