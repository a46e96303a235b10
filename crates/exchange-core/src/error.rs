//! Error types for message preparation.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::types::{BookId, MessageType, RequestStatus, UserId};

/// Reasons a proposed message write is rejected.
///
/// The first four variants are caller-correctable input errors. `Catalog`
/// carries collaborator failures unchanged.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The referenced book does not exist.
    #[error("book not found: {book_id}")]
    NotFound { book_id: BookId },

    /// The receiver of a request is not the owner of the book.
    #[error("receiver {receiver_id} does not own book {book_id} (owner is {owner_id})")]
    InvalidReceiver {
        book_id: BookId,
        receiver_id: UserId,
        owner_id: UserId,
    },

    /// The sender owns the book they are making a request for.
    #[error("{sender_id} cannot send a {message_type} for their own book {book_id}")]
    SelfRequest {
        book_id: BookId,
        sender_id: UserId,
        message_type: MessageType,
    },

    /// The proposed status is not reachable from the current one.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    /// The catalog lookup itself failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl ExchangeError {
    /// Whether this error is a rejected input rather than a collaborator failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, ExchangeError::Catalog(_))
    }
}
