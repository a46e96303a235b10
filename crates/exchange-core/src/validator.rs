//! Ownership checks for purchase requests and swap offers.

use crate::catalog::Catalog;
use crate::error::ExchangeError;
use crate::types::{PreparedMessage, RequestStatus};

/// Validate a defaulted message against the book it refers to.
///
/// Only request-type messages are checked. For those the book must exist,
/// the receiver must own it and the sender must not. On success the request
/// starts out `pending`. Any other message type is returned untouched without
/// consulting the catalog.
pub async fn validate_request<C>(
    catalog: &C,
    mut message: PreparedMessage,
) -> Result<PreparedMessage, ExchangeError>
where
    C: Catalog + ?Sized,
{
    if !message.message_type.is_request() {
        return Ok(message);
    }

    let book = catalog
        .get_book(message.book_id)
        .await?
        .ok_or(ExchangeError::NotFound {
            book_id: message.book_id,
        })?;

    if message.receiver_id != book.owner_id {
        return Err(ExchangeError::InvalidReceiver {
            book_id: book.id,
            receiver_id: message.receiver_id,
            owner_id: book.owner_id,
        });
    }

    if message.sender_id == book.owner_id {
        return Err(ExchangeError::SelfRequest {
            book_id: book.id,
            sender_id: message.sender_id,
            message_type: message.message_type,
        });
    }

    message.request_status = Some(RequestStatus::Pending);
    Ok(message)
}
