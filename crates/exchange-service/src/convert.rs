//! Conversions between stored rows and domain types.

use chrono::{DateTime, SecondsFormat, Utc};
use exchange_core::{
    Book, BookId, Message, MessageId, MessageType, MessageUpdate, PreparedMessage, RequestStatus,
    UserId,
};

use crate::error::{Result, ServiceError};

/// Render a timestamp the way it is stored: RFC 3339, microseconds, `Z`.
///
/// The fixed width keeps lexical order equal to chronological order.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(id: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| ServiceError::InvalidRecord {
            entity: "Message",
            id: id.to_string(),
            reason: format!("bad timestamp {:?}: {}", value, e),
        })
}

fn parse_optional_timestamp(id: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(|v| parse_timestamp(id, v)).transpose()
}

pub(crate) fn book_from_row(row: database::Book) -> Book {
    Book {
        id: BookId(row.id),
        title: row.title,
        owner_id: UserId(row.owner_id),
    }
}

pub(crate) fn message_from_row(row: database::Message) -> Result<Message> {
    let invalid = |reason: String| ServiceError::InvalidRecord {
        entity: "Message",
        id: row.id.clone(),
        reason,
    };

    let message_type = row
        .message_type
        .parse::<MessageType>()
        .map_err(|e| invalid(e.to_string()))?;
    let request_status = row
        .request_status
        .as_deref()
        .map(str::parse::<RequestStatus>)
        .transpose()
        .map_err(|e| invalid(e.to_string()))?;
    let timestamp = parse_timestamp(&row.id, &row.timestamp)?;
    let status_changed_at = parse_optional_timestamp(&row.id, row.status_changed_at.as_deref())?;
    let read_at = parse_optional_timestamp(&row.id, row.read_at.as_deref())?;

    Ok(Message {
        id: MessageId(row.id),
        sender_id: UserId(row.sender_id),
        receiver_id: UserId(row.receiver_id),
        book_id: BookId(row.book_id),
        text: row.text,
        timestamp,
        message_type,
        request_status,
        status_changed_at,
        read: row.read,
        read_at,
    })
}

pub(crate) fn row_from_prepared(id: &str, message: &PreparedMessage) -> database::Message {
    database::Message {
        id: id.to_string(),
        sender_id: message.sender_id.0.clone(),
        receiver_id: message.receiver_id.0.clone(),
        book_id: message.book_id.0,
        text: message.text.clone(),
        timestamp: format_timestamp(message.timestamp),
        message_type: message.message_type.as_str().to_string(),
        request_status: message.request_status.map(|s| s.as_str().to_string()),
        status_changed_at: None,
        read: false,
        read_at: None,
    }
}

pub(crate) fn state_from_update(update: &MessageUpdate) -> database::MessageState {
    database::MessageState {
        request_status: update.request_status.map(|s| s.as_str().to_string()),
        status_changed_at: update.status_changed_at.map(format_timestamp),
        read: update.read,
        read_at: update.read_at.map(format_timestamp),
    }
}
