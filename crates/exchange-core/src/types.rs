//! Domain types for books, users and messages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque user identity supplied by the authentication layer.
///
/// Only compared for equality; no other attribute is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Create a user id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Catalog identifier of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub i64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique message identifier, assigned by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A book as seen by the message core: only its identity and owner matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub owner_id: UserId,
}

/// Error returned when parsing an enum from its stored string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// Kind of a message exchanged between two users about a book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Plain conversation.
    #[default]
    General,
    /// Offer to buy the receiver's book.
    PurchaseRequest,
    /// Offer to swap books with the receiver.
    SwapOffer,
    SwapAccepted,
    SwapDeclined,
    BorrowRequest,
    BorrowAccepted,
    BorrowDeclined,
}

impl MessageType {
    /// Every message type, in declaration order.
    pub const ALL: [MessageType; 8] = [
        MessageType::General,
        MessageType::PurchaseRequest,
        MessageType::SwapOffer,
        MessageType::SwapAccepted,
        MessageType::SwapDeclined,
        MessageType::BorrowRequest,
        MessageType::BorrowAccepted,
        MessageType::BorrowDeclined,
    ];

    /// Whether messages of this type carry a request status.
    ///
    /// Only purchase requests and swap offers go through the status machine;
    /// borrow requests are informational.
    pub fn is_request(self) -> bool {
        matches!(self, MessageType::PurchaseRequest | MessageType::SwapOffer)
    }

    /// Stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::General => "general",
            MessageType::PurchaseRequest => "purchase_request",
            MessageType::SwapOffer => "swap_offer",
            MessageType::SwapAccepted => "swap_accepted",
            MessageType::SwapDeclined => "swap_declined",
            MessageType::BorrowRequest => "borrow_request",
            MessageType::BorrowAccepted => "borrow_accepted",
            MessageType::BorrowDeclined => "borrow_declined",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "message type",
                value: s.to_string(),
            })
    }
}

/// Lifecycle status of a purchase request or swap offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
    Completed,
}

impl RequestStatus {
    /// Every status, in declaration order.
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::Pending,
        RequestStatus::Accepted,
        RequestStatus::Declined,
        RequestStatus::Cancelled,
        RequestStatus::Completed,
    ];

    /// Stored string form.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Declined => "declined",
            RequestStatus::Cancelled => "cancelled",
            RequestStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "request status",
                value: s.to_string(),
            })
    }
}

/// A proposed message, as submitted by the caller before any defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub book_id: BookId,
    pub text: String,
    /// Creation time; the current time is used when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Message kind; `general` is used when absent.
    #[serde(default)]
    pub message_type: Option<MessageType>,
}

impl NewMessage {
    /// A general message with no timestamp or type set.
    pub fn new(
        sender_id: impl Into<UserId>,
        receiver_id: impl Into<UserId>,
        book_id: BookId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            book_id,
            text: text.into(),
            timestamp: None,
            message_type: None,
        }
    }

    /// Set the message type.
    pub fn with_type(mut self, message_type: MessageType) -> Self {
        self.message_type = Some(message_type);
        self
    }

    /// Set the creation timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A message ready to be persisted: every defaultable field is filled in and,
/// for request-type messages, the initial status is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub book_id: BookId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub message_type: MessageType,
    pub request_status: Option<RequestStatus>,
}

impl PreparedMessage {
    /// Attach the persisted id, producing the stored message.
    pub fn into_message(self, id: MessageId) -> Message {
        Message {
            id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            book_id: self.book_id,
            text: self.text,
            timestamp: self.timestamp,
            message_type: self.message_type,
            request_status: self.request_status,
            status_changed_at: None,
            read: false,
            read_at: None,
        }
    }
}

/// A persisted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub book_id: BookId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub message_type: MessageType,
    pub request_status: Option<RequestStatus>,
    pub status_changed_at: Option<DateTime<Utc>>,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Whether this message is governed by the request status machine.
    pub fn is_request(&self) -> bool {
        self.message_type.is_request()
    }

    /// Return a copy of this message with an approved update applied.
    pub fn with_update(&self, update: &MessageUpdate) -> Message {
        let mut next = self.clone();
        if let Some(status) = update.request_status {
            next.request_status = Some(status);
        }
        if let Some(at) = update.status_changed_at {
            next.status_changed_at = Some(at);
        }
        if let Some(read) = update.read {
            next.read = read;
        }
        if let Some(at) = update.read_at {
            next.read_at = Some(at);
        }
        next
    }
}

/// Changes a caller proposes for an existing message.
///
/// Only the mutable fields are representable; sender, receiver, book and type
/// are fixed at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChanges {
    #[serde(default)]
    pub request_status: Option<RequestStatus>,
    #[serde(default)]
    pub read: Option<bool>,
}

impl MessageChanges {
    /// Propose a status change.
    pub fn status(status: RequestStatus) -> Self {
        Self {
            request_status: Some(status),
            read: None,
        }
    }

    /// Propose marking the message as read.
    pub fn mark_read() -> Self {
        Self {
            request_status: None,
            read: Some(true),
        }
    }
}

/// An approved set of field writes produced by the transition guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageUpdate {
    pub request_status: Option<RequestStatus>,
    pub status_changed_at: Option<DateTime<Utc>>,
    pub read: Option<bool>,
    pub read_at: Option<DateTime<Utc>>,
}

impl MessageUpdate {
    /// True when the update writes nothing.
    pub fn is_empty(&self) -> bool {
        self.request_status.is_none()
            && self.status_changed_at.is_none()
            && self.read.is_none()
            && self.read_at.is_none()
    }
}
