//! Database models.
//!
//! Enumerated columns (`message_type`, `request_status`) and timestamps are
//! stored as text; callers own their interpretation.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Identity issued by the authentication provider
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A book listed on the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Title as listed by the owner.
    pub title: String,
    /// Owning user ID.
    pub owner_id: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A message between two users about a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// UUID assigned at creation.
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub book_id: i64,
    pub text: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
    /// e.g. "general", "purchase_request", "swap_offer"
    pub message_type: String,
    /// Set only for purchase requests and swap offers.
    pub request_status: Option<String>,
    pub status_changed_at: Option<String>,
    pub read: bool,
    pub read_at: Option<String>,
}

/// The mutable columns of a message. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageState {
    pub request_status: Option<String>,
    pub status_changed_at: Option<String>,
    pub read: Option<bool>,
    pub read_at: Option<String>,
}
