//! Field defaulting for new messages.

use chrono::{DateTime, Utc};

use crate::types::{NewMessage, PreparedMessage};

/// Fill in the optional fields of a proposed message.
///
/// A missing timestamp becomes `now`, a missing type becomes `general`.
/// Fields the caller already set are kept as given. The request status is
/// left unset here; the request validator assigns it.
pub fn apply_defaults(message: NewMessage, now: DateTime<Utc>) -> PreparedMessage {
    PreparedMessage {
        sender_id: message.sender_id,
        receiver_id: message.receiver_id,
        book_id: message.book_id,
        text: message.text,
        timestamp: message.timestamp.unwrap_or(now),
        message_type: message.message_type.unwrap_or_default(),
        request_status: None,
    }
}
