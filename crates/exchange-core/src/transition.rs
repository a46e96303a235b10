//! Request status transition table and update guard.

use chrono::{DateTime, Utc};

use crate::error::ExchangeError;
use crate::types::{Message, MessageChanges, MessageUpdate, RequestStatus};

impl RequestStatus {
    /// Statuses reachable in one step from `self`.
    pub fn allowed_targets(self) -> &'static [RequestStatus] {
        match self {
            RequestStatus::Pending => &[
                RequestStatus::Accepted,
                RequestStatus::Declined,
                RequestStatus::Cancelled,
            ],
            RequestStatus::Accepted => &[RequestStatus::Completed, RequestStatus::Cancelled],
            RequestStatus::Declined => &[RequestStatus::Cancelled],
            RequestStatus::Completed | RequestStatus::Cancelled => &[],
        }
    }

    /// Returns true if moving from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        self.allowed_targets().contains(&next)
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }
}

/// Check proposed changes against the current message and produce the writes
/// to apply.
///
/// A status change on a message outside the request machine (or one that
/// carries no current status) is dropped. A status change that the table does
/// not allow rejects the whole update. Marking an unread message read stamps
/// `read_at`, independent of the status handling.
///
/// Timestamps never move backwards: `status_changed_at` is at least the
/// previous value and `read_at` is at least the message timestamp.
pub fn guard_update(
    current: &Message,
    changes: MessageChanges,
    now: DateTime<Utc>,
) -> Result<MessageUpdate, ExchangeError> {
    let mut update = MessageUpdate::default();

    if let Some(to) = changes.request_status {
        if let (true, Some(from)) = (current.is_request(), current.request_status) {
            if !from.can_transition_to(to) {
                return Err(ExchangeError::InvalidTransition { from, to });
            }
            let changed_at = match current.status_changed_at {
                Some(previous) => now.max(previous),
                None => now,
            };
            update.request_status = Some(to);
            update.status_changed_at = Some(changed_at);
        }
    }

    if let Some(read) = changes.read {
        if read != current.read {
            update.read = Some(read);
        }
        if read && !current.read {
            update.read_at = Some(now.max(current.timestamp));
        }
    }

    Ok(update)
}
