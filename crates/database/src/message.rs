//! Message storage.
//!
//! Messages are never deleted here. After creation only the columns in
//! [`MessageState`] change, and only through [`update_message_state`].

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Message, MessageState};

/// Column list shared by every message query.
const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, book_id, text, timestamp, \
     message_type, request_status, status_changed_at, read, read_at";

/// Insert a new message.
pub async fn create_message(pool: &SqlitePool, message: &Message) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO messages (
            id, sender_id, receiver_id, book_id, text, timestamp,
            message_type, request_status, status_changed_at, read, read_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&message.id)
    .bind(&message.sender_id)
    .bind(&message.receiver_id)
    .bind(message.book_id)
    .bind(&message.text)
    .bind(&message.timestamp)
    .bind(&message.message_type)
    .bind(&message.request_status)
    .bind(&message.status_changed_at)
    .bind(message.read)
    .bind(&message.read_at)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Message",
                    id: message.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a message by ID.
pub async fn get_message(pool: &SqlitePool, id: &str) -> Result<Message> {
    let query = format!("SELECT {} FROM messages WHERE id = ?", MESSAGE_COLUMNS);
    sqlx::query_as::<_, Message>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Message",
            id: id.to_string(),
        })
}

/// Apply new state to a message, but only if its request status is still
/// `expected_status` and its read flag is still `expected_read`.
///
/// This is the compare-and-swap that serializes concurrent transitions: when
/// two writers read the same prior state, only the first write lands and the
/// second gets [`DatabaseError::Conflict`].
pub async fn update_message_state(
    pool: &SqlitePool,
    id: &str,
    expected_status: Option<&str>,
    expected_read: bool,
    state: &MessageState,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE messages
        SET request_status = COALESCE(?, request_status),
            status_changed_at = COALESCE(?, status_changed_at),
            read = COALESCE(?, read),
            read_at = COALESCE(?, read_at)
        WHERE id = ? AND request_status IS ? AND read = ?
        "#,
    )
    .bind(&state.request_status)
    .bind(&state.status_changed_at)
    .bind(state.read)
    .bind(&state.read_at)
    .bind(id)
    .bind(expected_status)
    .bind(expected_read)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        if message_exists(pool, id).await? {
            return Err(DatabaseError::Conflict {
                entity: "Message",
                id: id.to_string(),
            });
        }
        return Err(DatabaseError::NotFound {
            entity: "Message",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Check whether a message exists.
pub async fn message_exists(pool: &SqlitePool, id: &str) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM messages WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// List messages received by a user, newest first.
pub async fn list_inbox(pool: &SqlitePool, receiver_id: &str, limit: i64) -> Result<Vec<Message>> {
    let query = format!(
        "SELECT {} FROM messages WHERE receiver_id = ? ORDER BY timestamp DESC, id LIMIT ?",
        MESSAGE_COLUMNS
    );
    let messages = sqlx::query_as::<_, Message>(&query)
        .bind(receiver_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(messages)
}

/// List the messages two users exchanged about a book, oldest first.
pub async fn list_conversation(
    pool: &SqlitePool,
    user_a: &str,
    user_b: &str,
    book_id: i64,
) -> Result<Vec<Message>> {
    let query = format!(
        "SELECT {} FROM messages \
         WHERE book_id = ? \
           AND ((sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)) \
         ORDER BY timestamp, id",
        MESSAGE_COLUMNS
    );
    let messages = sqlx::query_as::<_, Message>(&query)
        .bind(book_id)
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .fetch_all(pool)
        .await?;

    Ok(messages)
}

/// List request-type messages about a book that are still in `status`.
pub async fn list_requests_for_book(
    pool: &SqlitePool,
    book_id: i64,
    status: &str,
) -> Result<Vec<Message>> {
    let query = format!(
        "SELECT {} FROM messages WHERE book_id = ? AND request_status = ? ORDER BY timestamp, id",
        MESSAGE_COLUMNS
    );
    let messages = sqlx::query_as::<_, Message>(&query)
        .bind(book_id)
        .bind(status)
        .fetch_all(pool)
        .await?;

    Ok(messages)
}

/// Count unread messages for a receiver.
pub async fn count_unread(pool: &SqlitePool, receiver_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM messages
        WHERE receiver_id = ? AND read = 0
        "#,
    )
    .bind(receiver_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
