//! Message service: runs every write through the pipeline, then persists it.

use chrono::{Datelike, SubsecRound};
use database::validation::{
    validate_display_name, validate_message_text, validate_timestamp_year, validate_title,
};
use database::{book, message, user, Database};
use exchange_core::{
    Book, BookId, Clock, ExchangeError, Message, MessageChanges, MessageId, MessagePipeline,
    NewMessage, RequestStatus, SystemClock, UserId,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::catalog::SqliteCatalog;
use crate::convert::{book_from_row, message_from_row, row_from_prepared, state_from_update};
use crate::error::{Result, ServiceError};

/// The write path for users, book listings and messages.
///
/// Message creation and updates pass through [`MessagePipeline`] first; a
/// rejected write never reaches the database.
#[derive(Debug, Clone)]
pub struct MessageService<K = SystemClock> {
    db: Database,
    pipeline: MessagePipeline<SqliteCatalog, K>,
}

impl MessageService<SystemClock> {
    /// Create a service using wall-clock time.
    pub fn new(db: Database) -> Self {
        let pipeline = MessagePipeline::new(SqliteCatalog::new(db.clone()));
        Self { db, pipeline }
    }
}

impl<K: Clock> MessageService<K> {
    /// Create a service with an explicit clock.
    pub fn with_clock(db: Database, clock: K) -> Self {
        let pipeline = MessagePipeline::with_clock(SqliteCatalog::new(db.clone()), clock);
        Self { db, pipeline }
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Register a user identity issued by the authentication provider.
    pub async fn register_user(&self, id: &UserId, display_name: &str) -> Result<database::User> {
        validate_display_name(display_name)?;
        let created = user::create_user(self.db.pool(), id.as_str(), display_name.trim()).await?;
        info!(user_id = %id, "Registered user");
        Ok(created)
    }

    /// Get a registered user.
    pub async fn get_user(&self, id: &UserId) -> Result<database::User> {
        Ok(user::get_user(self.db.pool(), id.as_str()).await?)
    }

    /// List a book for sale or swap.
    pub async fn list_book(&self, owner: &UserId, title: &str) -> Result<Book> {
        validate_title(title)?;
        let row = book::create_book(self.db.pool(), title.trim(), owner.as_str()).await?;
        info!(book_id = row.id, owner_id = %owner, "Listed book");
        Ok(book_from_row(row))
    }

    /// Get a listed book.
    pub async fn get_book(&self, id: BookId) -> Result<Book> {
        let row = book::get_book(self.db.pool(), id.0).await?;
        Ok(book_from_row(row))
    }

    /// Books listed by an owner, oldest listing first.
    pub async fn books_by_owner(&self, owner: &UserId) -> Result<Vec<Book>> {
        let rows = book::list_books_by_owner(self.db.pool(), owner.as_str()).await?;
        Ok(rows.into_iter().map(book_from_row).collect())
    }

    /// Create a message.
    ///
    /// Missing fields are defaulted, purchase requests and swap offers are
    /// checked against the book's owner and start out pending.
    pub async fn send_message(&self, new_message: NewMessage) -> Result<Message> {
        validate_message_text(&new_message.text)?;

        let mut prepared = match self.pipeline.prepare_create(new_message).await {
            Ok(prepared) => prepared,
            Err(err) => {
                log_pipeline_error(None, &err);
                return Err(err.into());
            }
        };
        validate_timestamp_year("timestamp", prepared.timestamp.year())?;
        // Stored with microsecond precision.
        prepared.timestamp = prepared.timestamp.trunc_subsecs(6);

        let id = Uuid::new_v4().to_string();
        message::create_message(self.db.pool(), &row_from_prepared(&id, &prepared)).await?;

        info!(
            message_id = %id,
            message_type = %prepared.message_type,
            book_id = %prepared.book_id,
            "Message created"
        );
        Ok(prepared.into_message(MessageId(id)))
    }

    /// Get a message by ID.
    pub async fn get_message(&self, id: &MessageId) -> Result<Message> {
        let row = message::get_message(self.db.pool(), &id.0).await?;
        message_from_row(row)
    }

    /// Apply proposed changes to a message.
    ///
    /// The write is conditional on the status and read flag the guard saw, so
    /// a concurrent change in between yields [`ServiceError::Conflict`] instead
    /// of a transition from a stale state.
    pub async fn update_message(&self, id: &MessageId, changes: MessageChanges) -> Result<Message> {
        let current = self.get_message(id).await?;

        let update = match self.pipeline.prepare_update(&current, changes) {
            Ok(update) => update,
            Err(err) => {
                log_pipeline_error(Some(id), &err);
                return Err(err.into());
            }
        };

        if changes.request_status.is_some() && update.request_status.is_none() {
            debug!(
                message_id = %id,
                message_type = %current.message_type,
                "Ignoring status change on message without a request status"
            );
        }

        if update.is_empty() {
            return Ok(current);
        }

        message::update_message_state(
            self.db.pool(),
            &id.0,
            current.request_status.map(RequestStatus::as_str),
            current.read,
            &state_from_update(&update),
        )
        .await
        .inspect_err(|err| {
            if let database::DatabaseError::Conflict { .. } = err {
                warn!(message_id = %id, "Message changed concurrently, update not applied");
            }
        })?;

        if let (Some(from), Some(to)) = (current.request_status, update.request_status) {
            info!(message_id = %id, from = %from, to = %to, "Request status changed");
        }

        self.get_message(id).await
    }

    /// Change the status of a purchase request or swap offer.
    pub async fn set_status(&self, id: &MessageId, status: RequestStatus) -> Result<Message> {
        self.update_message(id, MessageChanges::status(status)).await
    }

    /// Mark a message as read.
    ///
    /// Marking read does not depend on the request status, so a conflicting
    /// concurrent write is resolved by re-reading once.
    pub async fn mark_read(&self, id: &MessageId) -> Result<Message> {
        match self.update_message(id, MessageChanges::mark_read()).await {
            Err(ServiceError::Conflict { .. }) => {
                let current = self.get_message(id).await?;
                if current.read {
                    return Ok(current);
                }
                self.update_message(id, MessageChanges::mark_read()).await
            }
            other => other,
        }
    }

    /// Messages received by a user, newest first.
    pub async fn inbox(&self, user_id: &UserId, limit: i64) -> Result<Vec<Message>> {
        message::list_inbox(self.db.pool(), user_id.as_str(), limit)
            .await?
            .into_iter()
            .map(message_from_row)
            .collect()
    }

    /// Messages two users exchanged about a book, oldest first.
    pub async fn conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
        book_id: BookId,
    ) -> Result<Vec<Message>> {
        message::list_conversation(self.db.pool(), user_a.as_str(), user_b.as_str(), book_id.0)
            .await?
            .into_iter()
            .map(message_from_row)
            .collect()
    }

    /// Requests about a book still awaiting the owner's answer.
    pub async fn pending_requests(&self, book_id: BookId) -> Result<Vec<Message>> {
        message::list_requests_for_book(self.db.pool(), book_id.0, RequestStatus::Pending.as_str())
            .await?
            .into_iter()
            .map(message_from_row)
            .collect()
    }

    /// Number of unread messages for a user.
    pub async fn unread_count(&self, user_id: &UserId) -> Result<i64> {
        Ok(message::count_unread(self.db.pool(), user_id.as_str()).await?)
    }
}

fn log_pipeline_error(message_id: Option<&MessageId>, err: &ExchangeError) {
    let message_id = message_id.map(|id| id.0.as_str()).unwrap_or("-");
    if err.is_rejection() {
        warn!(message_id, error = %err, "Rejected message write");
    } else {
        error!(message_id, error = %err, "Message write failed");
    }
}
