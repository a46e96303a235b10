//! SQLite persistence layer for the campus book exchange.
//!
//! This crate provides async database operations for users, book listings and
//! the messages exchanged about them, using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{book, user, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:exchange.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register a student and list a book
//!     user::create_user(db.pool(), "U1", "Alice").await?;
//!     let listing = book::create_book(db.pool(), "Calculus: Early Transcendentals", "U1").await?;
//!     println!("listed book {}", listing.id);
//!
//!     Ok(())
//! }
//! ```

pub mod book;
pub mod error;
pub mod message;
pub mod models;
pub mod user;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{Book, Message, MessageState, User};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// let db = database::Database::connect("sqlite:data/exchange.db?mode=rwc").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// An in-memory database (`sqlite::memory:`) is private to each
    /// connection, so use a pool size of 1 for it.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Connect to a fresh, migrated in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let db = Self::connect_with_pool_size("sqlite::memory:", 1).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::in_memory().await.unwrap()
    }

    fn general(id: &str, sender: &str, receiver: &str, book_id: i64, timestamp: &str) -> Message {
        Message {
            id: id.to_string(),
            sender_id: sender.to_string(),
            receiver_id: receiver.to_string(),
            book_id,
            text: "Is this still available?".to_string(),
            timestamp: timestamp.to_string(),
            message_type: "general".to_string(),
            request_status: None,
            status_changed_at: None,
            read: false,
            read_at: None,
        }
    }

    fn purchase(id: &str, timestamp: &str) -> Message {
        Message {
            message_type: "purchase_request".to_string(),
            request_status: Some("pending".to_string()),
            ..general(id, "U2", "U1", 1, timestamp)
        }
    }

    #[tokio::test]
    async fn test_user_crud() {
        let db = test_db().await;

        // Create
        let created = user::create_user(db.pool(), "U1", "Alice").await.unwrap();
        assert_eq!(created.display_name, "Alice");
        assert!(!created.created_at.is_empty());

        // Duplicate
        let dup = user::create_user(db.pool(), "U1", "Alice again").await;
        assert!(matches!(dup, Err(DatabaseError::AlreadyExists { .. })));

        // Get
        let fetched = user::get_user(db.pool(), "U1").await.unwrap();
        assert_eq!(fetched, created);

        // Missing
        let result = user::get_user(db.pool(), "nobody").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_book_crud() {
        let db = test_db().await;
        user::create_user(db.pool(), "U1", "Alice").await.unwrap();

        let first = book::create_book(db.pool(), "Physics I", "U1").await.unwrap();
        let second = book::create_book(db.pool(), "Physics II", "U1").await.unwrap();
        assert!(second.id > first.id);

        let fetched = book::get_book(db.pool(), first.id).await.unwrap();
        assert_eq!(fetched.owner_id, "U1");

        let owned = book::list_books_by_owner(db.pool(), "U1").await.unwrap();
        let titles: Vec<_> = owned.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Physics I", "Physics II"]);

        assert!(book::find_book(db.pool(), second.id + 1).await.unwrap().is_none());
        assert!(matches!(
            book::get_book(db.pool(), second.id + 1).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_book_requires_registered_owner() {
        let db = test_db().await;
        let result = book::create_book(db.pool(), "Orphan", "ghost").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { entity: "User", .. })));
    }

    #[tokio::test]
    async fn test_message_create_and_get() {
        let db = test_db().await;
        let msg = purchase("m1", "2024-09-01T10:00:00.000000Z");
        message::create_message(db.pool(), &msg).await.unwrap();

        let fetched = message::get_message(db.pool(), "m1").await.unwrap();
        assert_eq!(fetched, msg);

        let dup = message::create_message(db.pool(), &msg).await;
        assert!(matches!(dup, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_update_state_applies_when_unchanged() {
        let db = test_db().await;
        message::create_message(db.pool(), &purchase("m1", "2024-09-01T10:00:00.000000Z"))
            .await
            .unwrap();

        let state = MessageState {
            request_status: Some("accepted".to_string()),
            status_changed_at: Some("2024-09-01T11:00:00.000000Z".to_string()),
            ..MessageState::default()
        };
        message::update_message_state(db.pool(), "m1", Some("pending"), false, &state)
            .await
            .unwrap();

        let fetched = message::get_message(db.pool(), "m1").await.unwrap();
        assert_eq!(fetched.request_status.as_deref(), Some("accepted"));
        assert_eq!(
            fetched.status_changed_at.as_deref(),
            Some("2024-09-01T11:00:00.000000Z")
        );
        assert!(!fetched.read);
    }

    #[tokio::test]
    async fn test_update_state_conflicts_on_stale_read() {
        let db = test_db().await;
        message::create_message(db.pool(), &purchase("m1", "2024-09-01T10:00:00.000000Z"))
            .await
            .unwrap();

        let accept = MessageState {
            request_status: Some("accepted".to_string()),
            ..MessageState::default()
        };
        let decline = MessageState {
            request_status: Some("declined".to_string()),
            ..MessageState::default()
        };

        // Both writers read "pending"; only the first wins.
        message::update_message_state(db.pool(), "m1", Some("pending"), false, &accept)
            .await
            .unwrap();
        let result =
            message::update_message_state(db.pool(), "m1", Some("pending"), false, &decline).await;
        assert!(matches!(result, Err(DatabaseError::Conflict { .. })));

        let fetched = message::get_message(db.pool(), "m1").await.unwrap();
        assert_eq!(fetched.request_status.as_deref(), Some("accepted"));
    }

    #[tokio::test]
    async fn test_update_state_on_general_message() {
        let db = test_db().await;
        message::create_message(db.pool(), &general("g1", "U2", "U1", 1, "2024-09-01T10:00:00.000000Z"))
            .await
            .unwrap();

        let state = MessageState {
            read: Some(true),
            read_at: Some("2024-09-01T10:05:00.000000Z".to_string()),
            ..MessageState::default()
        };
        message::update_message_state(db.pool(), "g1", None, false, &state)
            .await
            .unwrap();

        let fetched = message::get_message(db.pool(), "g1").await.unwrap();
        assert!(fetched.read);
        assert!(fetched.request_status.is_none());

        let missing = message::update_message_state(db.pool(), "nope", None, false, &state).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_inbox_and_unread() {
        let db = test_db().await;
        for (id, ts) in [
            ("a", "2024-09-01T09:00:00.000000Z"),
            ("b", "2024-09-01T11:00:00.000000Z"),
            ("c", "2024-09-01T10:00:00.000000Z"),
        ] {
            message::create_message(db.pool(), &general(id, "U2", "U1", 1, ts))
                .await
                .unwrap();
        }
        message::create_message(db.pool(), &general("d", "U1", "U2", 1, "2024-09-01T12:00:00.000000Z"))
            .await
            .unwrap();

        let inbox = message::list_inbox(db.pool(), "U1", 10).await.unwrap();
        let ids: Vec<_> = inbox.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let limited = message::list_inbox(db.pool(), "U1", 1).await.unwrap();
        assert_eq!(limited.len(), 1);

        assert_eq!(message::count_unread(db.pool(), "U1").await.unwrap(), 3);
        assert_eq!(message::count_unread(db.pool(), "U2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_conversation_and_requests() {
        let db = test_db().await;
        message::create_message(db.pool(), &purchase("p1", "2024-09-01T09:00:00.000000Z"))
            .await
            .unwrap();
        message::create_message(db.pool(), &general("r1", "U1", "U2", 1, "2024-09-01T09:30:00.000000Z"))
            .await
            .unwrap();
        // Different book, same pair.
        message::create_message(db.pool(), &general("x1", "U1", "U2", 2, "2024-09-01T09:45:00.000000Z"))
            .await
            .unwrap();
        // Same book, different pair.
        message::create_message(db.pool(), &general("y1", "U3", "U1", 1, "2024-09-01T10:00:00.000000Z"))
            .await
            .unwrap();

        let convo = message::list_conversation(db.pool(), "U2", "U1", 1).await.unwrap();
        let ids: Vec<_> = convo.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "r1"]);

        let pending = message::list_requests_for_book(db.pool(), 1, "pending")
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "p1");
    }
}
