//! User CRUD operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::User;

/// Register a user and return the stored record.
pub async fn create_user(pool: &SqlitePool, id: &str, display_name: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, display_name)
        VALUES (?, ?)
        RETURNING id, display_name, created_at
        "#,
    )
    .bind(id)
    .bind(display_name)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: id.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, display_name, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}
