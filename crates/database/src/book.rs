//! Book listing operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Book;

/// List a book for an owner and return the stored record.
///
/// The owner must already be a registered user.
pub async fn create_book(pool: &SqlitePool, title: &str, owner_id: &str) -> Result<Book> {
    let book = sqlx::query_as::<_, Book>(
        r#"
        INSERT INTO books (title, owner_id)
        VALUES (?, ?)
        RETURNING id, title, owner_id, created_at
        "#,
    )
    .bind(title)
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_foreign_key_violation() {
                return DatabaseError::NotFound {
                    entity: "User",
                    id: owner_id.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(book)
}

/// Get a book by ID, or `None` if it is not listed.
pub async fn find_book(pool: &SqlitePool, id: i64) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(
        r#"
        SELECT id, title, owner_id, created_at
        FROM books
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(book)
}

/// Get a book by ID.
pub async fn get_book(pool: &SqlitePool, id: i64) -> Result<Book> {
    find_book(pool, id).await?.ok_or_else(|| DatabaseError::NotFound {
        entity: "Book",
        id: id.to_string(),
    })
}

/// List the books owned by a user, oldest listing first.
pub async fn list_books_by_owner(pool: &SqlitePool, owner_id: &str) -> Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>(
        r#"
        SELECT id, title, owner_id, created_at
        FROM books
        WHERE owner_id = ?
        ORDER BY id
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(books)
}
