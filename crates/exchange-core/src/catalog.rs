//! Catalog collaborator: resolves books and their owners.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::types::{Book, BookId};

/// Failures raised by a catalog backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backend could not be reached.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// The backend returned an error; the original is kept as the source.
    #[error("catalog backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CatalogError {
    /// Wrap a backend error without reinterpreting it.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        CatalogError::Backend(Box::new(err))
    }
}

/// Read-only access to book records.
///
/// A missing book is `Ok(None)`; `Err` is reserved for lookup failures.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up a book by id.
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>, CatalogError>;
}

#[async_trait]
impl<T: Catalog + ?Sized> Catalog for Arc<T> {
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>, CatalogError> {
        (**self).get_book(book_id).await
    }
}

/// In-memory catalog for tests and local tooling.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    books: RwLock<HashMap<BookId, Book>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with books.
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        Self {
            books: RwLock::new(books.into_iter().map(|b| (b.id, b)).collect()),
        }
    }

    /// Add or replace a book.
    pub async fn insert(&self, book: Book) {
        self.books.write().await.insert(book.id, book);
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>, CatalogError> {
        Ok(self.books.read().await.get(&book_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;

    fn book(id: i64, owner: &str) -> Book {
        Book {
            id: BookId(id),
            title: "Calculus".to_string(),
            owner_id: UserId::from(owner),
        }
    }

    #[tokio::test]
    async fn test_memory_catalog_lookup() {
        let catalog = MemoryCatalog::with_books([book(10, "U1")]);

        let found = catalog.get_book(BookId(10)).await.unwrap();
        assert_eq!(found.unwrap().owner_id, UserId::from("U1"));
        assert!(catalog.get_book(BookId(11)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_catalog_insert_replaces() {
        let catalog = MemoryCatalog::new();
        catalog.insert(book(3, "U9")).await;
        catalog.insert(book(3, "U4")).await;

        let found = catalog.get_book(BookId(3)).await.unwrap();
        assert_eq!(found, Some(book(3, "U4")));
    }

    #[tokio::test]
    async fn test_arc_catalog_delegates() {
        let catalog: Arc<dyn Catalog> = Arc::new(MemoryCatalog::with_books([book(1, "U1")]));
        assert!(catalog.get_book(BookId(1)).await.unwrap().is_some());
    }
}
