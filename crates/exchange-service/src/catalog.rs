//! Catalog backed by the book listings table.

use async_trait::async_trait;
use database::{book, Database};
use exchange_core::{Book, BookId, Catalog, CatalogError};

use crate::convert::book_from_row;

/// Resolves books from the SQLite listings.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    db: Database,
}

impl SqliteCatalog {
    /// Create a catalog over an open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>, CatalogError> {
        let row = book::find_book(self.db.pool(), book_id.0)
            .await
            .map_err(CatalogError::backend)?;
        Ok(row.map(book_from_row))
    }
}
