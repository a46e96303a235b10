//! Message and offer state machine for the campus book exchange.
//!
//! Students message each other about listed books. Purchase requests and swap
//! offers carry a status that moves through a fixed lifecycle. This crate
//! provides:
//!
//! - [`MessagePipeline`] - `prepare_create` / `prepare_update`, the checks every
//!   message write must pass before it is persisted
//! - [`Catalog`] - The collaborator that resolves books and their owners
//! - [`Clock`] - The time source used for message and status timestamps
//! - [`ExchangeError`] - Why a write was rejected
//!
//! ```text
//! pending ─┬─► accepted ─┬─► completed
//!          │             └─► cancelled
//!          ├─► declined ───► cancelled
//!          └─► cancelled
//! ```
//!
//! # Example
//!
//! ```rust
//! use exchange_core::{Book, BookId, MemoryCatalog, MessagePipeline, MessageType, NewMessage, RequestStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), exchange_core::ExchangeError> {
//!     let catalog = MemoryCatalog::with_books([Book {
//!         id: BookId(10),
//!         title: "Intro to Algorithms".to_string(),
//!         owner_id: "U1".into(),
//!     }]);
//!     let pipeline = MessagePipeline::new(catalog);
//!
//!     let request = NewMessage::new("U2", "U1", BookId(10), "Would you sell it for $40?")
//!         .with_type(MessageType::PurchaseRequest);
//!     let prepared = pipeline.prepare_create(request).await?;
//!     assert_eq!(prepared.request_status, Some(RequestStatus::Pending));
//!     Ok(())
//! }
//! ```

mod catalog;
mod clock;
mod defaults;
mod error;
mod pipeline;
mod transition;
mod types;
mod validator;

pub use catalog::{Catalog, CatalogError, MemoryCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use defaults::apply_defaults;
pub use error::ExchangeError;
pub use pipeline::MessagePipeline;
pub use transition::guard_update;
pub use types::{
    Book, BookId, Message, MessageChanges, MessageId, MessageType, MessageUpdate, NewMessage,
    ParseEnumError, PreparedMessage, RequestStatus, UserId,
};
pub use validator::validate_request;

// Re-export async_trait for catalog implementors
pub use async_trait::async_trait;
