//! Message write path for the campus book exchange.
//!
//! This crate wires the [`exchange_core`] pipeline to the SQLite
//! [`database`]: a message is only stored after `prepare_create` accepts it,
//! and a status or read change is only written after `prepare_update` accepts
//! it, using a conditional update so concurrent transitions cannot both land.
//!
//! # Example
//!
//! ```rust,no_run
//! use exchange_service::{ExchangeConfig, MessageService};
//! use exchange_core::{MessageType, NewMessage, RequestStatus, UserId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExchangeConfig::from_env()?;
//!     let service = MessageService::new(config.connect().await?);
//!
//!     let alice = UserId::from("U1");
//!     let bob = UserId::from("U2");
//!     service.register_user(&alice, "Alice").await?;
//!     service.register_user(&bob, "Bob").await?;
//!     let book = service.list_book(&alice, "Organic Chemistry").await?;
//!
//!     let request = NewMessage::new(bob, alice, book.id, "$30?")
//!         .with_type(MessageType::PurchaseRequest);
//!     let sent = service.send_message(request).await?;
//!     service.set_status(&sent.id, RequestStatus::Accepted).await?;
//!     Ok(())
//! }
//! ```

mod catalog;
mod config;
mod convert;
mod error;
mod service;

pub use catalog::SqliteCatalog;
pub use config::{ConfigError, ExchangeConfig, DEFAULT_DATABASE_URL};
pub use error::{Result, ServiceError};
pub use service::MessageService;
