//! The write path every message creation and update goes through.

use crate::catalog::Catalog;
use crate::clock::{Clock, SystemClock};
use crate::defaults::apply_defaults;
use crate::error::ExchangeError;
use crate::transition::guard_update;
use crate::types::{Message, MessageChanges, MessageUpdate, NewMessage, PreparedMessage};
use crate::validator::validate_request;

/// Prepares message writes before they are persisted.
///
/// Holds the catalog used to resolve book owners and the clock used to stamp
/// timestamps. Nothing is written here; callers persist the returned value
/// only when preparation succeeds.
#[derive(Debug, Clone)]
pub struct MessagePipeline<C, K = SystemClock> {
    catalog: C,
    clock: K,
}

impl<C: Catalog> MessagePipeline<C, SystemClock> {
    /// Create a pipeline using wall-clock time.
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            clock: SystemClock,
        }
    }
}

impl<C: Catalog, K: Clock> MessagePipeline<C, K> {
    /// Create a pipeline with an explicit clock.
    pub fn with_clock(catalog: C, clock: K) -> Self {
        Self { catalog, clock }
    }

    /// The catalog this pipeline validates against.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Default the optional fields, then validate request-type messages.
    pub async fn prepare_create(&self, message: NewMessage) -> Result<PreparedMessage, ExchangeError> {
        let defaulted = apply_defaults(message, self.clock.now());
        validate_request(&self.catalog, defaulted).await
    }

    /// Check proposed changes against the persisted message.
    pub fn prepare_update(
        &self,
        current: &Message,
        changes: MessageChanges,
    ) -> Result<MessageUpdate, ExchangeError> {
        guard_update(current, changes, self.clock.now())
    }
}
