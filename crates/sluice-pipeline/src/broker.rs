//! Broker collaborator traits
//!
//! The pipeline owns no broker bindings. A deployment implements these
//! traits over the SDK of its choice and hands them to the builder; the
//! envelope's ack token stays opaque to everything in this crate.

use async_trait::async_trait;

use sluice_message::Envelope;

use crate::error::BoxError;

/// Pulls batches of messages from a broker subscription.
///
/// Pulls are assumed to block until the broker responds (long polling
/// included); the subscriber loop adds no polling delay of its own.
#[async_trait]
pub trait Puller: Send + Sync {
    /// Pull whatever is currently available.
    ///
    /// An empty `Vec` is a normal outcome, not an error.
    async fn pull(&self) -> std::result::Result<Vec<Envelope>, BoxError>;
}

/// Acknowledges a single message back to the broker.
#[async_trait]
pub trait Acknowledger: Send + Sync {
    /// Returns `true` iff the broker confirmed the acknowledgement.
    ///
    /// `Ok(false)` means the broker declined; the message stays subject
    /// to redelivery.
    async fn ack(&self, envelope: &Envelope) -> std::result::Result<bool, BoxError>;
}

/// Acknowledges a whole batch, possibly partially.
#[async_trait]
pub trait BatchAcknowledger: Send + Sync {
    /// Returns how many envelopes the broker confirmed.
    ///
    /// The count may be less than `envelopes.len()`; callers must treat
    /// the unconfirmed remainder as still owned by the broker.
    async fn ack_batch(&self, envelopes: &[Envelope]) -> std::result::Result<usize, BoxError>;
}
