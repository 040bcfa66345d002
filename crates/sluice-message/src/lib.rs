//! Core message types for the Sluice consumer pipeline
//!
//! This crate provides the foundational types that flow through the pipeline:
//! - `Envelope` - A single broker message with payload, attributes and ack token
//! - `MessageBatch` - An ordered group of envelopes pulled in one broker call
//! - `BrokerKind` - The messaging system a pipeline consumes from
//! - `MessageId` / `AckToken` - Opaque identifiers handed out by the broker
//!
//! # Design Principles
//!
//! - **Broker-agnostic**: Nothing here knows how Kafka, Pub/Sub or SQS encode
//!   their receipts; those live behind opaque newtypes.
//! - **Cheap to clone**: Envelopes are cloned when a handler needs ownership
//!   while the acknowledgement path keeps the original.

mod batch;
mod broker;
mod envelope;

pub use batch::MessageBatch;
pub use broker::BrokerKind;
pub use envelope::{AckToken, Envelope, MessageId};

#[cfg(test)]
mod envelope_test;
