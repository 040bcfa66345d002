//! Consumer pipeline for the Sluice runtime
//!
//! This crate assembles the stages between a broker and business logic:
//! - `Subscriber` - Pull loop emitting batches in pull order
//! - `MessageQueue` - Bounded buffer with backpressure and drain-on-stop
//! - `ProtectedTask` - Handler wrapped in pre/post hooks, pooled
//!   dispatch, circuit breaking and retries
//! - `Processor` / `BatchProcessor` - Execute then acknowledge, one
//!   message or one batch at a time
//! - `Puller` / `Acknowledger` / `BatchAcknowledger` - The broker seam
//!
//! # Design Principles
//!
//! - **Absorb, never throw**: runtime failures become typed results,
//!   log lines and counters; only construction mistakes are fatal.
//! - **Backpressure over buffering**: every stage blocks on a full
//!   downstream instead of growing a buffer.
//! - **Broker owns the message**: nothing here is durable; a message
//!   not acknowledged is the broker's to redeliver.

mod batch;
mod broker;
mod error;
mod processor;
mod queue;
mod subscriber;
mod task;

pub use batch::BatchProcessor;
pub use broker::{Acknowledger, BatchAcknowledger, Puller};
pub use error::{BoxError, PipelineError, QueueClosed, Result, TaskError, TaskResult};
pub use processor::{BatchStream, Processor, ProcessorMetricsHandle};
pub use queue::{MessageQueue, QueueConsumer, QueueMetricsHandle};
pub use subscriber::{Subscriber, SubscriberMetricsHandle};
pub use task::{
    Handler, PostHook, PreHook, ProtectedTask, ProtectedTaskBuilder, TaskMetricsHandle,
};

// Test modules - only compiled during testing
#[cfg(test)]
mod processor_test;
