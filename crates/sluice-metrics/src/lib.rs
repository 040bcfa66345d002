//! Sluice - Metrics
//!
//! Internal metrics collection and reporting for observability.
//!
//! # Overview
//!
//! This crate provides:
//! - Atomic metric counters for queues, subscribers, protected tasks and
//!   processors
//! - Provider traits for components to expose metrics
//! - Unified reporter with configurable output formats (human, JSON)
//!
//! # Design Principles
//!
//! - **Lock-free**: All metrics use atomic operations
//! - **Low overhead**: No allocations during metric updates
//! - **Configurable**: Reporting intervals and formats from config
//! - **Trait-based**: Components implement provider traits for collection
//!
//! # Metrics Handle Pattern
//!
//! Components hold an `Arc<Metrics>` internally and expose a
//! `metrics_handle()` method returning a lightweight handle implementing
//! the matching provider trait. The handle stays valid after `run()`
//! consumes the component:
//!
//! ```text
//! Component (owns Arc<Metrics>)
//!     │
//!     ├──► metrics_handle() → Handle (clones Arc, implements Provider trait)
//!     │
//!     └──► run() [consumes self, Arc keeps metrics alive]
//! ```
//!
//! # Metric Categories
//!
//! - **Queues**: enqueue/dequeue counts, wait times, failures
//! - **Subscribers**: pulls, pulled messages, emitted batches
//! - **Tasks**: executions, retries, rejections, handler timing
//! - **Processors**: processed messages, acknowledgements

mod collected;
pub mod format;
mod reporter;
pub mod tags;
mod traits;

pub use collected::{
    CollectedMetrics, CollectedProcessor, CollectedQueue, CollectedSubscriber, CollectedTask,
    MetricsRates, ProcessorRates, QueueRates, SubscriberRates, TaskRates,
};
pub use format::{HumanFormatter, JsonFormatter, MetricsFormatter};
pub use reporter::{UnifiedReporter, UnifiedReporterBuilder};
pub use traits::{
    ProcessorMetrics, ProcessorMetricsProvider, ProcessorMetricsSnapshot, QueueMetrics,
    QueueMetricsProvider, QueueMetricsSnapshot, SubscriberMetrics, SubscriberMetricsProvider,
    SubscriberMetricsSnapshot, TaskMetrics, TaskMetricsProvider, TaskMetricsSnapshot,
};

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic atomic counter.
///
/// All operations use relaxed ordering; readers only ever see a slightly
/// stale total, which is fine for periodic reporting.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Create a counter starting at 0
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Add `val` to the counter
    #[inline]
    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    /// Add 1 to the counter
    #[inline]
    pub fn inc(&self) {
        self.add(1);
    }

    /// Current value
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod traits_test;
