//! Collected metrics snapshot and rate calculations
//!
//! This module contains the unified metrics snapshot that holds all
//! component metrics at a point in time, plus rate calculation utilities
//! for computing per-second rates between two collections.

use std::time::{Duration, Instant};

use crate::{
    ProcessorMetricsSnapshot, QueueMetricsSnapshot, SubscriberMetricsSnapshot, TaskMetricsSnapshot,
};

/// Collected queue snapshot with metadata
#[derive(Debug, Clone)]
pub struct CollectedQueue {
    /// Queue name
    pub name: String,
    /// Metrics snapshot
    pub snapshot: QueueMetricsSnapshot,
}

/// Collected subscriber snapshot with metadata
#[derive(Debug, Clone)]
pub struct CollectedSubscriber {
    /// Subscriber name
    pub name: String,
    /// Topic consumed
    pub topic: String,
    /// Broker family label
    pub messaging_type: String,
    /// Metrics snapshot
    pub snapshot: SubscriberMetricsSnapshot,
}

/// Collected task snapshot with metadata
#[derive(Debug, Clone)]
pub struct CollectedTask {
    /// Task name
    pub name: String,
    /// Metrics snapshot
    pub snapshot: TaskMetricsSnapshot,
}

/// Collected processor snapshot with metadata
#[derive(Debug, Clone)]
pub struct CollectedProcessor {
    /// Processor name
    pub name: String,
    /// Topic consumed
    pub topic: String,
    /// Metrics snapshot
    pub snapshot: ProcessorMetricsSnapshot,
}

/// Complete metrics collection at a point in time
#[derive(Debug, Clone, Default)]
pub struct CollectedMetrics {
    /// When this collection was taken
    pub timestamp: Option<Instant>,

    /// All queue metrics
    pub queues: Vec<CollectedQueue>,

    /// All subscriber metrics
    pub subscribers: Vec<CollectedSubscriber>,

    /// All task metrics
    pub tasks: Vec<CollectedTask>,

    /// All processor metrics
    pub processors: Vec<CollectedProcessor>,
}

impl CollectedMetrics {
    /// Create a new empty collection stamped with the current time
    pub fn new() -> Self {
        Self {
            timestamp: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Calculate rates by comparing with a previous snapshot
    ///
    /// Returns None if either collection is missing a timestamp or no time
    /// has elapsed between them.
    pub fn rates(&self, previous: &CollectedMetrics) -> Option<MetricsRates> {
        let current_ts = self.timestamp?;
        let previous_ts = previous.timestamp?;

        let elapsed = current_ts.duration_since(previous_ts);
        if elapsed.is_zero() {
            return None;
        }

        let elapsed_secs = elapsed.as_secs_f64();

        // Queue rates (match by name)
        let queue_rates: Vec<_> = self
            .queues
            .iter()
            .filter_map(|current| {
                let prev = previous.queues.iter().find(|q| q.name == current.name)?;
                Some(QueueRates {
                    name: current.name.clone(),
                    enqueued_per_sec: rate(
                        current.snapshot.enqueued,
                        prev.snapshot.enqueued,
                        elapsed_secs,
                    ),
                    dequeued_per_sec: rate(
                        current.snapshot.dequeued,
                        prev.snapshot.dequeued,
                        elapsed_secs,
                    ),
                    depth: current.snapshot.depth(),
                    enqueue_failures: current
                        .snapshot
                        .enqueue_failures
                        .saturating_sub(prev.snapshot.enqueue_failures),
                })
            })
            .collect();

        // Subscriber rates (match by name)
        let subscriber_rates: Vec<_> = self
            .subscribers
            .iter()
            .filter_map(|current| {
                let prev = previous
                    .subscribers
                    .iter()
                    .find(|s| s.name == current.name)?;
                let pulls_delta = current.snapshot.pulls.saturating_sub(prev.snapshot.pulls);
                let pull_time_delta = current
                    .snapshot
                    .pull_time_ns
                    .saturating_sub(prev.snapshot.pull_time_ns);

                Some(SubscriberRates {
                    name: current.name.clone(),
                    topic: current.topic.clone(),
                    messaging_type: current.messaging_type.clone(),
                    messages_per_sec: rate(
                        current.snapshot.messages_pulled,
                        prev.snapshot.messages_pulled,
                        elapsed_secs,
                    ),
                    batches_per_sec: rate(
                        current.snapshot.batches_sent,
                        prev.snapshot.batches_sent,
                        elapsed_secs,
                    ),
                    avg_pull_time: if pulls_delta > 0 {
                        Duration::from_nanos(pull_time_delta / pulls_delta)
                    } else {
                        Duration::ZERO
                    },
                    pull_failures: current
                        .snapshot
                        .pull_failures
                        .saturating_sub(prev.snapshot.pull_failures),
                })
            })
            .collect();

        // Task rates (match by name)
        let task_rates: Vec<_> = self
            .tasks
            .iter()
            .filter_map(|current| {
                let prev = previous.tasks.iter().find(|t| t.name == current.name)?;
                let completed_delta = current
                    .snapshot
                    .completed()
                    .saturating_sub(prev.snapshot.completed());
                let time_delta = current
                    .snapshot
                    .execution_time_ns
                    .saturating_sub(prev.snapshot.execution_time_ns);

                Some(TaskRates {
                    name: current.name.clone(),
                    completed_per_sec: rate(
                        current.snapshot.completed(),
                        prev.snapshot.completed(),
                        elapsed_secs,
                    ),
                    avg_execution_time: if completed_delta > 0 {
                        Duration::from_nanos(time_delta / completed_delta)
                    } else {
                        Duration::ZERO
                    },
                    failures: current
                        .snapshot
                        .failures
                        .saturating_sub(prev.snapshot.failures),
                    rejections: current
                        .snapshot
                        .rejections
                        .saturating_sub(prev.snapshot.rejections),
                    retries: current
                        .snapshot
                        .retries
                        .saturating_sub(prev.snapshot.retries),
                })
            })
            .collect();

        // Processor rates (match by name)
        let processor_rates: Vec<_> = self
            .processors
            .iter()
            .filter_map(|current| {
                let prev = previous
                    .processors
                    .iter()
                    .find(|p| p.name == current.name)?;
                Some(ProcessorRates {
                    name: current.name.clone(),
                    topic: current.topic.clone(),
                    processed_per_sec: rate(
                        current.snapshot.processed,
                        prev.snapshot.processed,
                        elapsed_secs,
                    ),
                    acked_per_sec: rate(current.snapshot.acked, prev.snapshot.acked, elapsed_secs),
                    failures: current
                        .snapshot
                        .process_failures
                        .saturating_sub(prev.snapshot.process_failures),
                    ack_failures: current
                        .snapshot
                        .ack_failures
                        .saturating_sub(prev.snapshot.ack_failures),
                })
            })
            .collect();

        Some(MetricsRates {
            elapsed,
            queues: queue_rates,
            subscribers: subscriber_rates,
            tasks: task_rates,
            processors: processor_rates,
        })
    }
}

/// Calculate rate per second
#[inline]
fn rate(current: u64, previous: u64, elapsed_secs: f64) -> f64 {
    let delta = current.saturating_sub(previous);
    delta as f64 / elapsed_secs
}

/// Calculated rates between two snapshots
#[derive(Debug, Clone)]
pub struct MetricsRates {
    /// Time elapsed between snapshots
    pub elapsed: Duration,

    /// Per-queue rates
    pub queues: Vec<QueueRates>,

    /// Per-subscriber rates
    pub subscribers: Vec<SubscriberRates>,

    /// Per-task rates
    pub tasks: Vec<TaskRates>,

    /// Per-processor rates
    pub processors: Vec<ProcessorRates>,
}

/// Queue rates
#[derive(Debug, Clone)]
pub struct QueueRates {
    /// Queue name
    pub name: String,
    /// Items admitted per second
    pub enqueued_per_sec: f64,
    /// Items consumed per second
    pub dequeued_per_sec: f64,
    /// Current buffered depth
    pub depth: u64,
    /// Enqueue failures in this interval
    pub enqueue_failures: u64,
}

/// Subscriber rates
#[derive(Debug, Clone)]
pub struct SubscriberRates {
    /// Subscriber name
    pub name: String,
    /// Topic consumed
    pub topic: String,
    /// Broker family label
    pub messaging_type: String,
    /// Messages pulled per second
    pub messages_per_sec: f64,
    /// Batches emitted per second
    pub batches_per_sec: f64,
    /// Average pull duration in this interval
    pub avg_pull_time: Duration,
    /// Pull failures in this interval
    pub pull_failures: u64,
}

/// Task rates
#[derive(Debug, Clone)]
pub struct TaskRates {
    /// Task name
    pub name: String,
    /// Completed executions per second
    pub completed_per_sec: f64,
    /// Average handler time in this interval
    pub avg_execution_time: Duration,
    /// Failures in this interval
    pub failures: u64,
    /// Breaker rejections in this interval
    pub rejections: u64,
    /// Retries in this interval
    pub retries: u64,
}

/// Processor rates
#[derive(Debug, Clone)]
pub struct ProcessorRates {
    /// Processor name
    pub name: String,
    /// Topic consumed
    pub topic: String,
    /// Messages processed per second
    pub processed_per_sec: f64,
    /// Messages acknowledged per second
    pub acked_per_sec: f64,
    /// Processing failures in this interval
    pub failures: u64,
    /// Acknowledgement failures in this interval
    pub ack_failures: u64,
}
