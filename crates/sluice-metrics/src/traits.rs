//! Metrics provider traits
//!
//! Traits for components to expose their metrics to the unified reporter.
//! Queues, subscribers, protected tasks and processors implement these so
//! the reporter can collect their metrics without knowing concrete types.
//!
//! # Design
//!
//! - Traits use `&self` for zero-copy metric access
//! - All providers are `Send + Sync` for thread-safe collection
//! - Metric structs use atomics internally, so no locks needed

use std::time::Duration;

use crate::Counter;

/// Metrics for a bounded queue
///
/// Tracks admissions, removals and the time spent blocked on either side.
/// All fields use atomics for lock-free updates.
#[derive(Debug, Default)]
pub struct QueueMetrics {
    /// Items accepted into the queue
    pub enqueued: Counter,
    /// Items rejected (queue stopped or receiver gone)
    pub enqueue_failures: Counter,
    /// Nanoseconds producers spent blocked on admission
    pub enqueue_wait_ns: Counter,
    /// Items handed to the consumer
    pub dequeued: Counter,
    /// Nanoseconds the consumer spent waiting for items
    pub dequeue_wait_ns: Counter,
}

impl QueueMetrics {
    /// Create new metrics with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: Counter::new(),
            enqueue_failures: Counter::new(),
            enqueue_wait_ns: Counter::new(),
            dequeued: Counter::new(),
            dequeue_wait_ns: Counter::new(),
        }
    }

    /// Record a successful enqueue and the time it blocked for
    #[inline]
    pub fn record_enqueue(&self, wait: Duration) {
        self.enqueued.inc();
        self.enqueue_wait_ns.add(wait.as_nanos() as u64);
    }

    /// Record a rejected enqueue
    #[inline]
    pub fn record_enqueue_failure(&self) {
        self.enqueue_failures.inc();
    }

    /// Record a successful dequeue and the time spent waiting
    #[inline]
    pub fn record_dequeue(&self, wait: Duration) {
        self.dequeued.inc();
        self.dequeue_wait_ns.add(wait.as_nanos() as u64);
    }

    /// Take a snapshot of current values
    #[inline]
    pub fn snapshot(&self) -> QueueMetricsSnapshot {
        QueueMetricsSnapshot {
            enqueued: self.enqueued.get(),
            enqueue_failures: self.enqueue_failures.get(),
            enqueue_wait_ns: self.enqueue_wait_ns.get(),
            dequeued: self.dequeued.get(),
            dequeue_wait_ns: self.dequeue_wait_ns.get(),
        }
    }
}

/// Point-in-time snapshot of queue metrics
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct QueueMetricsSnapshot {
    pub enqueued: u64,
    pub enqueue_failures: u64,
    pub enqueue_wait_ns: u64,
    pub dequeued: u64,
    pub dequeue_wait_ns: u64,
}

impl QueueMetricsSnapshot {
    /// Items currently buffered (admitted but not yet consumed)
    #[inline]
    pub fn depth(&self) -> u64 {
        self.enqueued.saturating_sub(self.dequeued)
    }

    /// Average time producers blocked per admitted item
    pub fn avg_enqueue_wait(&self) -> Duration {
        avg_ns(self.enqueue_wait_ns, self.enqueued)
    }

    /// Average time the consumer waited per item
    pub fn avg_dequeue_wait(&self) -> Duration {
        avg_ns(self.dequeue_wait_ns, self.dequeued)
    }
}

/// Trait for queues to provide metrics to the reporter
pub trait QueueMetricsProvider: Send + Sync {
    /// Unique name of this queue
    fn queue_name(&self) -> &str;

    /// Get a snapshot of current metrics
    fn snapshot(&self) -> QueueMetricsSnapshot;
}

/// Metrics for a subscriber
///
/// Subscribers track broker pulls and downstream emission.
/// All fields use atomics for lock-free updates.
#[derive(Debug, Default)]
pub struct SubscriberMetrics {
    /// Completed pull calls (including empty ones)
    pub pulls: Counter,
    /// Pull calls that returned an error
    pub pull_failures: Counter,
    /// Pull calls that returned no messages
    pub empty_pulls: Counter,
    /// Messages returned across all pulls
    pub messages_pulled: Counter,
    /// Nanoseconds spent inside pull calls
    pub pull_time_ns: Counter,
    /// Batches handed downstream
    pub batches_sent: Counter,
    /// Batches that could not be handed over (downstream closed)
    pub send_failures: Counter,
    /// Nanoseconds spent blocked on downstream admission
    pub send_time_ns: Counter,
}

impl SubscriberMetrics {
    /// Create new metrics with all counters at zero
    pub const fn new() -> Self {
        Self {
            pulls: Counter::new(),
            pull_failures: Counter::new(),
            empty_pulls: Counter::new(),
            messages_pulled: Counter::new(),
            pull_time_ns: Counter::new(),
            batches_sent: Counter::new(),
            send_failures: Counter::new(),
            send_time_ns: Counter::new(),
        }
    }

    /// Record a completed pull with the number of messages it returned
    #[inline]
    pub fn record_pull(&self, duration: Duration, messages: u64) {
        self.pulls.inc();
        self.pull_time_ns.add(duration.as_nanos() as u64);
        if messages == 0 {
            self.empty_pulls.inc();
        } else {
            self.messages_pulled.add(messages);
        }
    }

    /// Record a failed pull
    #[inline]
    pub fn record_pull_failure(&self, duration: Duration) {
        self.pull_failures.inc();
        self.pull_time_ns.add(duration.as_nanos() as u64);
    }

    /// Record a batch handed downstream and the time the handoff blocked
    #[inline]
    pub fn record_send(&self, duration: Duration) {
        self.batches_sent.inc();
        self.send_time_ns.add(duration.as_nanos() as u64);
    }

    /// Record a failed handoff
    #[inline]
    pub fn record_send_failure(&self) {
        self.send_failures.inc();
    }

    /// Take a snapshot of current values
    #[inline]
    pub fn snapshot(&self) -> SubscriberMetricsSnapshot {
        SubscriberMetricsSnapshot {
            pulls: self.pulls.get(),
            pull_failures: self.pull_failures.get(),
            empty_pulls: self.empty_pulls.get(),
            messages_pulled: self.messages_pulled.get(),
            pull_time_ns: self.pull_time_ns.get(),
            batches_sent: self.batches_sent.get(),
            send_failures: self.send_failures.get(),
            send_time_ns: self.send_time_ns.get(),
        }
    }
}

/// Point-in-time snapshot of subscriber metrics
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct SubscriberMetricsSnapshot {
    pub pulls: u64,
    pub pull_failures: u64,
    pub empty_pulls: u64,
    pub messages_pulled: u64,
    pub pull_time_ns: u64,
    pub batches_sent: u64,
    pub send_failures: u64,
    pub send_time_ns: u64,
}

impl SubscriberMetricsSnapshot {
    /// Average duration of a pull call
    pub fn avg_pull_time(&self) -> Duration {
        avg_ns(self.pull_time_ns, self.pulls + self.pull_failures)
    }

    /// Average time a downstream handoff blocked
    pub fn avg_send_time(&self) -> Duration {
        avg_ns(self.send_time_ns, self.batches_sent)
    }
}

/// Trait for subscribers to provide metrics to the reporter
pub trait SubscriberMetricsProvider: Send + Sync {
    /// Unique name of this subscriber
    fn subscriber_name(&self) -> &str;

    /// Topic the subscriber consumes
    fn topic(&self) -> &str;

    /// Broker family label (kafka, gcp_pubsub, aws_sqs)
    fn messaging_type(&self) -> &str;

    /// Get a snapshot of current metrics
    fn snapshot(&self) -> SubscriberMetricsSnapshot;
}

/// Metrics for a protected task
///
/// Tracks handler outcomes and the protection machinery around them.
/// All fields use atomics for lock-free updates.
#[derive(Debug, Default)]
pub struct TaskMetrics {
    /// Executions that ended in success
    pub successes: Counter,
    /// Executions that ended in failure (after retries)
    pub failures: Counter,
    /// Executions refused by an open circuit breaker
    pub rejections: Counter,
    /// Individual retry attempts beyond the first try
    pub retries: Counter,
    /// Nanoseconds spent inside handler invocations
    pub execution_time_ns: Counter,
}

impl TaskMetrics {
    /// Create new metrics with all counters at zero
    pub const fn new() -> Self {
        Self {
            successes: Counter::new(),
            failures: Counter::new(),
            rejections: Counter::new(),
            retries: Counter::new(),
            execution_time_ns: Counter::new(),
        }
    }

    /// Record a successful execution
    #[inline]
    pub fn record_success(&self, duration: Duration) {
        self.successes.inc();
        self.execution_time_ns.add(duration.as_nanos() as u64);
    }

    /// Record a failed execution (after retries were exhausted)
    #[inline]
    pub fn record_failure(&self, duration: Duration) {
        self.failures.inc();
        self.execution_time_ns.add(duration.as_nanos() as u64);
    }

    /// Record an execution refused by the circuit breaker
    #[inline]
    pub fn record_rejection(&self) {
        self.rejections.inc();
    }

    /// Record one retry attempt
    #[inline]
    pub fn record_retry(&self) {
        self.retries.inc();
    }

    /// Take a snapshot of current values
    #[inline]
    pub fn snapshot(&self) -> TaskMetricsSnapshot {
        TaskMetricsSnapshot {
            successes: self.successes.get(),
            failures: self.failures.get(),
            rejections: self.rejections.get(),
            retries: self.retries.get(),
            execution_time_ns: self.execution_time_ns.get(),
        }
    }
}

/// Point-in-time snapshot of task metrics
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct TaskMetricsSnapshot {
    pub successes: u64,
    pub failures: u64,
    pub rejections: u64,
    pub retries: u64,
    pub execution_time_ns: u64,
}

impl TaskMetricsSnapshot {
    /// Executions that ran to an outcome (success or failure)
    #[inline]
    pub fn completed(&self) -> u64 {
        self.successes + self.failures
    }

    /// Average handler time per completed execution
    pub fn avg_execution_time(&self) -> Duration {
        avg_ns(self.execution_time_ns, self.completed())
    }
}

/// Trait for protected tasks to provide metrics to the reporter
pub trait TaskMetricsProvider: Send + Sync {
    /// Unique name of this task
    fn task_name(&self) -> &str;

    /// Get a snapshot of current metrics
    fn snapshot(&self) -> TaskMetricsSnapshot;
}

/// Metrics for a processor
///
/// Processors track end-to-end message outcomes and acknowledgements.
/// All fields use atomics for lock-free updates.
#[derive(Debug, Default)]
pub struct ProcessorMetrics {
    /// Batches taken from upstream
    pub batches: Counter,
    /// Messages processed successfully
    pub processed: Counter,
    /// Messages whose processing failed
    pub process_failures: Counter,
    /// Nanoseconds spent processing messages
    pub process_time_ns: Counter,
    /// Messages acknowledged back to the broker
    pub acked: Counter,
    /// Acknowledgements that failed or were refused
    pub ack_failures: Counter,
    /// Nanoseconds spent in acknowledge calls
    pub ack_time_ns: Counter,
}

impl ProcessorMetrics {
    /// Create new metrics with all counters at zero
    pub const fn new() -> Self {
        Self {
            batches: Counter::new(),
            processed: Counter::new(),
            process_failures: Counter::new(),
            process_time_ns: Counter::new(),
            acked: Counter::new(),
            ack_failures: Counter::new(),
            ack_time_ns: Counter::new(),
        }
    }

    /// Record a batch taken from upstream
    #[inline]
    pub fn record_batch(&self) {
        self.batches.inc();
    }

    /// Record a successfully processed message
    #[inline]
    pub fn record_processed(&self, duration: Duration) {
        self.processed.inc();
        self.process_time_ns.add(duration.as_nanos() as u64);
    }

    /// Record a message whose processing failed
    #[inline]
    pub fn record_process_failure(&self, duration: Duration) {
        self.process_failures.inc();
        self.process_time_ns.add(duration.as_nanos() as u64);
    }

    /// Record acknowledged messages
    #[inline]
    pub fn record_acked(&self, duration: Duration, messages: u64) {
        self.acked.add(messages);
        self.ack_time_ns.add(duration.as_nanos() as u64);
    }

    /// Record messages whose acknowledgement failed
    #[inline]
    pub fn record_ack_failure(&self, messages: u64) {
        self.ack_failures.add(messages);
    }

    /// Take a snapshot of current values
    #[inline]
    pub fn snapshot(&self) -> ProcessorMetricsSnapshot {
        ProcessorMetricsSnapshot {
            batches: self.batches.get(),
            processed: self.processed.get(),
            process_failures: self.process_failures.get(),
            process_time_ns: self.process_time_ns.get(),
            acked: self.acked.get(),
            ack_failures: self.ack_failures.get(),
            ack_time_ns: self.ack_time_ns.get(),
        }
    }
}

/// Point-in-time snapshot of processor metrics
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct ProcessorMetricsSnapshot {
    pub batches: u64,
    pub processed: u64,
    pub process_failures: u64,
    pub process_time_ns: u64,
    pub acked: u64,
    pub ack_failures: u64,
    pub ack_time_ns: u64,
}

impl ProcessorMetricsSnapshot {
    /// Average processing time per message
    pub fn avg_process_time(&self) -> Duration {
        avg_ns(self.process_time_ns, self.processed + self.process_failures)
    }
}

/// Trait for processors to provide metrics to the reporter
pub trait ProcessorMetricsProvider: Send + Sync {
    /// Unique name of this processor
    fn processor_name(&self) -> &str;

    /// Topic the processor consumes
    fn topic(&self) -> &str;

    /// Get a snapshot of current metrics
    fn snapshot(&self) -> ProcessorMetricsSnapshot;
}

#[inline]
fn avg_ns(total_ns: u64, count: u64) -> Duration {
    if count == 0 {
        Duration::ZERO
    } else {
        Duration::from_nanos(total_ns / count)
    }
}
