//! Bounded message queue with drain-on-stop semantics
//!
//! Decouples pull rate from processing rate: producers block when the
//! buffer is full (backpressure), the single consumer drains in FIFO
//! order, and `stop()` closes intake without discarding buffered items.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{info, warn};

use sluice_metrics::{QueueMetrics, QueueMetricsProvider, QueueMetricsSnapshot};

use crate::error::{PipelineError, QueueClosed, Result};

/// Producer side of a bounded FIFO buffer.
///
/// # Design
///
/// - Fixed capacity, validated at construction (> 0)
/// - `push` blocks while the buffer is full; that wait is the enqueue
///   time metric
/// - `stop` drops the sender; buffered items keep draining until the
///   consumer observes `None`
/// - Stopping is idempotent; pushes after stop fail with [`QueueClosed`]
///   and are recorded as enqueue failures, never panics
pub struct MessageQueue<T> {
    name: String,
    capacity: usize,
    sender: Mutex<Option<mpsc::Sender<T>>>,
    stopped: AtomicBool,
    metrics: Arc<QueueMetrics>,
}

/// Consuming end of a [`MessageQueue`].
///
/// There is exactly one consumer per queue; it records dequeue metrics
/// as it drains.
pub struct QueueConsumer<T> {
    receiver: mpsc::Receiver<T>,
    metrics: Arc<QueueMetrics>,
}

impl<T> MessageQueue<T> {
    /// Create a queue and its consumer.
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<(Self, QueueConsumer<T>)> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PipelineError::BlankName { component: "queue" });
        }
        if capacity == 0 {
            return Err(PipelineError::ZeroCapacity { queue: name });
        }

        let (sender, receiver) = mpsc::channel(capacity);
        let metrics = Arc::new(QueueMetrics::new());

        let queue = Self {
            name,
            capacity,
            sender: Mutex::new(Some(sender)),
            stopped: AtomicBool::new(false),
            metrics: Arc::clone(&metrics),
        };
        let consumer = QueueConsumer { receiver, metrics };

        Ok((queue, consumer))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items buffered and not yet consumed.
    pub fn occupancy(&self) -> u64 {
        self.metrics.snapshot().depth()
    }

    /// Enqueue an item, waiting while the buffer is full.
    ///
    /// The time spent waiting is recorded as enqueue time. Fails without
    /// blocking once the queue is stopped or the consumer is gone.
    pub async fn push(&self, item: T) -> std::result::Result<(), QueueClosed> {
        let start = Instant::now();

        let sender = self.sender.lock().clone();
        let sender = match sender {
            Some(sender) => sender,
            None => {
                self.metrics.record_enqueue_failure();
                warn!(queue = %self.name, reason = "stopped", "enqueue rejected");
                return Err(self.closed());
            }
        };

        match sender.send(item).await {
            Ok(()) => {
                self.metrics.record_enqueue(start.elapsed());
                Ok(())
            }
            Err(_) => {
                self.metrics.record_enqueue_failure();
                warn!(queue = %self.name, reason = "consumer_gone", "enqueue rejected");
                Err(self.closed())
            }
        }
    }

    /// Close intake. Idempotent.
    ///
    /// Buffered items continue to drain; the consumer sees `None` once
    /// the buffer is empty.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.sender.lock().take();
            info!(queue = %self.name, "message queue stopped");
        }
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Handle for the metrics reporter.
    pub fn metrics_handle(&self) -> QueueMetricsHandle {
        QueueMetricsHandle {
            name: self.name.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }

    fn closed(&self) -> QueueClosed {
        QueueClosed {
            queue: self.name.clone(),
        }
    }
}

impl<T> std::fmt::Debug for MessageQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageQueue")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl<T> QueueConsumer<T> {
    /// Next item in FIFO order, or `None` once the queue is stopped and
    /// drained.
    pub async fn next(&mut self) -> Option<T> {
        let start = Instant::now();
        let item = self.receiver.recv().await;
        if item.is_some() {
            self.metrics.record_dequeue(start.elapsed());
        }
        item
    }
}

impl<T> std::fmt::Debug for QueueConsumer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueConsumer").finish_non_exhaustive()
    }
}

/// Metrics handle for a queue, valid after the queue is consumed.
#[derive(Clone)]
pub struct QueueMetricsHandle {
    name: String,
    metrics: Arc<QueueMetrics>,
}

impl QueueMetricsProvider for QueueMetricsHandle {
    fn queue_name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> QueueMetricsSnapshot {
        self.metrics.snapshot()
    }
}
