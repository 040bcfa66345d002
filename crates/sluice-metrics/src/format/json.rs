//! JSON metrics formatter
//!
//! Formats metrics as structured JSON for machine parsing. Counter and timer
//! keys follow the names in [`crate::tags`]; timer values are microseconds.
//!
//! # Example Output
//!
//! ```json
//! {
//!   "type": "unified",
//!   "queues": [{"name":"audit","enqueue_count":450,"dequeue_count":448}],
//!   "subscribers": [...],
//!   "tasks": [...],
//!   "processors": [...]
//! }
//! ```

use super::MetricsFormatter;
use crate::{CollectedMetrics, MetricsRates};
use serde::Serialize;

/// JSON metrics formatter
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON structure for unified metrics output
#[derive(Serialize)]
struct UnifiedJson<'a> {
    #[serde(rename = "type")]
    report_type: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    queues: Vec<QueueJson<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    subscribers: Vec<SubscriberJson<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tasks: Vec<TaskJson<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    processors: Vec<ProcessorJson<'a>>,
}

#[derive(Serialize)]
struct QueueJson<'a> {
    name: &'a str,
    enqueue_count: u64,
    enqueue_time: u64,
    dequeue_count: u64,
    dequeue_time: u64,
    depth: u64,
    enqueue_failures: u64,
}

#[derive(Serialize)]
struct SubscriberJson<'a> {
    name: &'a str,
    topic: &'a str,
    messaging_type: &'a str,
    subscriber_pull_count: u64,
    subscriber_pull_time: u64,
    messages_pulled: u64,
    send_count: u64,
    send_time: u64,
    pull_failures: u64,
}

#[derive(Serialize)]
struct TaskJson<'a> {
    name: &'a str,
    successes: u64,
    failures: u64,
    rejections: u64,
    retries: u64,
    avg_execution_us: u64,
}

#[derive(Serialize)]
struct ProcessorJson<'a> {
    name: &'a str,
    topic: &'a str,
    subscriber_process_count: u64,
    process_failures: u64,
    acknowledge_count: u64,
    ack_failures: u64,
}

impl MetricsFormatter for JsonFormatter {
    fn format_unified(&self, metrics: &CollectedMetrics, _rates: Option<&MetricsRates>) -> String {
        let json = UnifiedJson {
            report_type: "unified",
            queues: metrics
                .queues
                .iter()
                .map(|q| QueueJson {
                    name: &q.name,
                    enqueue_count: q.snapshot.enqueued,
                    enqueue_time: q.snapshot.enqueue_wait_ns / 1000,
                    dequeue_count: q.snapshot.dequeued,
                    dequeue_time: q.snapshot.dequeue_wait_ns / 1000,
                    depth: q.snapshot.depth(),
                    enqueue_failures: q.snapshot.enqueue_failures,
                })
                .collect(),
            subscribers: metrics
                .subscribers
                .iter()
                .map(|s| SubscriberJson {
                    name: &s.name,
                    topic: &s.topic,
                    messaging_type: &s.messaging_type,
                    subscriber_pull_count: s.snapshot.pulls,
                    subscriber_pull_time: s.snapshot.pull_time_ns / 1000,
                    messages_pulled: s.snapshot.messages_pulled,
                    send_count: s.snapshot.batches_sent,
                    send_time: s.snapshot.send_time_ns / 1000,
                    pull_failures: s.snapshot.pull_failures,
                })
                .collect(),
            tasks: metrics
                .tasks
                .iter()
                .map(|t| TaskJson {
                    name: &t.name,
                    successes: t.snapshot.successes,
                    failures: t.snapshot.failures,
                    rejections: t.snapshot.rejections,
                    retries: t.snapshot.retries,
                    avg_execution_us: t.snapshot.avg_execution_time().as_micros() as u64,
                })
                .collect(),
            processors: metrics
                .processors
                .iter()
                .map(|p| ProcessorJson {
                    name: &p.name,
                    topic: &p.topic,
                    subscriber_process_count: p.snapshot.processed,
                    process_failures: p.snapshot.process_failures,
                    acknowledge_count: p.snapshot.acked,
                    ack_failures: p.snapshot.ack_failures,
                })
                .collect(),
        };

        // Compact JSON, one report per log line
        serde_json::to_string(&json).unwrap_or_else(|_| "{}".to_string())
    }
}
