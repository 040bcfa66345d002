//! Human-readable metrics formatter
//!
//! Formats metrics in a compact, readable format for operators.
//!
//! # Example Output
//!
//! ```text
//! [metrics] queues: audit (depth 12, in 45/s, out 45/s)
//! [metrics] subscribers: orders kafka/orders-v1 (120/s msgs, 12/s batches, pull 2.1ms)
//! [metrics] tasks: payments (118/s, avg 3.4ms, 2 fail, 1 rej, 5 retry)
//! [metrics] processors: orders (117/s processed, 117/s acked)
//! ```

use super::{format_duration, format_rate, MetricsFormatter};
use crate::{CollectedMetrics, MetricsRates};
use std::fmt::Write;

/// Human-readable metrics formatter
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter;

impl HumanFormatter {
    /// Create a new human formatter
    pub fn new() -> Self {
        Self
    }

    fn format_queues(&self, rates: &MetricsRates) -> Option<String> {
        if rates.queues.is_empty() {
            return None;
        }

        let mut output = String::from("[metrics] queues:");

        for (i, queue) in rates.queues.iter().enumerate() {
            if i > 0 {
                output.push_str(" |");
            }

            let _ = write!(
                output,
                " {} (depth {}, in {}, out {}",
                queue.name,
                queue.depth,
                format_rate(queue.enqueued_per_sec),
                format_rate(queue.dequeued_per_sec),
            );

            if queue.enqueue_failures > 0 {
                let _ = write!(output, ", {} rejected", queue.enqueue_failures);
            }

            output.push(')');
        }

        Some(output)
    }

    fn format_subscribers(&self, rates: &MetricsRates) -> Option<String> {
        if rates.subscribers.is_empty() {
            return None;
        }

        let mut output = String::from("[metrics] subscribers:");

        for (i, subscriber) in rates.subscribers.iter().enumerate() {
            if i > 0 {
                output.push_str(" |");
            }

            let _ = write!(
                output,
                " {} {}/{} ({} msgs, {} batches, pull {}",
                subscriber.name,
                subscriber.messaging_type,
                subscriber.topic,
                format_rate(subscriber.messages_per_sec),
                format_rate(subscriber.batches_per_sec),
                format_duration(subscriber.avg_pull_time),
            );

            if subscriber.pull_failures > 0 {
                let _ = write!(output, ", {} err", subscriber.pull_failures);
            }

            output.push(')');
        }

        Some(output)
    }

    fn format_tasks(&self, rates: &MetricsRates) -> Option<String> {
        if rates.tasks.is_empty() {
            return None;
        }

        let mut output = String::from("[metrics] tasks:");

        for (i, task) in rates.tasks.iter().enumerate() {
            if i > 0 {
                output.push_str(" |");
            }

            let _ = write!(
                output,
                " {} ({}, avg {}",
                task.name,
                format_rate(task.completed_per_sec),
                format_duration(task.avg_execution_time),
            );

            if task.failures > 0 {
                let _ = write!(output, ", {} fail", task.failures);
            }
            if task.rejections > 0 {
                let _ = write!(output, ", {} rej", task.rejections);
            }
            if task.retries > 0 {
                let _ = write!(output, ", {} retry", task.retries);
            }

            output.push(')');
        }

        Some(output)
    }

    fn format_processors(&self, rates: &MetricsRates) -> Option<String> {
        if rates.processors.is_empty() {
            return None;
        }

        let mut output = String::from("[metrics] processors:");

        for (i, processor) in rates.processors.iter().enumerate() {
            if i > 0 {
                output.push_str(" |");
            }

            let _ = write!(
                output,
                " {} ({} processed, {} acked",
                processor.name,
                format_rate(processor.processed_per_sec),
                format_rate(processor.acked_per_sec),
            );

            if processor.failures > 0 {
                let _ = write!(output, ", {} fail", processor.failures);
            }
            if processor.ack_failures > 0 {
                let _ = write!(output, ", {} ack-fail", processor.ack_failures);
            }

            output.push(')');
        }

        Some(output)
    }
}

impl MetricsFormatter for HumanFormatter {
    fn format_unified(&self, _metrics: &CollectedMetrics, rates: Option<&MetricsRates>) -> String {
        let Some(rates) = rates else {
            return "[metrics] collecting baseline".to_string();
        };

        let mut lines = Vec::new();

        if let Some(line) = self.format_queues(rates) {
            lines.push(line);
        }
        if let Some(line) = self.format_subscribers(rates) {
            lines.push(line);
        }
        if let Some(line) = self.format_tasks(rates) {
            lines.push(line);
        }
        if let Some(line) = self.format_processors(rates) {
            lines.push(line);
        }

        if lines.is_empty() {
            "[metrics] no components registered".to_string()
        } else {
            lines.join("\n")
        }
    }
}
