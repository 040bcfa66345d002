//! Tests for metric structs and snapshots

use crate::traits::{ProcessorMetrics, QueueMetrics, SubscriberMetrics, TaskMetrics};
use crate::Counter;
use std::time::Duration;

// =============================================================================
// Counter tests
// =============================================================================

#[test]
fn test_counter_operations() {
    let counter = Counter::new();
    assert_eq!(counter.get(), 0);

    counter.inc();
    counter.add(4);
    assert_eq!(counter.get(), 5);
}

// =============================================================================
// QueueMetrics tests
// =============================================================================

#[test]
fn test_queue_metrics_record_and_snapshot() {
    let metrics = QueueMetrics::new();

    metrics.record_enqueue(Duration::from_micros(10));
    metrics.record_enqueue(Duration::from_micros(30));
    metrics.record_dequeue(Duration::from_micros(40));
    metrics.record_enqueue_failure();

    let snap = metrics.snapshot();
    assert_eq!(snap.enqueued, 2);
    assert_eq!(snap.dequeued, 1);
    assert_eq!(snap.enqueue_failures, 1);
    assert_eq!(snap.depth(), 1);
    assert_eq!(snap.avg_enqueue_wait(), Duration::from_micros(20));
    assert_eq!(snap.avg_dequeue_wait(), Duration::from_micros(40));
}

#[test]
fn test_queue_snapshot_empty_averages() {
    let snap = QueueMetrics::new().snapshot();
    assert_eq!(snap.avg_enqueue_wait(), Duration::ZERO);
    assert_eq!(snap.depth(), 0);
}

// =============================================================================
// SubscriberMetrics tests
// =============================================================================

#[test]
fn test_subscriber_metrics_pull_accounting() {
    let metrics = SubscriberMetrics::new();

    metrics.record_pull(Duration::from_millis(2), 10);
    metrics.record_pull(Duration::from_millis(4), 0);
    metrics.record_pull_failure(Duration::from_millis(6));

    let snap = metrics.snapshot();
    assert_eq!(snap.pulls, 2);
    assert_eq!(snap.empty_pulls, 1);
    assert_eq!(snap.pull_failures, 1);
    assert_eq!(snap.messages_pulled, 10);
    // avg over 3 calls: (2 + 4 + 6) / 3 = 4ms
    assert_eq!(snap.avg_pull_time(), Duration::from_millis(4));
}

#[test]
fn test_subscriber_metrics_send_accounting() {
    let metrics = SubscriberMetrics::new();

    metrics.record_send(Duration::from_millis(1));
    metrics.record_send(Duration::from_millis(3));
    metrics.record_send_failure();

    let snap = metrics.snapshot();
    assert_eq!(snap.batches_sent, 2);
    assert_eq!(snap.send_failures, 1);
    assert_eq!(snap.avg_send_time(), Duration::from_millis(2));
}

// =============================================================================
// TaskMetrics tests
// =============================================================================

#[test]
fn test_task_metrics_outcomes() {
    let metrics = TaskMetrics::new();

    metrics.record_success(Duration::from_millis(2));
    metrics.record_failure(Duration::from_millis(4));
    metrics.record_rejection();
    metrics.record_retry();
    metrics.record_retry();

    let snap = metrics.snapshot();
    assert_eq!(snap.successes, 1);
    assert_eq!(snap.failures, 1);
    assert_eq!(snap.rejections, 1);
    assert_eq!(snap.retries, 2);
    assert_eq!(snap.completed(), 2);
    assert_eq!(snap.avg_execution_time(), Duration::from_millis(3));
}

#[test]
fn test_task_metrics_rejection_not_completed() {
    let metrics = TaskMetrics::new();
    metrics.record_rejection();

    let snap = metrics.snapshot();
    assert_eq!(snap.completed(), 0);
    assert_eq!(snap.avg_execution_time(), Duration::ZERO);
}

// =============================================================================
// ProcessorMetrics tests
// =============================================================================

#[test]
fn test_processor_metrics_accounting() {
    let metrics = ProcessorMetrics::new();

    metrics.record_batch();
    metrics.record_processed(Duration::from_millis(1));
    metrics.record_processed(Duration::from_millis(3));
    metrics.record_process_failure(Duration::from_millis(2));
    metrics.record_acked(Duration::from_micros(100), 2);
    metrics.record_ack_failure(1);

    let snap = metrics.snapshot();
    assert_eq!(snap.batches, 1);
    assert_eq!(snap.processed, 2);
    assert_eq!(snap.process_failures, 1);
    assert_eq!(snap.acked, 2);
    assert_eq!(snap.ack_failures, 1);
    assert_eq!(snap.avg_process_time(), Duration::from_millis(2));
}
