//! Tests for the single-message and batch processors

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sluice_message::{Envelope, MessageBatch};
use sluice_metrics::ProcessorMetricsProvider;
use tokio::sync::mpsc;

use crate::batch::BatchProcessor;
use crate::broker::{Acknowledger, BatchAcknowledger};
use crate::error::BoxError;
use crate::processor::Processor;
use crate::queue::MessageQueue;
use crate::task::{Handler, ProtectedTask, ProtectedTaskBuilder};

// =============================================================================
// Test doubles
// =============================================================================

/// Records acknowledged ids; can decline or fail a specific one.
struct RecordingAcknowledger {
    acked: Mutex<Vec<String>>,
    decline: Option<String>,
    fail: Option<String>,
}

impl RecordingAcknowledger {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            acked: Mutex::new(Vec::new()),
            decline: None,
            fail: None,
        })
    }

    fn declining(id: &str) -> Arc<Self> {
        Arc::new(Self {
            acked: Mutex::new(Vec::new()),
            decline: Some(id.into()),
            fail: None,
        })
    }

    fn failing(id: &str) -> Arc<Self> {
        Arc::new(Self {
            acked: Mutex::new(Vec::new()),
            decline: None,
            fail: Some(id.into()),
        })
    }

    fn acked(&self) -> Vec<String> {
        self.acked.lock().clone()
    }
}

#[async_trait]
impl Acknowledger for RecordingAcknowledger {
    async fn ack(&self, envelope: &Envelope) -> std::result::Result<bool, BoxError> {
        let id = envelope.id().as_str().to_string();
        if self.fail.as_deref() == Some(id.as_str()) {
            return Err("ack channel broken".into());
        }
        if self.decline.as_deref() == Some(id.as_str()) {
            return Ok(false);
        }
        self.acked.lock().push(id);
        Ok(true)
    }
}

/// Confirms at most `confirm` envelopes per batch, recording batch sizes.
struct ScriptedBatchAcknowledger {
    confirm: usize,
    calls: Mutex<Vec<usize>>,
}

impl ScriptedBatchAcknowledger {
    fn new(confirm: usize) -> Arc<Self> {
        Arc::new(Self {
            confirm,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<usize> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl BatchAcknowledger for ScriptedBatchAcknowledger {
    async fn ack_batch(
        &self,
        envelopes: &[Envelope],
    ) -> std::result::Result<usize, BoxError> {
        self.calls.lock().push(envelopes.len());
        Ok(self.confirm.min(envelopes.len()))
    }
}

/// Passes every envelope through unchanged.
struct PassHandler;

#[async_trait]
impl Handler<Envelope, Envelope> for PassHandler {
    async fn handle(
        &self,
        input: Envelope,
    ) -> std::result::Result<Option<Envelope>, BoxError> {
        Ok(Some(input))
    }
}

/// Fails envelopes carrying a given id, passes the rest.
struct RejectingHandler {
    reject: String,
}

#[async_trait]
impl Handler<Envelope, Envelope> for RejectingHandler {
    async fn handle(
        &self,
        input: Envelope,
    ) -> std::result::Result<Option<Envelope>, BoxError> {
        if input.id().as_str() == self.reject {
            Err("poison message".into())
        } else {
            Ok(Some(input))
        }
    }
}

/// Consumes every envelope without producing output.
struct DropHandler;

#[async_trait]
impl Handler<Envelope, Envelope> for DropHandler {
    async fn handle(
        &self,
        _input: Envelope,
    ) -> std::result::Result<Option<Envelope>, BoxError> {
        Ok(None)
    }
}

/// Passes a whole batch through unchanged.
struct PassBatchHandler;

#[async_trait]
impl Handler<MessageBatch, MessageBatch> for PassBatchHandler {
    async fn handle(
        &self,
        input: MessageBatch,
    ) -> std::result::Result<Option<MessageBatch>, BoxError> {
        Ok(Some(input))
    }
}

/// Fails every batch.
struct FailBatchHandler;

#[async_trait]
impl Handler<MessageBatch, MessageBatch> for FailBatchHandler {
    async fn handle(
        &self,
        _input: MessageBatch,
    ) -> std::result::Result<Option<MessageBatch>, BoxError> {
        Err("batch handler broken".into())
    }
}

fn envelope(id: &str) -> Envelope {
    Envelope::new(id, "orders-v1", b"{}".to_vec())
}

fn batch(ids: &[&str]) -> MessageBatch {
    MessageBatch::new("orders-v1", ids.iter().map(|id| envelope(id)).collect())
}

fn task(handler: Arc<dyn Handler<Envelope, Envelope>>) -> ProtectedTask<Envelope, Envelope> {
    ProtectedTaskBuilder::new("orders")
        .handler(handler)
        .build()
        .unwrap()
}

fn processor(
    handler: Arc<dyn Handler<Envelope, Envelope>>,
    acknowledger: Arc<RecordingAcknowledger>,
) -> Processor<Envelope> {
    Processor::new("orders", "orders-v1", task(handler), acknowledger, true).unwrap()
}

fn batch_processor(
    handler: Arc<dyn Handler<MessageBatch, MessageBatch>>,
    acknowledger: Arc<ScriptedBatchAcknowledger>,
) -> BatchProcessor {
    let task = ProtectedTaskBuilder::new("orders")
        .handler(handler)
        .build()
        .unwrap();
    BatchProcessor::new("orders", "orders-v1", task, acknowledger, true).unwrap()
}

/// Feeds the given batches through a channel that then closes.
async fn feed(batches: Vec<MessageBatch>) -> mpsc::Receiver<MessageBatch> {
    let (tx, rx) = mpsc::channel(batches.len().max(1));
    for batch in batches {
        tx.send(batch).await.unwrap();
    }
    rx
}

// =============================================================================
// Single-message processor tests
// =============================================================================

#[tokio::test]
async fn test_happy_path_acknowledges_in_order() {
    let acknowledger = RecordingAcknowledger::new();
    let processor = processor(Arc::new(PassHandler), acknowledger.clone());
    let metrics = processor.metrics_handle();

    processor.run(feed(vec![batch(&["1", "2", "3"])]).await).await;

    assert_eq!(acknowledger.acked(), vec!["1", "2", "3"]);
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.batches, 1);
    assert_eq!(snapshot.processed, 3);
    assert_eq!(snapshot.acked, 3);
    assert_eq!(snapshot.process_failures, 0);
    assert_eq!(snapshot.ack_failures, 0);
}

#[tokio::test]
async fn test_failed_message_is_left_unacknowledged() {
    let acknowledger = RecordingAcknowledger::new();
    let handler = Arc::new(RejectingHandler {
        reject: "2".into(),
    });
    let processor = processor(handler, acknowledger.clone());
    let metrics = processor.metrics_handle();

    processor.run(feed(vec![batch(&["1", "2", "3"])]).await).await;

    // The stream survives the poison message.
    assert_eq!(acknowledger.acked(), vec!["1", "3"]);
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.processed, 2);
    assert_eq!(snapshot.process_failures, 1);
    assert_eq!(snapshot.acked, 2);
    assert_eq!(snapshot.ack_failures, 0);
}

#[tokio::test]
async fn test_declined_ack_is_terminal_for_the_message() {
    let acknowledger = RecordingAcknowledger::declining("2");
    let processor = processor(Arc::new(PassHandler), acknowledger.clone());
    let metrics = processor.metrics_handle();

    processor.run(feed(vec![batch(&["1", "2", "3"])]).await).await;

    assert_eq!(acknowledger.acked(), vec!["1", "3"]);
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.processed, 3);
    assert_eq!(snapshot.acked, 2);
    assert_eq!(snapshot.ack_failures, 1);
}

#[tokio::test]
async fn test_ack_error_does_not_stop_the_stream() {
    let acknowledger = RecordingAcknowledger::failing("1");
    let processor = processor(Arc::new(PassHandler), acknowledger.clone());
    let metrics = processor.metrics_handle();

    processor.run(feed(vec![batch(&["1", "2"])]).await).await;

    assert_eq!(acknowledger.acked(), vec!["2"]);
    assert_eq!(metrics.snapshot().ack_failures, 1);
}

#[tokio::test]
async fn test_filtered_messages_are_still_acknowledged() {
    let acknowledger = RecordingAcknowledger::new();
    let processor = processor(Arc::new(DropHandler), acknowledger.clone());
    let metrics = processor.metrics_handle();

    processor.run(feed(vec![batch(&["1", "2"])]).await).await;

    // The handler produced no output, but the broker is still done with them.
    assert_eq!(acknowledger.acked(), vec!["1", "2"]);
    assert_eq!(metrics.snapshot().processed, 2);
}

#[tokio::test]
async fn test_drains_a_stopped_queue() {
    let (queue, consumer) = MessageQueue::new("staging", 4).unwrap();
    queue.push(batch(&["1", "2"])).await.unwrap();
    queue.push(batch(&["3"])).await.unwrap();
    queue.stop();

    let acknowledger = RecordingAcknowledger::new();
    let processor = processor(Arc::new(PassHandler), acknowledger.clone());
    let metrics = processor.metrics_handle();

    // Everything admitted before the stop is still processed.
    processor.run(consumer).await;

    assert_eq!(acknowledger.acked(), vec!["1", "2", "3"]);
    assert_eq!(metrics.snapshot().batches, 2);
}

#[tokio::test]
async fn test_trace_attributes_do_not_disturb_processing() {
    let traced = envelope("1").with_attribute(
        "traceparent",
        "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
    );
    let acknowledger = RecordingAcknowledger::new();
    let processor = processor(Arc::new(PassHandler), acknowledger.clone());

    processor
        .run(feed(vec![MessageBatch::new("orders-v1", vec![traced])]).await)
        .await;

    assert_eq!(acknowledger.acked(), vec!["1"]);
}

#[tokio::test]
async fn test_metrics_handle_names_the_processor() {
    let processor = processor(Arc::new(PassHandler), RecordingAcknowledger::new());
    let metrics = processor.metrics_handle();

    assert_eq!(metrics.processor_name(), "orders");
    assert_eq!(metrics.topic(), "orders-v1");
}

// =============================================================================
// Batch processor tests
// =============================================================================

#[tokio::test]
async fn test_batch_full_ack() {
    let acknowledger = ScriptedBatchAcknowledger::new(usize::MAX);
    let processor = batch_processor(Arc::new(PassBatchHandler), acknowledger.clone());
    let metrics = processor.metrics_handle();

    processor.run(feed(vec![batch(&["1", "2", "3"])]).await).await;

    assert_eq!(acknowledger.calls(), vec![3]);
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.batches, 1);
    assert_eq!(snapshot.processed, 1);
    assert_eq!(snapshot.acked, 3);
    assert_eq!(snapshot.ack_failures, 0);
}

#[tokio::test]
async fn test_batch_partial_ack_is_recorded_faithfully() {
    let acknowledger = ScriptedBatchAcknowledger::new(3);
    let processor = batch_processor(Arc::new(PassBatchHandler), acknowledger.clone());
    let metrics = processor.metrics_handle();

    processor
        .run(feed(vec![batch(&["1", "2", "3", "4", "5"])]).await)
        .await;

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.acked, 3);
    assert_eq!(snapshot.ack_failures, 2);
}

#[tokio::test]
async fn test_failed_batch_is_never_acknowledged() {
    let acknowledger = ScriptedBatchAcknowledger::new(usize::MAX);
    let processor = batch_processor(Arc::new(FailBatchHandler), acknowledger.clone());
    let metrics = processor.metrics_handle();

    processor.run(feed(vec![batch(&["1", "2", "3"])]).await).await;

    assert!(acknowledger.calls().is_empty());
    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.process_failures, 1);
    assert_eq!(snapshot.acked, 0);
}
