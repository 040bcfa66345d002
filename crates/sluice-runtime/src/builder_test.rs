//! Tests for pipeline registration and wiring

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sluice_config::Config;
use sluice_message::Envelope;
use sluice_pipeline::{Acknowledger, BoxError, Handler, Puller};
use sluice_policy::PolicyRegistry;
use tokio::time::timeout;

use crate::builder::{MessagePipeline, PipelineBuilder};
use crate::error::RuntimeError;

// =============================================================================
// Test doubles
// =============================================================================

/// Always pulls nothing, slowly.
struct IdlePuller;

#[async_trait]
impl Puller for IdlePuller {
    async fn pull(&self) -> std::result::Result<Vec<Envelope>, BoxError> {
        tokio::time::sleep(Duration::from_millis(1)).await;
        Ok(Vec::new())
    }
}

struct NoopAcknowledger;

#[async_trait]
impl Acknowledger for NoopAcknowledger {
    async fn ack(&self, _envelope: &Envelope) -> std::result::Result<bool, BoxError> {
        Ok(true)
    }
}

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

fn parts() -> MessagePipeline<Envelope> {
    MessagePipeline::new(
        Arc::new(IdlePuller),
        Arc::new(NoopAcknowledger),
        Arc::new(PassHandler),
    )
}

fn config(toml: &str) -> Config {
    Config::from_str(toml).unwrap()
}

fn builder(toml: &str) -> PipelineBuilder {
    let config = config(toml);
    let registry = Arc::new(PolicyRegistry::new(config.clone()));
    PipelineBuilder::new(config, registry)
}

const ORDERS: &str = "[subscribers.orders]\ntopic = \"orders-v1\"\n";

// =============================================================================
// Registration tests
// =============================================================================

#[test]
fn test_unknown_subscriber_is_rejected() {
    let err = builder("").pipeline("ghost", parts()).unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownSubscriber { name } if name == "ghost"));
}

#[test]
fn test_duplicate_pipeline_is_rejected() {
    let err = builder(ORDERS)
        .pipeline("orders", parts())
        .unwrap()
        .pipeline("orders", parts())
        .unwrap_err();
    assert!(matches!(err, RuntimeError::DuplicatePipeline { name } if name == "orders"));
}

#[test]
fn test_dangling_queue_reference_is_rejected() {
    // File validation catches this; a hand-built config can still dangle.
    let mut config = config(ORDERS);
    if let Some(subscriber) = config.subscribers.get_mut("orders") {
        subscriber.queue = Some("ghost".into());
    }
    let registry = Arc::new(PolicyRegistry::new(config.clone()));

    let err = PipelineBuilder::new(config, registry)
        .pipeline("orders", parts())
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownQueue { queue, .. } if queue == "ghost"));
}

// =============================================================================
// Start and shutdown tests
// =============================================================================

#[tokio::test]
async fn test_start_and_shutdown_with_no_pipelines() {
    let pipelines = builder("").start();
    timeout(Duration::from_secs(2), pipelines.shutdown())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_an_idle_pipeline() {
    let pipelines = builder(ORDERS).pipeline("orders", parts()).unwrap().start();

    tokio::time::sleep(Duration::from_millis(10)).await;
    timeout(Duration::from_secs(2), pipelines.shutdown())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_shutdown_drains_through_a_staging_queue() {
    let toml = r#"
[queues.staging]
capacity = 4

[subscribers.orders]
topic = "orders-v1"
queue = "staging"
"#;
    let pipelines = builder(toml).pipeline("orders", parts()).unwrap().start();

    tokio::time::sleep(Duration::from_millis(10)).await;
    timeout(Duration::from_secs(2), pipelines.shutdown())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_external_cancellation_unblocks_join() {
    let pipelines = builder(ORDERS).pipeline("orders", parts()).unwrap().start();

    pipelines.cancel_token().cancel();
    timeout(Duration::from_secs(2), pipelines.join())
        .await
        .unwrap();
}
