//! Metric and tag name vocabulary
//!
//! Shared constants so report keys and formatter output use the same
//! names; JSON reports key their counters by these strings.
//!
//! Two vocabulary entries are structural rather than keyed: the
//! success/failure outcome split appears as paired counters on every
//! snapshot, and failure classification appears as the `reason` field
//! on warning logs (error class names in snake_case).

/// Topic the component consumes from
pub const TAG_TOPIC: &str = "topic";
/// Component name (queue, subscriber, task, processor)
pub const TAG_NAME: &str = "name";
/// Broker family label (kafka, gcp_pubsub, aws_sqs)
pub const TAG_MESSAGING_TYPE: &str = "messaging_type";

/// Time spent blocking on queue admission
pub const ENQUEUE_TIME: &str = "enqueue_time";
/// Items offered to a queue
pub const ENQUEUE_COUNT: &str = "enqueue_count";
/// Items taken from a queue
pub const DEQUEUE_COUNT: &str = "dequeue_count";
/// Time spent waiting for the next queue item
pub const DEQUEUE_TIME: &str = "dequeue_time";
/// Time spent handing a batch downstream
pub const SEND_TIME: &str = "send_time";
/// Batches handed downstream
pub const SEND_COUNT: &str = "send_count";
/// Broker pull calls
pub const SUBSCRIBER_PULL_COUNT: &str = "subscriber_pull_count";
/// Time spent inside broker pull calls
pub const SUBSCRIBER_PULL_TIME: &str = "subscriber_pull_time";
/// Messages run through a processor
pub const SUBSCRIBER_PROCESS_COUNT: &str = "subscriber_process_count";
/// Messages acknowledged back to the broker
pub const ACKNOWLEDGE_COUNT: &str = "acknowledge_count";
