//! Envelope - a single broker message moving through the pipeline
//!
//! An `Envelope` pairs the opaque payload with the metadata the pipeline
//! needs: the topic it was pulled from, the attribute map used as a trace
//! carrier, and the acknowledgement token the broker expects back.

use std::collections::HashMap;
use std::fmt;

/// Broker-assigned message identifier.
///
/// Treated as an opaque string; brokers differ in what they put here
/// (Kafka offset, Pub/Sub message id, SQS message id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque acknowledgement receipt.
///
/// Returned by the broker on pull and handed back on acknowledge. The
/// pipeline never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AckToken(String);

impl AckToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AckToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AckToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AckToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single message pulled from a broker.
///
/// # Design
///
/// - Fields are private; construction goes through [`Envelope::new`] plus
///   the `with_*` builders so every envelope is valid by construction.
/// - Cloning copies the payload. Handlers that need ownership get a clone
///   while the processor keeps the original for acknowledgement.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Broker-assigned identifier
    id: MessageId,

    /// Topic (or queue / subscription) this message was pulled from
    topic: String,

    /// Raw payload bytes
    payload: Vec<u8>,

    /// Attribute map; doubles as the trace propagation carrier
    attributes: HashMap<String, String>,

    /// Receipt handed back to the broker on acknowledge
    ack_token: AckToken,
}

impl Envelope {
    pub fn new(id: impl Into<MessageId>, topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            payload,
            attributes: HashMap::new(),
            ack_token: AckToken::default(),
        }
    }

    /// Attach a single attribute (header) to the envelope.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replace the whole attribute map.
    pub fn with_attributes(mut self, attributes: HashMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_ack_token(mut self, token: impl Into<AckToken>) -> Self {
        self.ack_token = token.into();
        self
    }

    #[inline]
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    #[inline]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload interpreted as UTF-8, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    #[inline]
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Look up a single attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    #[inline]
    pub fn ack_token(&self) -> &AckToken {
        &self.ack_token
    }

    /// Consume the envelope, returning the raw payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}
