//! MessageBatch - an ordered group of envelopes from one pull
//!
//! Subscribers emit whole batches downstream; the per-message and batch
//! processors decide whether to fan out or hand the batch to a handler
//! in one piece. Order within a batch is the order the broker returned.

use crate::envelope::Envelope;

/// Ordered group of envelopes pulled in a single broker call.
#[derive(Debug, Clone, Default)]
pub struct MessageBatch {
    topic: String,
    envelopes: Vec<Envelope>,
}

impl MessageBatch {
    pub fn new(topic: impl Into<String>, envelopes: Vec<Envelope>) -> Self {
        Self {
            topic: topic.into(),
            envelopes,
        }
    }

    /// Empty batch for a topic; envelopes are pushed as they arrive.
    pub fn empty(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            envelopes: Vec::new(),
        }
    }

    #[inline]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[inline]
    pub fn envelopes(&self) -> &[Envelope] {
        &self.envelopes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    pub fn push(&mut self, envelope: Envelope) {
        self.envelopes.push(envelope);
    }

    /// First envelope, if any.
    pub fn first(&self) -> Option<&Envelope> {
        self.envelopes.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Envelope> {
        self.envelopes.iter()
    }

    /// Consume the batch, yielding the envelopes in pull order.
    pub fn into_envelopes(self) -> Vec<Envelope> {
        self.envelopes
    }
}

impl IntoIterator for MessageBatch {
    type Item = Envelope;
    type IntoIter = std::vec::IntoIter<Envelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.envelopes.into_iter()
    }
}

impl<'a> IntoIterator for &'a MessageBatch {
    type Item = &'a Envelope;
    type IntoIter = std::slice::Iter<'a, Envelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.envelopes.iter()
    }
}
