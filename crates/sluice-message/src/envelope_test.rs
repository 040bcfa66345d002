//! Tests for Envelope, MessageId and AckToken

use crate::envelope::{AckToken, Envelope, MessageId};
use std::collections::HashMap;

// =============================================================================
// MessageId tests
// =============================================================================

#[test]
fn test_message_id_new_from_str() {
    let id = MessageId::new("m-42");
    assert_eq!(id.as_str(), "m-42");
}

#[test]
fn test_message_id_from_string() {
    let id: MessageId = String::from("offset-1001").into();
    assert_eq!(id.as_str(), "offset-1001");
}

#[test]
fn test_message_id_display() {
    let id = MessageId::new("m-7");
    assert_eq!(format!("{id}"), "m-7");
}

#[test]
fn test_message_id_equality_and_hash() {
    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(MessageId::new("a"));
    set.insert(MessageId::new("a"));
    set.insert(MessageId::new("b"));
    assert_eq!(set.len(), 2);
}

// =============================================================================
// AckToken tests
// =============================================================================

#[test]
fn test_ack_token_new() {
    let token = AckToken::new("receipt-1");
    assert_eq!(token.as_str(), "receipt-1");
}

#[test]
fn test_ack_token_default_is_empty() {
    let token = AckToken::default();
    assert_eq!(token.as_str(), "");
}

// =============================================================================
// Envelope construction tests
// =============================================================================

#[test]
fn test_envelope_new_minimal() {
    let env = Envelope::new("m-1", "orders", b"payload".to_vec());

    assert_eq!(env.id().as_str(), "m-1");
    assert_eq!(env.topic(), "orders");
    assert_eq!(env.payload(), b"payload");
    assert!(env.attributes().is_empty());
    assert_eq!(env.ack_token().as_str(), "");
}

#[test]
fn test_envelope_with_attribute() {
    let env = Envelope::new("m-1", "orders", vec![])
        .with_attribute("traceparent", "00-abc-def-01")
        .with_attribute("content-type", "application/json");

    assert_eq!(env.attribute("traceparent"), Some("00-abc-def-01"));
    assert_eq!(env.attribute("content-type"), Some("application/json"));
    assert_eq!(env.attribute("missing"), None);
}

#[test]
fn test_envelope_with_attributes_replaces_map() {
    let mut attrs = HashMap::new();
    attrs.insert("k".to_string(), "v".to_string());

    let env = Envelope::new("m-1", "orders", vec![])
        .with_attribute("old", "gone")
        .with_attributes(attrs);

    assert_eq!(env.attribute("old"), None);
    assert_eq!(env.attribute("k"), Some("v"));
}

#[test]
fn test_envelope_with_ack_token() {
    let env = Envelope::new("m-1", "orders", vec![]).with_ack_token("receipt-9");
    assert_eq!(env.ack_token(), &AckToken::new("receipt-9"));
}

// =============================================================================
// Envelope payload tests
// =============================================================================

#[test]
fn test_envelope_payload_str_valid_utf8() {
    let env = Envelope::new("m-1", "orders", b"hello".to_vec());
    assert_eq!(env.payload_str(), Some("hello"));
}

#[test]
fn test_envelope_payload_str_invalid_utf8() {
    let env = Envelope::new("m-1", "orders", vec![0xff, 0xfe]);
    assert_eq!(env.payload_str(), None);
}

#[test]
fn test_envelope_into_payload() {
    let env = Envelope::new("m-1", "orders", b"bytes".to_vec());
    assert_eq!(env.into_payload(), b"bytes".to_vec());
}

#[test]
fn test_envelope_clone_is_independent() {
    let original = Envelope::new("m-1", "orders", b"data".to_vec()).with_attribute("a", "1");
    let cloned = original.clone();

    assert_eq!(cloned.id(), original.id());
    assert_eq!(cloned.payload(), original.payload());
    assert_eq!(cloned.attribute("a"), Some("1"));
}
