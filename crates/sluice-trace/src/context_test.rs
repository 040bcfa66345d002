//! Tests for TraceContext parsing and extraction

use crate::context::{extract, TraceContext, TRACEPARENT_KEY};
use std::collections::HashMap;

const VALID: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

// =============================================================================
// TraceContext::parse tests
// =============================================================================

#[test]
fn test_parse_valid_header() {
    let ctx = TraceContext::parse(VALID).unwrap();

    assert_eq!(ctx.trace_id(), "4bf92f3577b34da6a3ce929d0e0e4736");
    assert_eq!(ctx.span_id(), "00f067aa0ba902b7");
    assert_eq!(ctx.flags(), 0x01);
    assert!(ctx.sampled());
}

#[test]
fn test_parse_unsampled_flags() {
    let header = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-00";
    let ctx = TraceContext::parse(header).unwrap();
    assert!(!ctx.sampled());
}

#[test]
fn test_parse_trims_whitespace() {
    let padded = format!("  {VALID} ");
    assert!(TraceContext::parse(&padded).is_some());
}

#[test]
fn test_parse_uppercase_hex_normalized() {
    let header = "00-4BF92F3577B34DA6A3CE929D0E0E4736-00F067AA0BA902B7-01";
    let ctx = TraceContext::parse(header).unwrap();
    assert_eq!(ctx.trace_id(), "4bf92f3577b34da6a3ce929d0e0e4736");
    assert_eq!(ctx.span_id(), "00f067aa0ba902b7");
}

#[test]
fn test_parse_future_version_with_extra_fields() {
    let header = "01-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01-extra";
    assert!(TraceContext::parse(header).is_some());
}

#[test]
fn test_parse_rejects_version_00_with_extra_fields() {
    let header = format!("{VALID}-extra");
    assert!(TraceContext::parse(&header).is_none());
}

#[test]
fn test_parse_rejects_malformed() {
    let cases = [
        "",
        "not-a-header",
        "00",
        "00-4bf92f3577b34da6a3ce929d0e0e4736",
        // bad version
        "ff-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
        "0-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
        // all-zero ids
        "00-00000000000000000000000000000000-00f067aa0ba902b7-01",
        "00-4bf92f3577b34da6a3ce929d0e0e4736-0000000000000000-01",
        // wrong lengths
        "00-4bf92f3577b34da6-00f067aa0ba902b7-01",
        "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa-01",
        // non-hex
        "00-zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz-00f067aa0ba902b7-01",
        "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-zz",
    ];

    for case in cases {
        assert!(TraceContext::parse(case).is_none(), "should reject: {case}");
    }
}

// =============================================================================
// Round-trip tests
// =============================================================================

#[test]
fn test_to_traceparent_roundtrip() {
    let ctx = TraceContext::parse(VALID).unwrap();
    assert_eq!(ctx.to_traceparent(), VALID);
    assert_eq!(TraceContext::parse(&ctx.to_traceparent()), Some(ctx));
}

#[test]
fn test_display_matches_to_traceparent() {
    let ctx = TraceContext::parse(VALID).unwrap();
    assert_eq!(format!("{ctx}"), ctx.to_traceparent());
}

// =============================================================================
// extract tests
// =============================================================================

fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_extract_present() {
    let carrier = attrs(&[(TRACEPARENT_KEY, VALID)]);
    let ctx = extract(&carrier).unwrap();
    assert_eq!(ctx.trace_id(), "4bf92f3577b34da6a3ce929d0e0e4736");
}

#[test]
fn test_extract_case_insensitive_key() {
    let carrier = attrs(&[("Traceparent", VALID)]);
    assert!(extract(&carrier).is_some());
}

#[test]
fn test_extract_absent_yields_none() {
    let carrier = attrs(&[("content-type", "application/json")]);
    assert!(extract(&carrier).is_none());
}

#[test]
fn test_extract_malformed_yields_none() {
    let carrier = attrs(&[(TRACEPARENT_KEY, "garbage")]);
    assert!(extract(&carrier).is_none());
}
