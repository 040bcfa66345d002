//! TraceContext - parsed W3C `traceparent` identity
//!
//! Format: `{version}-{trace-id}-{parent-id}-{flags}`, e.g.
//! `00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01`.
//!
//! Parsing is strict about field shape (hex, length, non-zero ids) but
//! lenient about versions above `00`, which may carry extra fields.

use std::fmt;

use crate::carrier::Carrier;

/// Attribute key carrying the W3C trace parent header.
pub const TRACEPARENT_KEY: &str = "traceparent";

const SAMPLED_FLAG: u8 = 0x01;

/// Trace identity extracted from an upstream message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: String,
    span_id: String,
    flags: u8,
}

impl TraceContext {
    /// Parse a `traceparent` header value.
    ///
    /// Returns `None` for malformed input; callers start a fresh trace in
    /// that case rather than failing the message.
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let flags = parts.next()?;

        if !is_hex(version, 2) || version.eq_ignore_ascii_case("ff") {
            return None;
        }
        // Version 00 has exactly four fields; later versions may append more.
        if version == "00" && parts.next().is_some() {
            return None;
        }
        if !is_hex(trace_id, 32) || is_all_zero(trace_id) {
            return None;
        }
        if !is_hex(span_id, 16) || is_all_zero(span_id) {
            return None;
        }
        if !is_hex(flags, 2) {
            return None;
        }
        let flags = u8::from_str_radix(flags, 16).ok()?;

        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id: span_id.to_ascii_lowercase(),
            flags,
        })
    }

    #[inline]
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    #[inline]
    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Whether the upstream marked this trace as sampled.
    #[inline]
    pub fn sampled(&self) -> bool {
        self.flags & SAMPLED_FLAG != 0
    }

    /// Render back to a version-00 `traceparent` value.
    pub fn to_traceparent(&self) -> String {
        format!("00-{}-{}-{:02x}", self.trace_id, self.span_id, self.flags)
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_traceparent())
    }
}

/// Extract the trace context from a carrier, if one is present and valid.
pub fn extract<C: Carrier + ?Sized>(carrier: &C) -> Option<TraceContext> {
    carrier
        .get_ignore_case(TRACEPARENT_KEY)
        .and_then(TraceContext::parse)
}

fn is_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_all_zero(s: &str) -> bool {
    s.bytes().all(|b| b == b'0')
}
