//! Span construction for message processing

use tracing::{info_span, Span};

use crate::context::TraceContext;

/// Build the span covering one message (or batch) worth of processing.
///
/// When an upstream context is present the span carries its `trace_id` and
/// `span_id` so log lines correlate across services. Without one, the span
/// starts a fresh trace.
pub fn processing_span(component: &str, operation: &str, context: Option<&TraceContext>) -> Span {
    match context {
        Some(ctx) => info_span!(
            "process",
            component = %component,
            operation = %operation,
            trace_id = %ctx.trace_id(),
            span_id = %ctx.span_id(),
            sampled = ctx.sampled(),
        ),
        None => info_span!(
            "process",
            component = %component,
            operation = %operation,
        ),
    }
}
