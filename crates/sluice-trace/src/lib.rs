//! Trace context extraction for the Sluice consumer pipeline
//!
//! Messages arrive with their trace identity encoded in broker attributes
//! (the W3C `traceparent` header). This crate provides:
//! - `Carrier` - Read-only view over a native attribute map
//! - `TraceContext` - Parsed trace identity (trace id, span id, flags)
//! - `processing_span` - A `tracing` span linked to the remote context
//!
//! # Design Principles
//!
//! - **Explicit values, no ambient state**: extraction returns a
//!   `TraceContext` value that callers pass along; nothing is stashed in
//!   thread-locals.
//! - **Malformed input starts fresh**: a missing or invalid header yields
//!   `None` and the pipeline opens a new trace instead of failing.

mod carrier;
mod context;
mod span;

pub use carrier::Carrier;
pub use context::{TraceContext, extract, TRACEPARENT_KEY};
pub use span::processing_span;

#[cfg(test)]
mod context_test;
