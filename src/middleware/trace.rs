//! Per-request tracing.

use std::time::Instant;

use tracing::{Span, info, info_span};

/// Span wrapping one request from routing to the last response byte.
pub fn span(method: &http::Method, path: &str) -> Span {
    info_span!("request", %method, path)
}

/// Emits the one completion event every request produces.
pub fn finish(status: u16, started: Instant) {
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    info!(status, elapsed_ms, "request completed");
}
