//! Tracing span and event helpers for muxframe client operations.
//!
//! These helpers centralise span creation with dynamic level selection and
//! timing emission, keeping the instrumentation out of the actor's event
//! handlers.

use std::time::Instant;

use tracing::{Level, Span};

use super::tracing_config::TracingConfig;

/// Create a tracing span at a dynamically selected level.
///
/// Each branch calls the corresponding `tracing::<level>_span!` macro, so the
/// span metadata is static per branch while the branch choice is dynamic.
macro_rules! dynamic_span {
    ($level:expr, $name:expr $(, $($field:tt)*)?) => {
        match $level {
            Level::ERROR => tracing::error_span!($name $(, $($field)*)?),
            Level::WARN  => tracing::warn_span!($name $(, $($field)*)?),
            Level::INFO  => tracing::info_span!($name $(, $($field)*)?),
            Level::DEBUG => tracing::debug_span!($name $(, $($field)*)?),
            Level::TRACE => tracing::trace_span!($name $(, $($field)*)?),
        }
    };
}

/// Create a span around one dial and the transition to `Open`.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn open_span(config: &TracingConfig, url: &str, generation: u64) -> Span {
    dynamic_span!(
        config.open_level,
        "client.open",
        url = url,
        link.generation = generation
    )
}

/// Create a span for writing one request frame.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn send_span(config: &TracingConfig, request_id: &str, frame_bytes: usize) -> Span {
    dynamic_span!(
        config.send_level,
        "client.send",
        request.id = request_id,
        frame.bytes = frame_bytes
    )
}

/// Create a span for decoding and dispatching one inbound frame.
///
/// The `outcome` field is recorded once the frame has been classified.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn receive_span(config: &TracingConfig, frame_bytes: usize) -> Span {
    dynamic_span!(
        config.receive_level,
        "client.receive",
        frame.bytes = frame_bytes,
        outcome = tracing::field::Empty
    )
}

/// Create a span for the explicit `close` operation.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn close_span(config: &TracingConfig) -> Span {
    dynamic_span!(config.close_level, "client.close")
}

/// Start a timer when `enabled`.
pub(crate) fn start_timer(enabled: bool) -> Option<Instant> { enabled.then(Instant::now) }

/// Record elapsed time if timing was enabled for this operation.
///
/// When `start` is `Some`, an event with the `elapsed_us` field is emitted at
/// `DEBUG` level inside the current span.
pub(crate) fn emit_timing_event(start: Option<Instant>) {
    if let Some(start) = start {
        let elapsed_us = start.elapsed().as_micros();
        tracing::debug!(elapsed_us = elapsed_us, "operation.timing");
    }
}
