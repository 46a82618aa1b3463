//! Metric helpers for `muxframe`.
//!
//! This module defines metric names and small helpers wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! every helper is a no-op.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the gauge tracking open transport links.
pub const CONNECTIONS_ACTIVE: &str = "muxframe_connections_active";
/// Name of the counter tracking processed frames.
pub const FRAMES_PROCESSED: &str = "muxframe_frames_processed_total";
/// Name of the counter tracking malformed frames and transport errors.
pub const ERRORS_TOTAL: &str = "muxframe_errors_total";
/// Name of the counter tracking addressed frames with no registered handler.
pub const DISPATCH_MISSES: &str = "muxframe_dispatch_misses_total";
/// Name of the counter tracking health-check reconnect attempts.
pub const RECONNECTS_TOTAL: &str = "muxframe_reconnects_total";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Frames received from the peer.
    Inbound,
    /// Frames written to the peer.
    Outbound,
}

impl Direction {
    /// Label value used for the `direction` label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Increment the active connections gauge.
pub fn inc_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).increment(1.0);
}

/// Decrement the active connections gauge.
pub fn dec_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).decrement(1.0);
}

/// Record a processed frame for the given direction.
#[cfg_attr(
    not(feature = "metrics"),
    expect(unused_variables, reason = "direction only labels recorded metrics")
)]
pub fn inc_frames(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_PROCESSED, "direction" => direction.as_str()).increment(1);
}

/// Record a malformed frame or transport error.
pub fn inc_errors() {
    #[cfg(feature = "metrics")]
    counter!(ERRORS_TOTAL).increment(1);
}

/// Record an addressed frame that matched no handler.
pub fn inc_dispatch_misses() {
    #[cfg(feature = "metrics")]
    counter!(DISPATCH_MISSES).increment(1);
}

/// Record a reconnect attempt started by the health check.
pub fn inc_reconnects() {
    #[cfg(feature = "metrics")]
    counter!(RECONNECTS_TOTAL).increment(1);
}
