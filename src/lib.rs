#![doc(html_root_url = "https://docs.rs/muxframe/latest")]
//! Public API for the `muxframe` library.
//!
//! This crate multiplexes request/response calls and standing subscriptions
//! over one duplex text connection. Each frame is a JSON header object
//! followed directly by an optional body; the header's `id` correlates
//! replies and events with the request that caused them.
//!
//! The layers, bottom-up:
//!
//! - [`framer`] splits a frame into header and body by brace counting.
//! - [`envelope`] encodes request headers and classifies inbound frames.
//! - [`registry`] routes addressed frames to their handlers.
//! - [`request`] and [`response`] are the caller-facing values.
//! - [`client`] owns the connection lifecycle and reconnects on a health
//!   check.
//! - [`transport`] is the dialer seam, with in-memory and WebSocket dialers.

pub mod client;
pub mod correlation;
pub mod envelope;
pub mod framer;
pub mod metrics;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{Client, ClientBuilder, ClientError, ConnectionState, Subscription};
pub use correlation::RequestId;
pub use metrics::{
    CONNECTIONS_ACTIVE,
    DISPATCH_MISSES,
    Direction,
    ERRORS_TOTAL,
    FRAMES_PROCESSED,
    RECONNECTS_TOTAL,
};
pub use request::{Request, RequestBuilder};
pub use response::{CONNECTION_LOST, Response, ResponseKind};
