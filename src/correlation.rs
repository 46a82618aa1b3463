//! Correlation identifiers for requests multiplexed over one connection.
//!
//! Identifiers are allocated by the client, never by the caller, from a
//! per-client monotonic counter. They travel on the wire as decimal strings
//! and match every response (or subscription event) to its originating
//! request.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

/// Identifier assigned to an outgoing request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap an identifier received from the peer.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    /// Borrow the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl From<u64> for RequestId {
    fn from(value: u64) -> Self { Self(value.to_string()) }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self { Self(value.to_owned()) }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Monotonic source of [`RequestId`]s.
///
/// The first identifier is `"0"`. Values are never reused for the lifetime of
/// the counter, which outlives any individual transport link, so ids stay
/// unique across reconnects.
#[derive(Debug, Default)]
pub struct CorrelationCounter(AtomicU64);

impl CorrelationCounter {
    /// Create a counter starting at zero.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Allocate the next identifier.
    ///
    /// `Relaxed` ordering is enough: only uniqueness of the returned values is
    /// required, and `fetch_add` guarantees that on its own.
    pub fn next_id(&self) -> RequestId { RequestId::from(self.0.fetch_add(1, Ordering::Relaxed)) }
}
