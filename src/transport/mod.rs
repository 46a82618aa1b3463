//! Transport seam between the connection actor and a duplex text channel.
//!
//! The client never opens sockets itself. It asks a [`Dialer`] for a
//! [`Link`] and then only writes text frames into the link's sink and reads
//! text frames from its stream. The end of the stream signals that the
//! transport closed; an `Err` item is informational and does not close it.

use std::{fmt, pin::Pin};

use async_trait::async_trait;
use futures::{Sink, Stream};
use thiserror::Error;

pub mod memory;
#[cfg(feature = "websocket")]
pub mod websocket;

pub use memory::{MemoryDialer, MemoryPeer, MemoryServer, memory_transport};
#[cfg(feature = "websocket")]
pub use websocket::WebSocketDialer;

/// Errors raised by a transport while dialling, reading or writing.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote end refused the connection.
    #[error("connection to {0} refused")]
    Refused(String),
    /// The transport is closed and cannot carry further frames.
    #[error("transport closed")]
    Closed,
    /// A frame arrived that cannot be represented as text.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    /// Any other transport-specific failure.
    #[error("transport failure: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wrap a transport-specific error.
    pub fn other(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(error))
    }
}

/// Outbound half of a link.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;

/// Inbound half of a link. The stream ending means the transport closed.
pub type FrameSource = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// An established duplex text connection.
pub struct Link {
    /// Frames written to the peer.
    pub sink: FrameSink,
    /// Frames received from the peer.
    pub source: FrameSource,
}

impl Link {
    /// Box the two halves of a connection.
    pub fn new<Si, St>(sink: Si, source: St) -> Self
    where
        Si: Sink<String, Error = TransportError> + Send + 'static,
        St: Stream<Item = Result<String, TransportError>> + Send + 'static,
    {
        Self {
            sink: Box::pin(sink),
            source: Box::pin(source),
        }
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link").finish_non_exhaustive()
    }
}

/// Source of fresh links, called on first open and on every reconnect.
///
/// Implementations must be cancellation-safe: dropping a pending `dial()`
/// future must not leak resources.
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    /// Open a new link to `url`.
    async fn dial(&self, url: &str) -> Result<Link, TransportError>;
}
