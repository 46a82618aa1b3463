//! In-process transport pairing a [`MemoryDialer`] with a [`MemoryServer`].
//!
//! Every successful dial creates two unbounded channels and hands the server
//! side to [`MemoryServer::accept`] as a [`MemoryPeer`]. Dropping or closing
//! the peer ends the client's inbound stream, which the client observes as a
//! transport close.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use futures::{
    SinkExt,
    StreamExt,
    channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded},
};
use tracing::debug;

use super::{Dialer, Link, TransportError};

#[derive(Debug)]
struct Shared {
    accept: UnboundedSender<MemoryPeer>,
    refusing: AtomicBool,
    dials: AtomicUsize,
}

/// Dialer half of an in-memory transport.
///
/// Cloning shares the same server.
#[derive(Clone, Debug)]
pub struct MemoryDialer {
    shared: Arc<Shared>,
}

/// Accepting half of an in-memory transport.
#[derive(Debug)]
pub struct MemoryServer {
    incoming: UnboundedReceiver<MemoryPeer>,
}

/// Server-side end of one in-memory link.
#[derive(Debug)]
pub struct MemoryPeer {
    url: String,
    from_client: UnboundedReceiver<String>,
    to_client: UnboundedSender<Result<String, TransportError>>,
}

/// Create a connected dialer/server pair.
///
/// # Examples
///
/// ```
/// use muxframe::transport::{Dialer, memory_transport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), muxframe::transport::TransportError> {
/// let (dialer, mut server) = memory_transport();
/// let _link = dialer.dial("memory://chat").await?;
/// let peer = server.accept().await.expect("dialled peer");
/// assert_eq!(peer.url(), "memory://chat");
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn memory_transport() -> (MemoryDialer, MemoryServer) {
    let (accept, incoming) = unbounded();
    let dialer = MemoryDialer {
        shared: Arc::new(Shared {
            accept,
            refusing: AtomicBool::new(false),
            dials: AtomicUsize::new(0),
        }),
    };
    (dialer, MemoryServer { incoming })
}

impl MemoryDialer {
    /// Make subsequent dials fail with [`TransportError::Refused`].
    pub fn set_refusing(&self, refusing: bool) {
        self.shared.refusing.store(refusing, Ordering::SeqCst);
    }

    /// Number of dial attempts so far, including refused ones.
    #[must_use]
    pub fn dial_count(&self) -> usize { self.shared.dials.load(Ordering::SeqCst) }
}

#[async_trait]
impl Dialer for MemoryDialer {
    async fn dial(&self, url: &str) -> Result<Link, TransportError> {
        self.shared.dials.fetch_add(1, Ordering::SeqCst);
        if self.shared.refusing.load(Ordering::SeqCst) {
            return Err(TransportError::Refused(url.to_owned()));
        }

        let (client_tx, from_client) = unbounded();
        let (to_client, client_rx) = unbounded();
        let peer = MemoryPeer {
            url: url.to_owned(),
            from_client,
            to_client,
        };
        self.shared
            .accept
            .unbounded_send(peer)
            .map_err(|_| TransportError::Refused(url.to_owned()))?;
        debug!(url, "memory link established");

        let sink = client_tx.sink_map_err(|_| TransportError::Closed);
        Ok(Link::new(sink, client_rx))
    }
}

impl MemoryServer {
    /// Wait for the next dialled link.
    ///
    /// Returns `None` once every dialer has been dropped.
    pub async fn accept(&mut self) -> Option<MemoryPeer> { self.incoming.next().await }
}

impl MemoryPeer {
    /// URL the client dialled.
    #[must_use]
    pub fn url(&self) -> &str { &self.url }

    /// Next frame written by the client, or `None` once the client closed its
    /// side.
    pub async fn recv(&mut self) -> Option<String> { self.from_client.next().await }

    /// Deliver a text frame to the client.
    ///
    /// Returns `false` when the client side is gone.
    pub fn send(&self, frame: impl Into<String>) -> bool {
        self.to_client.unbounded_send(Ok(frame.into())).is_ok()
    }

    /// Deliver a transport error to the client without closing the link.
    pub fn send_error(&self, error: TransportError) -> bool {
        self.to_client.unbounded_send(Err(error)).is_ok()
    }

    /// Close the link from the server side.
    ///
    /// The client observes the end of its inbound stream; later writes on
    /// either side fail.
    pub fn close(&mut self) {
        self.to_client.close_channel();
        self.from_client.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_flow_in_both_directions() {
        let (dialer, mut server) = memory_transport();
        let mut link = dialer.dial("memory://test").await.expect("dial");
        let mut peer = server.accept().await.expect("accept");

        link.sink.send("ping".to_owned()).await.expect("client send");
        assert_eq!(peer.recv().await.as_deref(), Some("ping"));

        assert!(peer.send("pong"));
        let frame = link.source.next().await.expect("frame").expect("ok frame");
        assert_eq!(frame, "pong");
    }

    #[tokio::test]
    async fn closing_the_peer_ends_the_client_stream() {
        let (dialer, mut server) = memory_transport();
        let mut link = dialer.dial("memory://test").await.expect("dial");
        let mut peer = server.accept().await.expect("accept");

        peer.close();
        assert!(!peer.send("after close"));
        assert!(link.source.next().await.is_none());
        assert!(matches!(
            link.sink.send("late".to_owned()).await,
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn refusing_dialer_counts_attempts() {
        let (dialer, _server) = memory_transport();
        dialer.set_refusing(true);
        assert!(matches!(
            dialer.dial("memory://test").await,
            Err(TransportError::Refused(url)) if url == "memory://test"
        ));
        dialer.set_refusing(false);
        assert!(dialer.dial("memory://test").await.is_ok());
        assert_eq!(dialer.dial_count(), 2);
    }

    #[tokio::test]
    async fn dropped_server_refuses_dials() {
        let (dialer, server) = memory_transport();
        drop(server);
        assert!(matches!(
            dialer.dial("memory://gone").await,
            Err(TransportError::Refused(_))
        ));
    }
}
