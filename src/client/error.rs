//! Error types for muxframe client operations.

use crate::transport::TransportError;

/// Errors emitted by [`crate::client::Client`] and passed to the `on_error`
/// hook.
///
/// Failures of in-flight requests are never reported here: they reach the
/// request's handler as a synthetic connection-loss
/// [`Response`](crate::response::Response).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Dialling, reading or writing the transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// Failed to serialize an outbound request header.
    #[error("failed to encode request")]
    Encode(#[source] serde_json::Error),
    /// The peer answered the version handshake with an error.
    #[error("handshake rejected: {0}")]
    Handshake(String),
    /// The first frame after the handshake request was not a handshake
    /// response.
    #[error("invalid handshake response")]
    HandshakeResponse(#[source] serde_json::Error),
    /// The connection actor has stopped; the client was closed or every handle
    /// was dropped.
    #[error("client has shut down")]
    Shutdown,
}
