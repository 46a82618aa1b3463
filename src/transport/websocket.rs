//! WebSocket client transport built on `tokio-tungstenite`.
//!
//! Text messages pass through unchanged. Binary messages are accepted when
//! they hold valid UTF-8; anything else surfaces as
//! [`TransportError::InvalidFrame`]. Ping, pong and close control messages are
//! handled by the library and never reach the client.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt, future};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::debug;

use super::{Dialer, Link, TransportError};

/// Dialer opening `ws://` and `wss://` connections.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebSocketDialer;

fn into_text(message: Message) -> Option<Result<String, TransportError>> {
    match message {
        Message::Text(text) => Some(Ok(text.as_str().to_owned())),
        Message::Binary(data) => Some(
            String::from_utf8(data.to_vec())
                .map_err(|error| TransportError::InvalidFrame(error.to_string())),
        ),
        _ => None,
    }
}

#[async_trait]
impl Dialer for WebSocketDialer {
    async fn dial(&self, url: &str) -> Result<Link, TransportError> {
        let (socket, response) = connect_async(url).await.map_err(TransportError::other)?;
        debug!(url, status = %response.status(), "websocket handshake complete");

        let (sink, stream) = socket.split();
        let sink = sink
            .sink_map_err(TransportError::other)
            .with(|text: String| future::ready(Ok::<_, TransportError>(Message::text(text))));
        let source = stream.filter_map(|item| {
            future::ready(match item {
                Ok(message) => into_text(message),
                Err(error) => Some(Err(TransportError::other(error))),
            })
        });
        Ok(Link::new(sink, source))
    }
}
