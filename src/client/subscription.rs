//! Stream of events for a standing subscription.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;
use tokio::sync::mpsc;

use crate::{correlation::RequestId, response::Response};

/// Events delivered for one standing subscription id.
///
/// Created by [`Client::subscribe`](super::Client::subscribe). Each item is a
/// [`Response`] of kind [`Event`](crate::response::ResponseKind::Event). When
/// the connection is lost the stream yields one final
/// [`ConnectionLost`](crate::response::ResponseKind::ConnectionLost) response
/// and then ends. It also ends after a local unsubscribe of its id.
///
/// Subscriptions are not re-established after a reconnect; subscribe again
/// from the `on_close` or `on_open` hook, or when the stream ends.
///
/// Dropping the stream does not cancel the subscription. Its registry entry
/// stays until [`Client::unsubscribe`](super::Client::unsubscribe) or the
/// next connection loss, and events arriving meanwhile are discarded.
///
/// # Examples
///
/// ```no_run
/// use futures::StreamExt;
/// use muxframe::{client::Client, request::Request, transport::WebSocketDialer};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), muxframe::client::ClientError> {
/// let client = Client::builder("ws://127.0.0.1:8080/ws").open(WebSocketDialer);
/// client.opened().await?;
/// let request = Request::get("/v1/subscribe/{name}/{room}")
///     .path_param("name", "alice")
///     .path_param("room", "general")
///     .build();
/// let mut events = client.subscribe(request)?;
/// while let Some(event) = events.next().await {
///     println!("{:?}: {}", event.event_kind(), event.body());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Subscription {
    id: RequestId,
    events: mpsc::UnboundedReceiver<Response>,
}

impl Subscription {
    pub(crate) fn new(id: RequestId, events: mpsc::UnboundedReceiver<Response>) -> Self {
        Self { id, events }
    }

    /// Request id the subscription was registered under.
    ///
    /// Pass it to [`Client::unsubscribe`](super::Client::unsubscribe) to cancel.
    #[must_use]
    pub fn id(&self) -> &RequestId { &self.id }
}

impl Stream for Subscription {
    type Item = Response;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().events.poll_recv(cx)
    }
}
