//! Client handle for a multiplexed connection.

use std::{fmt, sync::Arc};

use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use super::{
    ClientBuilder,
    ClientError,
    ConnectionState,
    Subscription,
    actor::{Command, Outgoing},
};
use crate::{
    correlation::{CorrelationCounter, RequestId},
    envelope::encode,
    registry::ResponseHandler,
    request::{Mode, Request},
    response::Response,
};

struct ClientInner {
    commands: mpsc::UnboundedSender<Command>,
    counter: CorrelationCounter,
    state: watch::Receiver<ConnectionState>,
    tracking_id: String,
}

/// Handle to one multiplexed connection.
///
/// Cloning the handle shares the connection. The connection actor keeps
/// reconnecting on its health-check interval until [`close`](Self::close) is
/// called or every handle is dropped.
///
/// Every request gets a fresh id from a counter that starts at `"0"` and is
/// never reset, so ids stay unique across reconnects. Requests sent while the
/// connection is not open are not queued: their handler immediately receives
/// the synthetic connection-loss response.
///
/// # Examples
///
/// ```no_run
/// use muxframe::{client::Client, request::Request, transport::WebSocketDialer};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder("http://127.0.0.1:8080/ws").open(WebSocketDialer);
/// client.opened().await?;
/// let response = client.call(Request::get("/v1/rooms")).await?;
/// let rooms: Vec<String> = response.json()?;
/// println!("rooms: {rooms:?}");
/// client.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("tracking_id", &self.inner.tracking_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Start building a client for `url`.
    ///
    /// # Examples
    ///
    /// ```
    /// use muxframe::client::Client;
    ///
    /// let builder = Client::builder("ws://127.0.0.1:8080/ws").tracking_id("cli-1");
    /// assert_eq!(builder.config().tracking_id(), "cli-1");
    /// ```
    #[must_use]
    pub fn builder(url: impl Into<String>) -> ClientBuilder { ClientBuilder::new(url) }

    pub(crate) fn new(
        commands: mpsc::UnboundedSender<Command>,
        state: watch::Receiver<ConnectionState>,
        tracking_id: String,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                commands,
                counter: CorrelationCounter::new(),
                state,
                tracking_id,
            }),
        }
    }

    fn submit(
        &self,
        request: Request,
        handler: Option<ResponseHandler>,
    ) -> Result<RequestId, ClientError> {
        let id = self.inner.counter.next_id();
        let frame = encode(&request, &id).map_err(ClientError::Encode)?;
        let outgoing = Outgoing {
            id: id.clone(),
            frame,
            mode: request.mode().clone(),
            handler,
        };
        self.inner
            .commands
            .send(Command::Send(outgoing))
            .map_err(|_| ClientError::Shutdown)?;
        Ok(id)
    }

    /// Send `request` without a handler.
    ///
    /// Any reply is dropped as a dispatch miss. Returns the assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Shutdown`] once the client has stopped, or
    /// [`ClientError::Encode`] if the header cannot be serialised.
    pub fn send(&self, request: impl Into<Request>) -> Result<RequestId, ClientError> {
        self.submit(request.into(), None)
    }

    /// Send `request` and deliver every response for its id to `handler`.
    ///
    /// A one-shot request's handler runs once. A request built with
    /// [`subscribe`](crate::request::RequestBuilder::subscribe) keeps its
    /// handler until a local unsubscribe or a connection loss; the loss is
    /// always delivered as a final synthetic 503 response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Shutdown`] once the client has stopped, or
    /// [`ClientError::Encode`] if the header cannot be serialised.
    pub fn send_with<F>(
        &self,
        request: impl Into<Request>,
        handler: F,
    ) -> Result<RequestId, ClientError>
    where
        F: FnMut(Response) + Send + 'static,
    {
        self.submit(request.into(), Some(Box::new(handler)))
    }

    /// Send a one-shot request and wait for its single response.
    ///
    /// The future never times out on its own: it resolves with the peer's
    /// reply or with the synthetic connection-loss response. A subscribe
    /// marker on `request` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Shutdown`] if the client stops before the
    /// request is handled, or [`ClientError::Encode`] if the header cannot be
    /// serialised.
    pub async fn call(&self, request: impl Into<Request>) -> Result<Response, ClientError> {
        let mut request = request.into();
        if request.is_subscribe() {
            request.set_mode(Mode::OneShot);
        }
        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        self.submit(
            request,
            Some(Box::new(move |response: Response| {
                if let Some(tx) = tx.take() {
                    let _ = tx.send(response);
                }
            })),
        )?;
        rx.await.map_err(|_| ClientError::Shutdown)
    }

    /// Open a standing subscription and stream its events.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Shutdown`] once the client has stopped, or
    /// [`ClientError::Encode`] if the header cannot be serialised.
    pub fn subscribe(&self, request: impl Into<Request>) -> Result<Subscription, ClientError> {
        let mut request = request.into();
        request.set_mode(Mode::Subscribe);
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.submit(
            request,
            Some(Box::new(move |response: Response| {
                if let Err(mpsc::error::SendError(response)) = tx.send(response) {
                    debug!(id = %response.id(), "subscription stream dropped; discarding event");
                }
            })),
        )?;
        Ok(Subscription::new(id, rx))
    }

    /// Send `request` as the cancellation of the subscription `prior`.
    ///
    /// The local registry entry for `prior` is dropped when the request is
    /// processed, whether or not the peer acknowledges it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Shutdown`] once the client has stopped, or
    /// [`ClientError::Encode`] if the header cannot be serialised.
    pub fn unsubscribe(
        &self,
        request: impl Into<Request>,
        prior: &RequestId,
    ) -> Result<RequestId, ClientError> {
        let mut request = request.into();
        request.set_mode(Mode::Unsubscribe(prior.clone()));
        let prior = prior.clone();
        self.submit(
            request,
            Some(Box::new(move |response: Response| {
                debug!(%prior, code = ?response.code(), "unsubscribe acknowledged");
            })),
        )
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState { *self.inner.state.borrow() }

    /// Receiver observing every state transition.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> { self.inner.state.clone() }

    /// Wait until the connection is open.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Shutdown`] if the client stops first.
    pub async fn opened(&self) -> Result<(), ClientError> {
        let mut state = self.inner.state.clone();
        state
            .wait_for(|state| state.is_open())
            .await
            .map(|_| ())
            .map_err(|_| ClientError::Shutdown)
    }

    /// Tracking id sent with every connection attempt.
    #[must_use]
    pub fn tracking_id(&self) -> &str { &self.inner.tracking_id }

    /// Close the connection and stop the client.
    ///
    /// The health check stops, outstanding handlers receive the synthetic
    /// connection-loss response and the `on_close` hook runs if the
    /// connection was open. Later sends fail with [`ClientError::Shutdown`].
    /// Closing an already stopped client does nothing.
    pub async fn close(&self) {
        let (ack, done) = oneshot::channel();
        if self.inner.commands.send(Command::Close(ack)).is_ok() {
            let _ = done.await;
        }
    }
}
