//! Opening the connection from a `ClientBuilder`.

use tokio::sync::{mpsc, watch};
use tracing::Instrument;

use super::ClientBuilder;
use crate::{
    client::{
        Client,
        ConnectionState,
        actor::{ActorOptions, ConnectionActor},
    },
    transport::Dialer,
};

impl ClientBuilder {
    /// Spawn the connection actor and start dialling through `dialer`.
    ///
    /// Returns immediately, before the first dial completes; await
    /// [`Client::opened`] before sending. A failed dial is reported through
    /// `on_error` and retried on the health-check interval. The actor logs
    /// inside the span that is current when `open` is called.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    ///
    /// # Examples
    ///
    /// ```
    /// use muxframe::{client::ClientBuilder, transport::memory_transport};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), muxframe::client::ClientError> {
    /// let (dialer, mut server) = memory_transport();
    /// let client = ClientBuilder::new("memory://chat").open(dialer);
    /// let _peer = server.accept().await.expect("client dialled");
    /// client.opened().await?;
    /// client.close().await;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open<D: Dialer>(self, dialer: D) -> Client {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let tracking_id = self.config.tracking_id().to_owned();
        let options = ActorOptions {
            config: self.config,
            lifecycle_hooks: self.lifecycle_hooks,
            frame_hooks: self.frame_hooks,
            tracing_config: self.tracing_config,
        };
        let actor = ConnectionActor::new(dialer, options, commands_rx, state_tx);
        tokio::spawn(actor.run().in_current_span());
        Client::new(commands_tx, state_rx, tracking_id)
    }
}
