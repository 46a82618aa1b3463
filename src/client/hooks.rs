//! Client connection lifecycle and frame hooks.
//!
//! Lifecycle hooks fire at connection boundaries (open, close, error) on the
//! connection actor. Frame hooks fire on every outgoing frame after encoding
//! and on every incoming frame before decoding.

use std::sync::Arc;

use futures::future::BoxFuture;

use super::ClientError;

/// Handler invoked each time the connection reaches
/// [`ConnectionState::Open`](super::ConnectionState::Open).
///
/// Lifecycle hooks are awaited on the connection actor. Inside a hook only
/// the non-blocking [`Client::send`](super::Client::send),
/// [`Client::send_with`](super::Client::send_with) and
/// [`Client::subscribe`](super::Client::subscribe) are safe; awaiting
/// [`Client::call`](super::Client::call) or
/// [`Client::opened`](super::Client::opened) deadlocks the actor, so spawn
/// such work instead.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use muxframe::client::ClientOpenHandler;
///
/// let on_open: ClientOpenHandler = Arc::new(|| Box::pin(async { println!("connected") }));
/// ```
pub type ClientOpenHandler = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Handler invoked after an open connection closes.
///
/// Runs after every outstanding handler has received its connection-loss
/// response, so subscriptions can be re-established from here with
/// [`Client::subscribe`](super::Client::subscribe). The same restrictions as
/// [`ClientOpenHandler`] apply: never await a response inside the hook.
pub type ClientCloseHandler = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Handler invoked when the client encounters an error.
///
/// Errors are informational and never change the connection state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use muxframe::client::ClientErrorHandler;
///
/// let on_error: ClientErrorHandler = Arc::new(|err| {
///     Box::pin(async move {
///         eprintln!("client error: {err}");
///     })
/// });
/// ```
pub type ClientErrorHandler =
    Arc<dyn for<'a> Fn(&'a ClientError) -> BoxFuture<'a, ()> + Send + Sync>;

#[expect(
    clippy::struct_field_names,
    reason = "on_ prefix is idiomatic for callback fields"
)]
#[derive(Clone, Default)]
pub(crate) struct LifecycleHooks {
    pub(crate) on_open: Option<ClientOpenHandler>,
    pub(crate) on_close: Option<ClientCloseHandler>,
    pub(crate) on_error: Option<ClientErrorHandler>,
}

impl LifecycleHooks {
    pub(crate) async fn opened(&self) {
        if let Some(handler) = &self.on_open {
            handler().await;
        }
    }

    pub(crate) async fn closed(&self) {
        if let Some(handler) = &self.on_close {
            handler().await;
        }
    }

    pub(crate) async fn error(&self, error: &ClientError) {
        if let Some(handler) = &self.on_error {
            handler(error).await;
        }
    }
}

/// Hook invoked after encoding, before a frame is written to the transport.
///
/// # Examples
///
/// ```
/// use std::sync::{
///     Arc,
///     atomic::{AtomicUsize, Ordering},
/// };
///
/// use muxframe::client::BeforeSendHook;
///
/// let counter = Arc::new(AtomicUsize::new(0));
/// let count = counter.clone();
/// let hook: BeforeSendHook = Arc::new(move |_frame: &mut String| {
///     count.fetch_add(1, Ordering::Relaxed);
/// });
/// ```
pub type BeforeSendHook = Arc<dyn Fn(&mut String) + Send + Sync>;

/// Hook invoked after a frame is read from the transport, before it is
/// split and decoded.
pub type AfterReceiveHook = Arc<dyn Fn(&mut String) + Send + Sync>;

/// Hooks run on every frame, in registration order.
#[derive(Clone, Default)]
pub(crate) struct FrameHooks {
    pub(crate) before_send: Vec<BeforeSendHook>,
    pub(crate) after_receive: Vec<AfterReceiveHook>,
}

impl FrameHooks {
    pub(crate) fn outgoing(&self, frame: &mut String) {
        for hook in &self.before_send {
            hook(frame);
        }
    }

    pub(crate) fn incoming(&self, frame: &mut String) {
        for hook in &self.after_receive {
            hook(frame);
        }
    }
}
