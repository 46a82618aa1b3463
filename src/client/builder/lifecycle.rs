//! Lifecycle hook methods for `ClientBuilder`.

use std::{future::Future, sync::Arc};

use super::ClientBuilder;
use crate::client::ClientError;

impl ClientBuilder {
    /// Register a callback invoked every time the connection opens.
    ///
    /// With a handshake configured, the callback runs after the peer accepts
    /// it.
    ///
    /// # Examples
    ///
    /// ```
    /// use muxframe::client::ClientBuilder;
    ///
    /// let builder = ClientBuilder::new("ws://127.0.0.1:8080/ws").on_open(|| async {
    ///     println!("connected");
    /// });
    /// let _ = builder;
    /// ```
    #[must_use]
    pub fn on_open<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.lifecycle_hooks.on_open = Some(Arc::new(move || Box::pin(f())));
        self
    }

    /// Register a callback invoked after an open connection closes.
    ///
    /// By the time it runs every outstanding handler has received its
    /// connection-loss response, so it is the place to replay subscriptions.
    #[must_use]
    pub fn on_close<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.lifecycle_hooks.on_close = Some(Arc::new(move || Box::pin(f())));
        self
    }

    /// Register a callback invoked when an error occurs.
    ///
    /// Errors are informational: the connection state does not change.
    ///
    /// # Examples
    ///
    /// ```
    /// use muxframe::client::ClientBuilder;
    ///
    /// let builder = ClientBuilder::new("ws://127.0.0.1:8080/ws").on_error(|err| {
    ///     let message = err.to_string();
    ///     async move {
    ///         eprintln!("client error: {message}");
    ///     }
    /// });
    /// let _ = builder;
    /// ```
    #[must_use]
    pub fn on_error<F, Fut>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&'a ClientError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.lifecycle_hooks.on_error = Some(Arc::new(move |e| Box::pin(f(e))));
        self
    }
}
