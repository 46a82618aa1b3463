//! Frame hook methods for `ClientBuilder`.

use std::sync::Arc;

use super::ClientBuilder;

impl ClientBuilder {
    /// Register a hook invoked after encoding, before each request frame is
    /// written.
    ///
    /// Multiple hooks may be registered; they execute in registration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::{
    ///     Arc,
    ///     atomic::{AtomicUsize, Ordering},
    /// };
    ///
    /// use muxframe::client::ClientBuilder;
    ///
    /// let counter = Arc::new(AtomicUsize::new(0));
    /// let count = counter.clone();
    /// let builder = ClientBuilder::new("ws://127.0.0.1:8080/ws").before_send(
    ///     move |_frame: &mut String| {
    ///         count.fetch_add(1, Ordering::Relaxed);
    ///     },
    /// );
    /// let _ = builder;
    /// ```
    #[must_use]
    pub fn before_send<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut String) + Send + Sync + 'static,
    {
        self.frame_hooks.before_send.push(Arc::new(f));
        self
    }

    /// Register a hook invoked after each frame is read, before it is split
    /// and decoded.
    ///
    /// Multiple hooks may be registered; they execute in registration order.
    #[must_use]
    pub fn after_receive<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut String) + Send + Sync + 'static,
    {
        self.frame_hooks.after_receive.push(Arc::new(f));
        self
    }
}
