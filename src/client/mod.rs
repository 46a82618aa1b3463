//! Client for a multiplexed connection.
//!
//! A [`Client`] owns one duplex text transport and multiplexes request/response
//! calls and standing subscriptions over it. Every frame is correlated by a
//! request id. All connection state lives in a single actor task that
//! reconnects on a health-check interval and fails every outstanding handler
//! with a synthetic connection-loss response whenever the transport closes.
//!
//! Lifecycle hooks (`on_open`, `on_close`, `on_error`) fire at connection
//! boundaries, and frame hooks see every outgoing and incoming frame.

mod actor;
mod builder;
mod config;
mod error;
mod handshake;
mod hooks;
mod runtime;
mod state;
mod subscription;
mod tracing_config;
mod tracing_helpers;

pub use builder::ClientBuilder;
pub use config::{ClientConfig, DEFAULT_HEALTH_CHECK_INTERVAL, DEFAULT_TRACKING_PARAM};
pub use error::ClientError;
pub use handshake::HandshakeResponse;
pub use hooks::{
    AfterReceiveHook,
    BeforeSendHook,
    ClientCloseHandler,
    ClientErrorHandler,
    ClientOpenHandler,
};
pub use runtime::Client;
pub use state::ConnectionState;
pub use subscription::Subscription;
pub use tracing_config::TracingConfig;

#[cfg(test)]
mod tests;
