//! Optional convenience imports for common muxframe workflows.
//!
//! This module is intentionally small and focused on high-frequency types.
//! Prefer importing specialised APIs directly from their owning modules.
//!
//! # Examples
//!
//! ```rust,no_run
//! use muxframe::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), ClientError> {
//! let client = Client::builder("ws://127.0.0.1:8080/ws").open(WebSocketDialer);
//! client.opened().await?;
//! let response: Response = client.call(Request::get("/v1/rooms")).await?;
//! println!("{:?}", response.code());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "websocket")]
pub use crate::transport::WebSocketDialer;
pub use crate::{
    client::{Client, ClientBuilder, ClientError, ConnectionState, Subscription},
    correlation::RequestId,
    request::{Request, RequestBuilder},
    response::{Response, ResponseKind},
    transport::{Dialer, memory_transport},
};
