//! Unit tests for the muxframe client runtime.

mod handshake;
mod helpers;
mod lifecycle;
mod tracing;
