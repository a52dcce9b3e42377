//! lcdproc-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/` and
//! the binary entry point in `main.rs` share the same module tree.
//!
//! # What does lcdproc-client do?
//!
//! LCDd (the LCDproc server) owns a character-matrix LCD display and rotates
//! through *screens* registered by connected clients.  This crate is the
//! client side: it opens the TCP control channel, completes the
//! `hello`/`connect`/`client_set` handshake, and then exposes a typed object
//! model over the imperative wire commands:
//!
//! 1. [`connection::LcdClient`] owns the transport and the handshake state
//!    machine, and delivers server notifications on an event channel.
//! 2. [`screen::Screen`] handles one registered canvas: configuration,
//!    widget factories, deletion.
//! 3. [`widget::Widget`] handles one positioned display primitive: full
//!    parameter sets and partial updates that reuse cached positions.
//!
//! Every mutating call serializes exactly one command and writes it to the
//! transport before returning, so wire order equals call order.

/// Connection/handshake state machine and the event channel.
pub mod connection;

/// Client configuration (TOML persisted).
pub mod config;

/// Error taxonomy for all client operations.
pub mod error;

/// Screen handles: one registered canvas on the server.
pub mod screen;

/// Widget handles: positioned display primitives on a screen.
pub mod widget;

pub use config::ClientConfig;
pub use connection::{ClientEvent, ConnectionState, LcdClient};
pub use error::ClientError;
pub use screen::Screen;
pub use widget::Widget;
