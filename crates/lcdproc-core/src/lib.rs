//! # lcdproc-core
//!
//! Shared library for the LCDproc client containing the control-protocol
//! vocabulary, the line codec, inbound framing, and the screen/widget
//! identifier model.
//!
//! This crate is pure: it has zero dependencies on sockets, timers, or OS
//! APIs.  The `lcdproc-client` crate layers the actual TCP connection and
//! object model on top of it.
//!
//! # Protocol overview
//!
//! LCDd (the LCDproc display server) speaks a line-oriented UTF-8 text
//! protocol over TCP (default port 13666).  A client opens a connection,
//! sends `hello`, and receives a greeting line describing the display
//! geometry:
//!
//! ```text
//! C→S: hello
//! S→C: connect LCDproc 0.5.7 protocol 0.3 ... wid 20 hgt 4 cellwid 5 cellhgt 8
//! C→S: client_set -name {my client}
//! ```
//!
//! After that the client registers *screens* (canvases the server rotates
//! through) and *widgets* (positioned display primitives on a screen) with
//! imperative commands such as `screen_add`, `widget_set`, and `widget_del`.
//! The server sends unsolicited notifications: `listen <id>` when a screen
//! becomes visible, `ignore <id>` when it is hidden, `success` as a plain
//! acknowledgement, and `huh? ...` as a negative acknowledgement.
//!
//! String values that may contain whitespace are brace-quoted `{like this}`.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `lcdproc_core::Command` instead of `lcdproc_core::protocol::messages::Command`.
pub use domain::ids::{ScreenId, WidgetId};
pub use protocol::codec::{encode_command, flatten, parse_line, quote, ProtocolError};
pub use protocol::framing::LineReader;
pub use protocol::messages::{
    Backlight, Capabilities, CellArea, Command, CursorStyle, Heartbeat, Param, Priority,
    ScreenOption, ServerMessage, WidgetKind, DEFAULT_PORT,
};
