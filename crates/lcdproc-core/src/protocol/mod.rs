//! Protocol module containing message types, the line codec, and framing.

pub mod codec;
pub mod framing;
pub mod messages;

pub use codec::{encode_command, flatten, parse_line, quote, ProtocolError};
pub use framing::LineReader;
pub use messages::*;
