//! Fixed-size packet framing for hardware signing token messages.
//!
//! A logical message is a `(kind, payload)` pair carried as a stream of
//! 64-byte packets. The stream starts with a 9-byte header:
//! - 2 magic bytes (`##`)
//! - a 2-byte big-endian message kind
//! - a 4-byte big-endian payload length
//! - a terminator byte (`0x0A`)
//!
//! Each packet carries one 63-byte chunk of that stream behind a marker byte.
//! Callers deal in whole messages; splitting and reassembly happen here.

pub mod codec;
pub mod error;
pub mod kind;
pub mod reader;
pub mod writer;

pub use codec::{
    encode_message, packet_count, FrameConfig, Message, MessageDecoder, CHUNK_SIZE,
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE, MAGIC, MARKER, TERMINATOR,
};
pub use error::{FrameError, Result};
pub use kind::kind_name;
pub use reader::PacketReader;
pub use writer::PacketWriter;
