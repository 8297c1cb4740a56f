use hwlink_transport::Transport;
use tracing::trace;

use crate::codec::{FrameConfig, Message, MessageDecoder};
use crate::error::Result;

/// Reads complete messages from any packet [`Transport`].
///
/// Handles reassembly internally; callers always get complete messages.
pub struct PacketReader<T> {
    inner: T,
    decoder: MessageDecoder,
}

impl<T: Transport> PacketReader<T> {
    /// Create a new packet reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new packet reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            decoder: MessageDecoder::new(config.max_payload_size),
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// Packets are read strictly one at a time. On any error the partially
    /// received message is discarded; it cannot be resumed.
    pub fn read_message(&mut self) -> Result<Message> {
        let mut packets = 0usize;
        loop {
            let packet = match self.inner.read_packet() {
                Ok(packet) => packet,
                Err(err) => {
                    self.decoder.reset();
                    return Err(err.into());
                }
            };
            packets += 1;

            if let Some(message) = self.decoder.feed(&packet)? {
                trace!(kind = message.kind, packets, "message reassembled");
                return Ok(message);
            }
        }
    }
}
