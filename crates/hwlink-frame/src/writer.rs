use hwlink_transport::Transport;
use tracing::trace;

use crate::codec::{encode_message, FrameConfig, Message};
use crate::error::{FrameError, Result};

/// Writes complete messages to any packet [`Transport`].
pub struct PacketWriter<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Transport> PacketWriter<T> {
    /// Create a new packet writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new packet writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Write a complete message (blocking).
    pub fn write_message(&mut self, message: &Message) -> Result<usize> {
        self.send(message.kind, message.payload.as_ref())
    }

    /// Encode a payload and write its packets in order.
    ///
    /// Returns the number of packets written.
    pub fn send(&mut self, kind: u16, payload: &[u8]) -> Result<usize> {
        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        let packets = encode_message(kind, payload)?;
        for packet in &packets {
            self.inner.write_packet(packet)?;
        }
        trace!(kind, packets = packets.len(), "message written");

        Ok(packets.len())
    }
}

#[cfg(test)]
mod tests {
    use hwlink_transport::{MemoryTransport, TransportError};

    use super::*;
    use crate::codec::{MessageDecoder, MARKER};

    fn decode(packets: &[hwlink_transport::Packet]) -> Vec<Message> {
        let mut decoder = MessageDecoder::default();
        packets
            .iter()
            .filter_map(|p| decoder.feed(p).unwrap())
            .collect()
    }

    #[test]
    fn write_single_message() {
        let mut transport = MemoryTransport::default();
        assert_eq!(PacketWriter::new(&mut transport).send(55, b"").unwrap(), 1);

        let messages = decode(&transport.outbound);
        assert_eq!(messages, vec![Message::new(55, &b""[..])]);
    }

    #[test]
    fn write_multiple_messages_in_order() {
        let mut transport = MemoryTransport::default();
        let mut writer = PacketWriter::new(&mut transport);

        writer.send(19, b"1234").unwrap();
        writer.send(27, b"").unwrap();
        writer.write_message(&Message::new(47, &b"abandon"[..])).unwrap();

        let messages = decode(&transport.outbound);
        let kinds: Vec<u16> = messages.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![19, 27, 47]);
        assert_eq!(messages[2].payload.as_ref(), b"abandon");
    }

    #[test]
    fn large_message_spans_packets() {
        let mut transport = MemoryTransport::default();
        let payload = vec![0x11; 1000];

        let written = PacketWriter::new(&mut transport).send(7, &payload).unwrap();
        let outbound = &transport.outbound;
        assert_eq!(written, outbound.len());
        assert_eq!(written, 17);
        assert!(outbound.iter().all(|p| p[0] == MARKER));
    }

    #[test]
    fn payload_too_large_rejected() {
        let cfg = FrameConfig {
            max_payload_size: 4,
        };
        let mut transport = MemoryTransport::default();

        let err = PacketWriter::with_config(&mut transport, cfg)
            .send(1, b"oversized")
            .unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 9, max: 4 }));
        assert!(transport.outbound.is_empty());
    }

    #[test]
    fn closed_transport_propagates() {
        let mut transport = MemoryTransport::default();
        hwlink_transport::Transport::close(&mut transport).unwrap();
        let mut writer = PacketWriter::new(transport);

        let err = writer.send(1, b"x").unwrap_err();
        assert!(matches!(err, FrameError::Transport(TransportError::Closed)));
    }
}
