use bytes::{BufMut, Bytes, BytesMut};
use hwlink_transport::{Packet, PACKET_SIZE};

use crate::error::{FrameError, Result};

/// Link-layer marker in byte 0 of every packet: the chunk size (63, `?`).
pub const MARKER: u8 = 0x3F;

/// Bytes of message stream carried by one packet.
pub const CHUNK_SIZE: usize = PACKET_SIZE - 1;

/// Message header: magic (2) + kind (2) + length (4) + terminator (1) = 9 bytes.
pub const HEADER_SIZE: usize = 9;

/// Magic bytes: "##" (0x23 0x23).
pub const MAGIC: [u8; 2] = [0x23, 0x23];

/// Header terminator byte.
pub const TERMINATOR: u8 = 0x0A;

/// Payload bytes carried by the first packet of a message.
pub const FIRST_CHUNK_PAYLOAD: usize = CHUNK_SIZE - HEADER_SIZE;

/// Default maximum payload size accepted by the decoder: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// A complete message exchanged with the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Schema-assigned message kind.
    pub kind: u16,
    /// Opaque serialized payload.
    pub payload: Bytes,
}

impl Message {
    /// Create a new message.
    pub fn new(kind: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Number of packets this message occupies on the wire.
    pub fn packet_count(&self) -> usize {
        packet_count(self.payload.len())
    }
}

/// Number of packets needed for a payload of `payload_len` bytes.
pub fn packet_count(payload_len: usize) -> usize {
    (HEADER_SIZE + payload_len).div_ceil(CHUNK_SIZE)
}

fn checked_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| FrameError::PayloadTooLarge {
        size: len,
        max: u32::MAX as usize,
    })
}

/// Encode a message into its packet sequence.
///
/// Wire format of the message stream, split over 63-byte chunks:
/// ```text
/// ┌────────────┬──────────┬───────────┬────────────┬─────────────────┐
/// │ Magic (2B) │ Kind     │ Length    │ Term (1B)  │ Payload          │
/// │ 0x23 0x23  │ (2B BE)  │ (4B BE)   │ 0x0A       │ (Length bytes)   │
/// └────────────┴──────────┴───────────┴────────────┴─────────────────┘
/// ```
/// Every packet is `[0x3F, chunk..., zero padding]`.
pub fn encode_message(kind: u16, payload: &[u8]) -> Result<Vec<Packet>> {
    let len = checked_len(payload.len())?;

    let mut stream = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    stream.put_slice(&MAGIC);
    stream.put_u16(kind);
    stream.put_u32(len);
    stream.put_u8(TERMINATOR);
    stream.put_slice(payload);

    Ok(stream
        .chunks(CHUNK_SIZE)
        .map(|chunk| {
            let mut packet = [0u8; PACKET_SIZE];
            packet[0] = MARKER;
            packet[1..=chunk.len()].copy_from_slice(chunk);
            packet
        })
        .collect())
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

#[derive(Debug)]
struct Accumulator {
    kind: u16,
    declared_len: usize,
    bytes_remaining: i64,
    buffer: BytesMut,
}

/// Reassembles packets into messages.
///
/// Feed packets in wire order. The decoder holds at most one partially
/// received message; any error discards it.
#[derive(Debug)]
pub struct MessageDecoder {
    max_payload: usize,
    state: Option<Accumulator>,
}

impl Default for MessageDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD)
    }
}

impl MessageDecoder {
    /// Create a decoder accepting payloads up to `max_payload` bytes.
    pub fn new(max_payload: usize) -> Self {
        Self {
            max_payload,
            state: None,
        }
    }

    /// Feed one packet.
    ///
    /// Returns `Ok(Some(message))` when the packet completes a message and
    /// `Ok(None)` when more packets are required.
    pub fn feed(&mut self, packet: &Packet) -> Result<Option<Message>> {
        let result = self.feed_inner(packet);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn feed_inner(&mut self, packet: &Packet) -> Result<Option<Message>> {
        if packet[0] != MARKER {
            return Err(FrameError::InvalidMarker(packet[0]));
        }
        let chunk = &packet[1..];

        let mut acc = match self.state.take() {
            None => self.start(chunk)?,
            Some(mut acc) => {
                acc.buffer.extend_from_slice(chunk);
                acc.bytes_remaining -= CHUNK_SIZE as i64;
                acc
            }
        };

        if acc.bytes_remaining > 0 {
            self.state = Some(acc);
            return Ok(None);
        }

        acc.buffer.truncate(acc.declared_len);
        Ok(Some(Message {
            kind: acc.kind,
            payload: acc.buffer.freeze(),
        }))
    }

    fn start(&self, chunk: &[u8]) -> Result<Accumulator> {
        if chunk[0..2] != MAGIC {
            return Err(FrameError::InvalidMagic);
        }
        let kind = u16::from_be_bytes([chunk[2], chunk[3]]);
        let declared_len = u32::from_be_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]) as usize;
        if chunk[8] != TERMINATOR {
            return Err(FrameError::InvalidTerminator(chunk[8]));
        }

        if declared_len > self.max_payload {
            return Err(FrameError::PayloadTooLarge {
                size: declared_len,
                max: self.max_payload,
            });
        }

        let body = &chunk[HEADER_SIZE..];
        let mut buffer = BytesMut::with_capacity(declared_len.div_ceil(CHUNK_SIZE) * CHUNK_SIZE);
        buffer.extend_from_slice(body);

        Ok(Accumulator {
            kind,
            declared_len,
            bytes_remaining: declared_len as i64 - body.len() as i64,
            buffer,
        })
    }

    /// Payload bytes still expected for the message in progress (0 when idle).
    pub fn bytes_remaining(&self) -> usize {
        self.state
            .as_ref()
            .map_or(0, |acc| acc.bytes_remaining.max(0) as usize)
    }

    /// Whether no message is partially received.
    pub fn is_idle(&self) -> bool {
        self.state.is_none()
    }

    /// Discard any partially received message.
    pub fn reset(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(packets: &[Packet]) -> Message {
        let mut decoder = MessageDecoder::default();
        let (last, init) = packets.split_last().unwrap();
        for packet in init {
            assert!(decoder.feed(packet).unwrap().is_none());
        }
        decoder.feed(last).unwrap().unwrap()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let payload = b"hello, device!";
        let packets = encode_message(55, payload).unwrap();
        assert_eq!(packets.len(), 1);

        let message = decode_all(&packets);
        assert_eq!(message.kind, 55);
        assert_eq!(message.payload.as_ref(), payload);
    }

    #[test]
    fn test_first_packet_layout() {
        let packets = encode_message(0x0102, &[0xAA, 0xBB]).unwrap();
        let p = &packets[0];

        assert_eq!(p[0], MARKER);
        assert_eq!(&p[1..3], &MAGIC);
        assert_eq!(&p[3..5], &[0x01, 0x02]);
        assert_eq!(&p[5..9], &[0, 0, 0, 2]);
        assert_eq!(p[9], TERMINATOR);
        assert_eq!(&p[10..12], &[0xAA, 0xBB]);
        assert!(p[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_roundtrip_across_chunk_boundaries() {
        for len in [
            0,
            1,
            FIRST_CHUNK_PAYLOAD - 1,
            FIRST_CHUNK_PAYLOAD,
            FIRST_CHUNK_PAYLOAD + 1,
            FIRST_CHUNK_PAYLOAD + CHUNK_SIZE,
            FIRST_CHUNK_PAYLOAD + CHUNK_SIZE + 1,
            1000,
            64 * 1024,
        ] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let packets = encode_message(7, &payload).unwrap();
            let message = decode_all(&packets);
            assert_eq!(message.kind, 7, "len {len}");
            assert_eq!(message.payload.as_ref(), payload.as_slice(), "len {len}");
        }
    }

    #[test]
    fn test_packet_count_matches_stream_length() {
        for len in [0, 53, 54, 55, 117, 118, 500] {
            let packets = encode_message(1, &vec![0xEE; len]).unwrap();
            let expected = (HEADER_SIZE + len).div_ceil(CHUNK_SIZE);
            assert_eq!(packets.len(), expected, "len {len}");
            assert_eq!(packet_count(len), expected);
            assert!(packets.iter().all(|p| p.len() == PACKET_SIZE && p[0] == MARKER));
        }
    }

    #[test]
    fn test_last_packet_zero_padded() {
        let packets = encode_message(2, &[0xFF; 60]).unwrap();
        assert_eq!(packets.len(), 2);
        let tail = &packets[1];
        assert!(tail[1..7].iter().all(|&b| b == 0xFF));
        assert!(tail[7..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_partial_feed_completes_on_last_packet() {
        let payload = vec![0x5A; 300];
        let packets = encode_message(17, &payload).unwrap();
        assert_eq!(packets.len(), 5);

        let mut decoder = MessageDecoder::default();
        for (i, packet) in packets.iter().enumerate() {
            let out = decoder.feed(packet).unwrap();
            if i + 1 < packets.len() {
                assert!(out.is_none());
                assert!(decoder.bytes_remaining() > 0);
            } else {
                let message = out.unwrap();
                assert_eq!(message.payload.len(), 300);
            }
        }
        assert!(decoder.is_idle());
        assert_eq!(decoder.bytes_remaining(), 0);
    }

    #[test]
    fn test_decoder_reusable_for_next_message() {
        let mut decoder = MessageDecoder::default();
        for kind in [2u16, 3, 26] {
            let packets = encode_message(kind, format!("msg-{kind}").as_bytes()).unwrap();
            let message = decoder.feed(&packets[0]).unwrap().unwrap();
            assert_eq!(message.kind, kind);
        }
    }

    #[test]
    fn test_empty_payload() {
        let packets = encode_message(2, b"").unwrap();
        assert_eq!(packets.len(), 1);

        let message = decode_all(&packets);
        assert_eq!(message.kind, 2);
        assert!(message.payload.is_empty());
    }

    #[test]
    fn test_decode_invalid_magic() {
        let mut packets = encode_message(2, b"x").unwrap();
        packets[0][1] = 0xFF;

        let mut decoder = MessageDecoder::default();
        let result = decoder.feed(&packets[0]);
        assert!(matches!(result, Err(FrameError::InvalidMagic)));
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_decode_zeroed_packet_rejected() {
        let mut decoder = MessageDecoder::default();
        let result = decoder.feed(&[0u8; PACKET_SIZE]);
        assert!(matches!(result, Err(FrameError::InvalidMarker(0))));
    }

    #[test]
    fn test_decode_invalid_terminator() {
        let mut packets = encode_message(2, b"x").unwrap();
        packets[0][9] = 0x00;

        let result = MessageDecoder::default().feed(&packets[0]);
        assert!(matches!(result, Err(FrameError::InvalidTerminator(0))));
    }

    #[test]
    fn test_bad_marker_mid_message_resets() {
        let mut packets = encode_message(7, &[1u8; 200]).unwrap();
        packets[1][0] = 0x00;

        let mut decoder = MessageDecoder::default();
        assert!(decoder.feed(&packets[0]).unwrap().is_none());
        assert!(matches!(
            decoder.feed(&packets[1]),
            Err(FrameError::InvalidMarker(0))
        ));
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_decode_payload_too_large() {
        let packets = encode_message(7, &[0u8; 100]).unwrap();
        let mut decoder = MessageDecoder::new(16);

        let result = decoder.feed(&packets[0]);
        assert!(matches!(
            result,
            Err(FrameError::PayloadTooLarge { size: 100, max: 16 })
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_encode_rejects_unrepresentable_length() {
        let err = checked_len(u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert_eq!(checked_len(u32::MAX as usize).unwrap(), u32::MAX);
    }

    #[test]
    fn test_message_packet_count() {
        let message = Message::new(1, Bytes::from_static(&[0u8; 54]));
        assert_eq!(message.packet_count(), 1);
        let message = Message::new(1, Bytes::from_static(&[0u8; 55]));
        assert_eq!(message.packet_count(), 2);
    }
}
