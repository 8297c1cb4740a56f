use std::collections::VecDeque;

use crate::error::{Result, TransportError};
use crate::traits::{Packet, Transport};

/// In-memory transport backed by packet queues.
///
/// Reads pop from `inbound`, writes append to `outbound`. Reading from an
/// empty queue reports [`TransportError::Timeout`], matching a device that
/// never answers.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    pub inbound: VecDeque<Packet>,
    pub outbound: Vec<Packet>,
    closed: bool,
}

impl MemoryTransport {
    /// Create a transport that will yield `packets` in order.
    pub fn with_inbound(packets: impl IntoIterator<Item = Packet>) -> Self {
        Self {
            inbound: packets.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Whether [`Transport::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for MemoryTransport {
    fn read_packet(&mut self) -> Result<Packet> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.inbound.pop_front().ok_or(TransportError::Timeout)
    }

    fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.outbound.push(*packet);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "memory"
    }
}
