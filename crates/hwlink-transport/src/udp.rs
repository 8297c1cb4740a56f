use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{Packet, Transport, PACKET_SIZE};

/// UDP port the device emulator listens on.
pub const DEFAULT_EMULATOR_PORT: u16 = 21324;

/// Configuration for the UDP emulator transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorConfig {
    /// Emulator endpoint. Default: `127.0.0.1:21324`.
    pub addr: SocketAddr,
    /// Maximum time to block on one datagram. `None` blocks forever.
    pub read_timeout: Option<Duration>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_EMULATOR_PORT)),
            read_timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// UDP transport to the software emulator.
///
/// One packet per datagram. There is no retransmission or reordering
/// protection; a lost datagram surfaces as a read timeout.
pub struct EmulatorSocket {
    socket: Option<UdpSocket>,
    addr: SocketAddr,
}

impl EmulatorSocket {
    /// Bind an ephemeral local socket and connect it to the emulator endpoint.
    pub fn open(config: &EmulatorConfig) -> Result<Self> {
        let local = match config.addr {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, 0)),
        };
        let socket = UdpSocket::bind(local).map_err(|e| TransportError::Bind {
            addr: local,
            source: e,
        })?;
        socket
            .connect(config.addr)
            .map_err(|e| TransportError::Connect {
                addr: config.addr,
                source: e,
            })?;
        socket.set_read_timeout(config.read_timeout)?;

        info!(addr = %config.addr, "opened emulator socket");

        Ok(Self {
            socket: Some(socket),
            addr: config.addr,
        })
    }

    /// The emulator endpoint this socket sends to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    fn socket(&self) -> Result<&UdpSocket> {
        self.socket.as_ref().ok_or(TransportError::Closed)
    }
}

impl Transport for EmulatorSocket {
    fn read_packet(&mut self) -> Result<Packet> {
        let socket = self.socket()?;
        // One spare byte so an oversized datagram is detected instead of truncated.
        let mut buf = [0u8; PACKET_SIZE + 1];
        let size = loop {
            match socket.recv(&mut buf) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return Err(TransportError::Timeout)
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        };

        if size != PACKET_SIZE {
            return Err(TransportError::PacketSize {
                size,
                expected: PACKET_SIZE,
            });
        }

        let mut packet = [0u8; PACKET_SIZE];
        packet.copy_from_slice(&buf[..PACKET_SIZE]);
        Ok(packet)
    }

    fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        let socket = self.socket()?;
        let sent = socket.send(packet)?;
        if sent != PACKET_SIZE {
            return Err(TransportError::PacketSize {
                size: sent,
                expected: PACKET_SIZE,
            });
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.socket.take().is_some() {
            debug!(addr = %self.addr, "closed emulator socket");
        }
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "udp-emulator"
    }
}
