use std::net::SocketAddr;

/// Errors that can occur in packet transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No device matched the selection criteria.
    #[error("no matching device found ({0})")]
    NotFound(String),

    /// Failed to bind the local emulator socket.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to connect to the emulator endpoint.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No packet arrived within the configured read timeout.
    #[error("timed out waiting for device packet")]
    Timeout,

    /// A datagram or report of the wrong size was received or written.
    #[error("unexpected packet size ({size} bytes, expected {expected})")]
    PacketSize { size: usize, expected: usize },

    /// The HID backend reported an error.
    #[error("HID error: {0}")]
    Hid(String),

    /// The requested transport is not compiled into this build.
    #[error("transport unsupported: {0}")]
    Unsupported(&'static str),

    /// The transport handle has been closed.
    #[error("transport closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
