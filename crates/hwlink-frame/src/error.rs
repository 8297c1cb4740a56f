use hwlink_transport::TransportError;

/// Errors that can occur during message framing.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A packet does not start with the link-layer marker byte.
    #[error("invalid packet marker 0x{0:02x} (expected 0x3f)")]
    InvalidMarker(u8),

    /// The message header contains an invalid magic number.
    #[error("invalid message magic (expected 0x2323 \"##\")")]
    InvalidMagic,

    /// The message header is not closed by the terminator byte.
    #[error("invalid header terminator 0x{0:02x} (expected 0x0a)")]
    InvalidTerminator(u8),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The transport failed while reading or writing packets.
    #[error("frame transport error: {0}")]
    Transport(#[from] TransportError),
}

impl FrameError {
    /// Whether the error stems from bytes that do not form a valid message.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            FrameError::InvalidMarker(_)
                | FrameError::InvalidMagic
                | FrameError::InvalidTerminator(_)
                | FrameError::PayloadTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
