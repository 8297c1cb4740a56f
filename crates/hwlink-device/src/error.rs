use hwlink_frame::kind_name;

use crate::messages::failure_name;

/// Errors that can occur while talking to a device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] hwlink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] hwlink_frame::FrameError),

    /// The device answered with a kind the current stage does not accept.
    #[error("unexpected {} response (expected {expected})", kind_label(.got))]
    UnexpectedKind { expected: &'static str, got: u16 },

    /// The device reported a failure.
    #[error("device failure ({}): {message}", failure_label(.code))]
    Failure { code: Option<i32>, message: String },

    /// The input provider declined to answer a prompt.
    #[error("input declined: {0}")]
    InputDeclined(String),

    /// Firmware operations need the device booted into its bootloader.
    #[error("device is not in bootloader mode")]
    NotInBootloader,

    /// A response payload did not match its schema.
    #[error("failed to decode {kind} payload: {source}")]
    Decode {
        kind: &'static str,
        source: prost::DecodeError,
    },

    /// A caller-supplied argument was rejected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl DeviceError {
    /// Whether the operation ended on a device or user decision rather than
    /// a protocol or I/O fault.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            DeviceError::Failure { .. }
                | DeviceError::InputDeclined(_)
                | DeviceError::NotInBootloader
        )
    }

    /// Whether the error stems from bytes that do not form a valid message.
    pub fn is_malformed(&self) -> bool {
        match self {
            DeviceError::Frame(err) => err.is_malformed(),
            DeviceError::Decode { .. } => true,
            _ => false,
        }
    }
}

fn kind_label(kind: &u16) -> &'static str {
    kind_name(*kind)
}

fn failure_label(code: &Option<i32>) -> &'static str {
    failure_name(*code)
}

pub type Result<T> = std::result::Result<T, DeviceError>;
