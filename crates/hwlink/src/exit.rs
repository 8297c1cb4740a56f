use std::fmt;
use std::io;

use hwlink_device::DeviceError;
use hwlink_frame::FrameError;
use hwlink_transport::TransportError;

// Process exit codes. 124 follows `timeout(1)`; 60 and 64 follow sysexits ranges.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Io(source) => io_error(context, source),
        TransportError::Timeout => CliError::new(TIMEOUT, format!("{context}: {err}")),
        TransportError::Unsupported(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        other if other.is_malformed() => {
            CliError::new(DATA_INVALID, format!("{context}: {other}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    match err {
        DeviceError::Transport(err) => transport_error(context, err),
        DeviceError::Frame(err) => frame_error(context, err),
        DeviceError::InvalidArgument(_) => CliError::new(USAGE, format!("{context}: {err}")),
        DeviceError::UnexpectedKind { .. } | DeviceError::Decode { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        refused if refused.is_refusal() => {
            CliError::new(FAILURE, format!("{context}: {refused}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_map_to_124() {
        let err = device_error(
            "features",
            DeviceError::Frame(FrameError::Transport(TransportError::Timeout)),
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("features: "));
    }

    #[test]
    fn protocol_errors_map_to_data_invalid() {
        let err = device_error(
            "wipe",
            DeviceError::UnexpectedKind {
                expected: "Success",
                got: 17,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(
            frame_error("read", FrameError::InvalidMagic).code,
            DATA_INVALID
        );
    }

    #[test]
    fn refusals_map_to_failure() {
        assert_eq!(
            device_error("pin", DeviceError::InputDeclined("empty".into())).code,
            FAILURE
        );
        assert_eq!(device_error("fw", DeviceError::NotInBootloader).code, FAILURE);
        assert_eq!(
            device_error("sign", DeviceError::InvalidArgument("x".into())).code,
            USAGE
        );
    }

    #[test]
    fn io_errors_by_kind() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            transport_error("open", TransportError::Io(denied)).code,
            PERMISSION_DENIED
        );
        assert_eq!(
            transport_error("open", TransportError::NotFound("vendor_id=0x313a".into())).code,
            TRANSPORT_ERROR
        );
    }
}
