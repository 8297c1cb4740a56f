//! Host-side transport and command protocol for hardware signing tokens.
//!
//! hwlink talks to a detachable signing token over USB HID, or to its
//! software emulator over UDP, exchanging schema-tagged messages carried in
//! fixed 64-byte packets.
//!
//! # Crate Structure
//!
//! - [`transport`]: Packet transports (USB HID behind `usb`, UDP emulator)
//! - [`frame`]: Packet framing and message reassembly
//! - [`device`]: Sessions, command state machines, input providers (behind `device` feature)

/// Re-export transport types.
pub mod transport {
    pub use hwlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use hwlink_frame::*;
}

/// Re-export device types (requires `device` feature).
#[cfg(feature = "device")]
pub mod device {
    pub use hwlink_device::*;
}
