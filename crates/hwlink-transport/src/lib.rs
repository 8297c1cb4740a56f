//! Packet transports for hardware signing tokens.
//!
//! Provides a unified packet-level interface over the two ways a host can reach
//! a device:
//! - USB HID (physical devices, behind the `usb` feature)
//! - UDP datagrams (the software emulator)
//!
//! This is the lowest layer of hwlink. Every packet that crosses this boundary
//! is exactly [`PACKET_SIZE`] bytes.

pub mod error;
pub mod hid;
pub mod memory;
pub mod traits;
pub mod udp;

pub use error::{Result, TransportError};
pub use hid::{UsbConfig, DEFAULT_VENDOR_ID};
#[cfg(feature = "usb")]
pub use hid::UsbDevice;
pub use memory::MemoryTransport;
pub use traits::{Connector, DeviceTransport, Packet, Transport, TransportConfig, PACKET_SIZE};
pub use udp::{EmulatorConfig, EmulatorSocket, DEFAULT_EMULATOR_PORT};
