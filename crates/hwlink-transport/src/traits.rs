use std::time::Duration;

use crate::error::Result;
#[cfg(feature = "usb")]
use crate::hid::UsbDevice;
use crate::hid::UsbConfig;
use crate::udp::{EmulatorConfig, EmulatorSocket};

/// Size of every link-layer packet, in bytes.
pub const PACKET_SIZE: usize = 64;

/// One fixed-size link-layer packet.
pub type Packet = [u8; PACKET_SIZE];

/// Packet-level I/O against one open device handle.
///
/// Implementations never expose partial packets: a read yields exactly one
/// packet or an error, and a write sends exactly one packet or fails.
pub trait Transport {
    /// Block until one packet arrives (or the read timeout elapses).
    fn read_packet(&mut self) -> Result<Packet>;

    /// Send one packet.
    fn write_packet(&mut self, packet: &Packet) -> Result<()>;

    /// Release the underlying handle. Further I/O fails with `Closed`.
    fn close(&mut self) -> Result<()>;

    /// Transport name for diagnostics.
    fn transport_name(&self) -> &'static str;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_packet(&mut self) -> Result<Packet> {
        (**self).read_packet()
    }

    fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        (**self).write_packet(packet)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_packet(&mut self) -> Result<Packet> {
        (**self).read_packet()
    }

    fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        (**self).write_packet(packet)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}

/// Opens transports to a device (enumeration, socket binding).
pub trait Connector {
    type Transport: Transport;

    /// Open a fresh handle to the device.
    fn open(&self) -> Result<Self::Transport>;

    /// Close `transport` and replace it with a freshly opened handle.
    fn reopen(&self, transport: &mut Self::Transport) -> Result<()> {
        transport.close()?;
        *transport = self.open()?;
        Ok(())
    }
}

/// Explicit selection of the transport variant used to reach the device.
#[derive(Debug, Clone)]
pub enum TransportConfig {
    /// A physical device over USB HID.
    Usb(UsbConfig),
    /// The UDP software emulator.
    Emulator(EmulatorConfig),
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Usb(UsbConfig::default())
    }
}

impl TransportConfig {
    /// Override the packet read timeout of the selected variant.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        match &mut self {
            Self::Usb(cfg) => cfg.read_timeout = timeout,
            Self::Emulator(cfg) => cfg.read_timeout = timeout,
        }
        self
    }

    /// Short name of the selected variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Usb(_) => "usb",
            Self::Emulator(_) => "emulator",
        }
    }
}

impl Connector for TransportConfig {
    type Transport = DeviceTransport;

    fn open(&self) -> Result<DeviceTransport> {
        match self {
            Self::Emulator(cfg) => EmulatorSocket::open(cfg).map(DeviceTransport::from_emulator),
            #[cfg(feature = "usb")]
            Self::Usb(cfg) => UsbDevice::open(cfg).map(DeviceTransport::from_usb),
            #[cfg(not(feature = "usb"))]
            Self::Usb(_) => Err(crate::error::TransportError::Unsupported(
                "USB HID needs a build with `--features usb`; use --emulator otherwise",
            )),
        }
    }
}

/// An open device handle of either variant.
pub struct DeviceTransport {
    inner: DeviceTransportInner,
}

enum DeviceTransportInner {
    Emulator(EmulatorSocket),
    #[cfg(feature = "usb")]
    Usb(UsbDevice),
}

impl DeviceTransport {
    pub(crate) fn from_emulator(socket: EmulatorSocket) -> Self {
        Self {
            inner: DeviceTransportInner::Emulator(socket),
        }
    }

    #[cfg(feature = "usb")]
    pub(crate) fn from_usb(device: UsbDevice) -> Self {
        Self {
            inner: DeviceTransportInner::Usb(device),
        }
    }
}

impl Transport for DeviceTransport {
    fn read_packet(&mut self) -> Result<Packet> {
        match &mut self.inner {
            DeviceTransportInner::Emulator(t) => t.read_packet(),
            #[cfg(feature = "usb")]
            DeviceTransportInner::Usb(t) => t.read_packet(),
        }
    }

    fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        match &mut self.inner {
            DeviceTransportInner::Emulator(t) => t.write_packet(packet),
            #[cfg(feature = "usb")]
            DeviceTransportInner::Usb(t) => t.write_packet(packet),
        }
    }

    fn close(&mut self) -> Result<()> {
        match &mut self.inner {
            DeviceTransportInner::Emulator(t) => t.close(),
            #[cfg(feature = "usb")]
            DeviceTransportInner::Usb(t) => t.close(),
        }
    }

    fn transport_name(&self) -> &'static str {
        match &self.inner {
            DeviceTransportInner::Emulator(t) => t.transport_name(),
            #[cfg(feature = "usb")]
            DeviceTransportInner::Usb(t) => t.transport_name(),
        }
    }
}

impl std::fmt::Debug for DeviceTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceTransport")
            .field("type", &self.transport_name())
            .finish()
    }
}
