use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::traits::{Packet, PACKET_SIZE};

/// USB vendor id of the signing token.
pub const DEFAULT_VENDOR_ID: u16 = 0x313a;

/// Whether outbound HID reports carry a leading report-id byte.
///
/// The Windows HID write call expects the report id in front of the frame;
/// other platforms take the bare 64-byte frame.
pub const PREFIX_REPORT_ID: bool = cfg!(windows);

/// Device selection and I/O settings for the USB HID transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbConfig {
    /// Match devices with this USB vendor id. `None` accepts any vendor id.
    pub vendor_id: Option<u16>,
    /// Match devices with this product id. `None` accepts any product id.
    pub product_id: Option<u16>,
    /// Match devices whose manufacturer string equals this value.
    pub manufacturer: Option<String>,
    /// Maximum time to block on one report. `None` blocks forever.
    pub read_timeout: Option<Duration>,
}

impl Default for UsbConfig {
    fn default() -> Self {
        Self {
            vendor_id: Some(DEFAULT_VENDOR_ID),
            product_id: None,
            manufacturer: None,
            read_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl UsbConfig {
    /// Whether a device with the given identity satisfies this selection.
    pub fn matches(&self, vendor_id: u16, product_id: u16, manufacturer: Option<&str>) -> bool {
        self.vendor_id.map_or(true, |v| v == vendor_id)
            && self.product_id.map_or(true, |p| p == product_id)
            && self
                .manufacturer
                .as_deref()
                .map_or(true, |m| manufacturer == Some(m))
    }

    #[cfg_attr(not(feature = "usb"), allow(dead_code))]
    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(v) = self.vendor_id {
            parts.push(format!("vendor_id={v:#06x}"));
        }
        if let Some(p) = self.product_id {
            parts.push(format!("product_id={p:#06x}"));
        }
        if let Some(m) = &self.manufacturer {
            parts.push(format!("manufacturer={m:?}"));
        }
        if parts.is_empty() {
            "any HID device".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Build the bytes handed to the HID write call for one packet.
pub fn hid_report(packet: &Packet, prefix_report_id: bool) -> Vec<u8> {
    let mut report = Vec::with_capacity(PACKET_SIZE + 1);
    if prefix_report_id {
        report.push(0);
    }
    report.extend_from_slice(packet);
    report
}

/// A HID write must accept the whole report, including any report-id prefix.
#[cfg_attr(not(feature = "usb"), allow(dead_code))]
fn check_written(written: usize, report: &[u8]) -> Result<()> {
    if written < report.len() {
        return Err(TransportError::PacketSize {
            size: written,
            expected: report.len(),
        });
    }
    Ok(())
}

#[cfg_attr(not(feature = "usb"), allow(dead_code))]
fn timeout_millis(timeout: Option<Duration>) -> i32 {
    match timeout {
        None => -1,
        Some(t) => i32::try_from(t.as_millis()).unwrap_or(i32::MAX),
    }
}

#[cfg(feature = "usb")]
pub use device::UsbDevice;

#[cfg(feature = "usb")]
mod device {
    use hidapi::{HidApi, HidDevice};
    use tracing::{debug, info, warn};

    use super::{check_written, hid_report, timeout_millis, UsbConfig, PREFIX_REPORT_ID};
    use crate::error::{Result, TransportError};
    use crate::traits::{Packet, Transport, PACKET_SIZE};

    /// USB HID transport to a physical device.
    ///
    /// Holding a `UsbDevice` holds the HID handle exclusively; drop or
    /// [`Transport::close`] it before opening another one.
    pub struct UsbDevice {
        device: Option<HidDevice>,
        timeout_ms: i32,
    }

    impl UsbDevice {
        /// Enumerate HID devices and open the first one matching `config`.
        pub fn open(config: &UsbConfig) -> Result<Self> {
            let api = HidApi::new().map_err(|e| TransportError::Hid(e.to_string()))?;

            let mut matches = api.device_list().filter(|info| {
                config.matches(
                    info.vendor_id(),
                    info.product_id(),
                    info.manufacturer_string(),
                )
            });

            let info = matches
                .next()
                .ok_or_else(|| TransportError::NotFound(config.describe()))?;
            let extra = matches.count();
            if extra > 0 {
                warn!(
                    extra,
                    path = ?info.path(),
                    "multiple matching HID devices; using the first"
                );
            }

            let device = info
                .open_device(&api)
                .map_err(|e| TransportError::Hid(e.to_string()))?;

            info!(
                vendor_id = info.vendor_id(),
                product_id = info.product_id(),
                "opened HID device"
            );

            Ok(Self {
                device: Some(device),
                timeout_ms: timeout_millis(config.read_timeout),
            })
        }

        fn device(&self) -> Result<&HidDevice> {
            self.device.as_ref().ok_or(TransportError::Closed)
        }
    }

    impl Transport for UsbDevice {
        fn read_packet(&mut self) -> Result<Packet> {
            let device = self.device()?;
            let mut packet = [0u8; PACKET_SIZE];
            let size = device
                .read_timeout(&mut packet, self.timeout_ms)
                .map_err(|e| TransportError::Hid(e.to_string()))?;

            match size {
                0 => Err(TransportError::Timeout),
                PACKET_SIZE => Ok(packet),
                size => Err(TransportError::PacketSize {
                    size,
                    expected: PACKET_SIZE,
                }),
            }
        }

        fn write_packet(&mut self, packet: &Packet) -> Result<()> {
            let device = self.device()?;
            let report = hid_report(packet, PREFIX_REPORT_ID);
            let written = device
                .write(&report)
                .map_err(|e| TransportError::Hid(e.to_string()))?;
            check_written(written, &report)
        }

        fn close(&mut self) -> Result<()> {
            if self.device.take().is_some() {
                debug!("closed HID device");
            }
            Ok(())
        }

        fn transport_name(&self) -> &'static str {
            "usb-hid"
        }
    }
}
