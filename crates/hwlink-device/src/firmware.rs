use hwlink_frame::kind;
use hwlink_transport::Connector;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::device::{success_text, Device, Flow};
use crate::error::{DeviceError, Result};
use crate::input::InputProvider;
use crate::messages::{hex_string, DeviceMessage, FirmwareErase, FirmwareUpload};

/// Steps of a firmware update. Each step runs on its own sessions.
#[derive(Debug)]
enum UpdateStage {
    /// Confirm the device booted into its bootloader.
    CheckMode,
    /// Erase the firmware area.
    Erase,
    /// Send the image and its hash; the device must ask for a button press
    /// before it reports success.
    Upload,
    Done(String),
}

impl<C: Connector> Device<C> {
    /// Replace the device firmware with `image`.
    ///
    /// The device must already be in bootloader mode. The upload carries the
    /// SHA-256 of the image; the device asks for a button press before it
    /// accepts it.
    pub fn firmware_update(&self, image: &[u8], input: &mut dyn InputProvider) -> Result<String> {
        const ERASE: Flow = Flow::new("FirmwareErase", &[kind::SUCCESS]).buttons();
        const UPLOAD: Flow = Flow::new("FirmwareUpload", &[kind::SUCCESS]).confirmed();

        if image.is_empty() {
            return Err(DeviceError::InvalidArgument("firmware image is empty".into()));
        }
        let length = u32::try_from(image.len()).map_err(|_| {
            DeviceError::InvalidArgument(format!(
                "firmware image too large ({} bytes)",
                image.len()
            ))
        })?;
        let hash = Sha256::digest(image).to_vec();
        info!(bytes = image.len(), sha256 = %hex_string(&hash), "starting firmware update");

        let mut stage = UpdateStage::CheckMode;
        loop {
            stage = match stage {
                UpdateStage::CheckMode => {
                    let features = self.initialize()?;
                    if !features.bootloader_mode {
                        return Err(DeviceError::NotInBootloader);
                    }
                    UpdateStage::Erase
                }
                UpdateStage::Erase => {
                    let request = FirmwareErase {
                        length: Some(length),
                    };
                    self.converse(request.to_message(), ERASE, input)?;
                    debug!(length, "firmware area erased");
                    UpdateStage::Upload
                }
                UpdateStage::Upload => {
                    let request = FirmwareUpload {
                        payload: image.to_vec(),
                        hash: Some(hash.clone()),
                    };
                    let response = self.converse(request.to_message(), UPLOAD, input)?;
                    UpdateStage::Done(success_text(&response)?)
                }
                UpdateStage::Done(message) => {
                    info!(%message, "firmware update complete");
                    return Ok(message);
                }
            };
        }
    }
}
