use std::fs;

use hwlink_device::Device;
use hwlink_transport::TransportConfig;
use serde::Serialize;
use tracing::info;

use crate::cmd::FirmwareUpdateArgs;
use crate::console::ConsoleInput;
use crate::exit::{device_error, io_error, CliResult, SUCCESS};
use crate::output::{print_result, OutputFormat};

#[derive(Serialize)]
struct FirmwareOutput {
    image: String,
    bytes: usize,
    message: String,
}

pub fn run(
    args: FirmwareUpdateArgs,
    device: &Device<TransportConfig>,
    format: OutputFormat,
) -> CliResult<i32> {
    let image = fs::read(&args.image)
        .map_err(|err| io_error(&format!("failed reading {}", args.image.display()), err))?;
    info!(path = %args.image.display(), bytes = image.len(), "firmware image loaded");

    let mut input = ConsoleInput::stdio();
    let message = device
        .firmware_update(&image, &mut input)
        .map_err(|err| device_error("firmware update failed", err))?;

    let out = FirmwareOutput {
        image: args.image.display().to_string(),
        bytes: image.len(),
        message,
    };
    print_result("firmware-update", &out, format);
    Ok(SUCCESS)
}
