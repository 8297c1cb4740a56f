use hwlink_device::Device;
use hwlink_transport::TransportConfig;
use serde::Serialize;

use crate::cmd::{ApplySettingsArgs, ChangePinArgs};
use crate::console::ConsoleInput;
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_result, OutputFormat};

#[derive(Serialize)]
pub struct StatusOutput {
    pub message: String,
}

pub fn change_pin(
    args: ChangePinArgs,
    device: &Device<TransportConfig>,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut input = ConsoleInput::stdio();
    let message = device
        .change_pin(args.remove, &mut input)
        .map_err(|err| device_error("PIN change failed", err))?;

    print_result("change-pin", &StatusOutput { message }, format);
    Ok(SUCCESS)
}

pub fn apply(
    args: ApplySettingsArgs,
    device: &Device<TransportConfig>,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut input = ConsoleInput::stdio();
    let message = device
        .apply_settings(args.label.as_deref(), args.passphrase, &mut input)
        .map_err(|err| device_error("apply settings failed", err))?;

    print_result("apply-settings", &StatusOutput { message }, format);
    Ok(SUCCESS)
}

pub fn wipe(device: &Device<TransportConfig>, format: OutputFormat) -> CliResult<i32> {
    let mut input = ConsoleInput::stdio();
    let message = device
        .wipe(&mut input)
        .map_err(|err| device_error("wipe failed", err))?;

    print_result("wipe", &StatusOutput { message }, format);
    Ok(SUCCESS)
}
