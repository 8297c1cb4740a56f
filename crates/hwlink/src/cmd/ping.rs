use hwlink_device::Device;
use hwlink_transport::TransportConfig;

use crate::cmd::settings::StatusOutput;
use crate::cmd::PingArgs;
use crate::console::ConsoleInput;
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_result, OutputFormat};

pub fn ping(
    args: PingArgs,
    device: &Device<TransportConfig>,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut input = ConsoleInput::stdio();
    let message = device
        .ping(&args.message, args.button, &mut input)
        .map_err(|err| device_error("ping failed", err))?;

    print_result("ping", &StatusOutput { message }, format);
    Ok(SUCCESS)
}

pub fn cancel(device: &Device<TransportConfig>, format: OutputFormat) -> CliResult<i32> {
    let message = device
        .cancel()
        .map_err(|err| device_error("cancel failed", err))?;

    print_result("cancel", &StatusOutput { message }, format);
    Ok(SUCCESS)
}
