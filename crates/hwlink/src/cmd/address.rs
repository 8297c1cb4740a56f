use hwlink_device::Device;
use hwlink_transport::TransportConfig;
use serde::Serialize;

use crate::cmd::AddressArgs;
use crate::console::ConsoleInput;
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_result, OutputFormat};

#[derive(Serialize)]
struct AddressOutput {
    start_index: u32,
    addresses: Vec<String>,
}

pub fn run(
    args: AddressArgs,
    device: &Device<TransportConfig>,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut input = ConsoleInput::stdio();
    let addresses = device
        .address_gen(args.count, args.start, args.confirm, &mut input)
        .map_err(|err| device_error("address generation failed", err))?;

    let out = AddressOutput {
        start_index: args.start,
        addresses,
    };
    print_result("address", &out, format);
    Ok(SUCCESS)
}
