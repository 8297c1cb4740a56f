use hwlink_device::Device;
use hwlink_transport::TransportConfig;

use crate::cmd::FeaturesArgs;
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_result, OutputFormat};

pub fn run(
    args: FeaturesArgs,
    device: &Device<TransportConfig>,
    format: OutputFormat,
) -> CliResult<i32> {
    let features = if args.initialize {
        device.initialize()
    } else {
        device.get_features()
    }
    .map_err(|err| device_error("features failed", err))?;

    print_result("features", &features, format);
    Ok(SUCCESS)
}
