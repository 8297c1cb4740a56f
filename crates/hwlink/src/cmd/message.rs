use hwlink_device::{Device, DeviceError};
use hwlink_transport::TransportConfig;
use serde::Serialize;

use crate::cmd::{CheckSignatureArgs, SignMessageArgs};
use crate::console::ConsoleInput;
use crate::exit::{device_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_result, OutputFormat};

#[derive(Serialize)]
struct SignatureOutput {
    address_index: u32,
    signature: String,
}

#[derive(Serialize)]
struct VerifyOutput {
    verified: bool,
    message: String,
}

pub fn sign(
    args: SignMessageArgs,
    device: &Device<TransportConfig>,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut input = ConsoleInput::stdio();
    let signature = device
        .sign_message(args.index, &args.message, &mut input)
        .map_err(|err| device_error("signing failed", err))?;

    let out = SignatureOutput {
        address_index: args.index,
        signature,
    };
    print_result("sign-message", &out, format);
    Ok(SUCCESS)
}

/// A signature the device rejects is a normal outcome: reported, exit 1.
pub fn check(
    args: CheckSignatureArgs,
    device: &Device<TransportConfig>,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut input = ConsoleInput::stdio();
    let result =
        device.check_message_signature(&args.address, &args.message, &args.signature, &mut input);

    let (out, code) = match result {
        Ok(message) => (
            VerifyOutput {
                verified: true,
                message,
            },
            SUCCESS,
        ),
        Err(DeviceError::Failure { message, .. }) => (
            VerifyOutput {
                verified: false,
                message,
            },
            FAILURE,
        ),
        Err(err) => return Err(device_error("signature check failed", err)),
    };
    print_result("check-signature", &out, format);
    Ok(code)
}
