use hwlink_device::{Device, RecoveryOptions};
use hwlink_transport::TransportConfig;

use crate::cmd::settings::StatusOutput;
use crate::cmd::{GenerateMnemonicArgs, RecoveryArgs};
use crate::console::ConsoleInput;
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_result, OutputFormat};

pub fn recovery(
    args: RecoveryArgs,
    device: &Device<TransportConfig>,
    format: OutputFormat,
) -> CliResult<i32> {
    let options = RecoveryOptions {
        word_count: args.words,
        dry_run: args.dry_run,
        pin_protection: args.pin,
        passphrase_protection: args.passphrase,
    };
    let mut input = ConsoleInput::stdio();
    let message = device
        .recovery(&options, &mut input)
        .map_err(|err| device_error("recovery failed", err))?;

    print_result("recovery", &StatusOutput { message }, format);
    Ok(SUCCESS)
}

pub fn backup(device: &Device<TransportConfig>, format: OutputFormat) -> CliResult<i32> {
    let mut input = ConsoleInput::stdio();
    let message = device
        .backup(&mut input)
        .map_err(|err| device_error("backup failed", err))?;

    print_result("backup", &StatusOutput { message }, format);
    Ok(SUCCESS)
}

pub fn generate(
    args: GenerateMnemonicArgs,
    device: &Device<TransportConfig>,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut input = ConsoleInput::stdio();
    let message = device
        .generate_mnemonic(args.words, args.passphrase, &mut input)
        .map_err(|err| device_error("seed generation failed", err))?;

    print_result("generate-mnemonic", &StatusOutput { message }, format);
    Ok(SUCCESS)
}
