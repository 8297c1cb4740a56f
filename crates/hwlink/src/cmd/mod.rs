use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use hwlink_device::{Device, DeviceConfig};
use hwlink_transport::{EmulatorConfig, TransportConfig, UsbConfig};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod address;
pub mod features;
pub mod firmware;
pub mod message;
pub mod ping;
pub mod seed;
pub mod settings;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report device features.
    Features(FeaturesArgs),
    /// Derive addresses.
    Address(AddressArgs),
    /// Sign a message with the key of one address.
    SignMessage(SignMessageArgs),
    /// Verify a message signature on the device.
    CheckSignature(CheckSignatureArgs),
    /// Set, change or remove the PIN.
    ChangePin(ChangePinArgs),
    /// Restore a seed by entering its words.
    Recovery(RecoveryArgs),
    /// Show the seed on the device screen for backup.
    Backup,
    /// Erase all secrets from the device.
    Wipe,
    /// Abort the operation the device is waiting on.
    Cancel,
    /// Upload a firmware image (device must be in bootloader mode).
    FirmwareUpdate(FirmwareUpdateArgs),
    /// Echo a message through the device.
    Ping(PingArgs),
    /// Generate a new seed on the device.
    GenerateMnemonic(GenerateMnemonicArgs),
    /// Change the device label or passphrase setting.
    ApplySettings(ApplySettingsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(
    command: Command,
    connection: &ConnectionArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    match command {
        Command::Version(args) => version::run(args),
        Command::Features(args) => features::run(args, &connection.device(), format),
        Command::Address(args) => address::run(args, &connection.device(), format),
        Command::SignMessage(args) => message::sign(args, &connection.device(), format),
        Command::CheckSignature(args) => message::check(args, &connection.device(), format),
        Command::ChangePin(args) => settings::change_pin(args, &connection.device(), format),
        Command::ApplySettings(args) => settings::apply(args, &connection.device(), format),
        Command::Wipe => settings::wipe(&connection.device(), format),
        Command::Recovery(args) => seed::recovery(args, &connection.device(), format),
        Command::Backup => seed::backup(&connection.device(), format),
        Command::GenerateMnemonic(args) => seed::generate(args, &connection.device(), format),
        Command::FirmwareUpdate(args) => firmware::run(args, &connection.device(), format),
        Command::Ping(args) => ping::ping(args, &connection.device(), format),
        Command::Cancel => ping::cancel(&connection.device(), format),
    }
}

/// How to reach the device. Shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Talk to the UDP emulator instead of a USB device.
    ///
    /// USB HID is only compiled in with `--features usb`. Without it every
    /// command needs `--emulator` and fails with exit code 64 otherwise.
    #[arg(
        long,
        env = "HWLINK_EMULATOR",
        value_parser = clap::builder::FalseyValueParser::new(),
        global = true
    )]
    pub emulator: bool,

    /// Emulator address.
    #[arg(
        long,
        value_name = "ADDR",
        env = "HWLINK_EMULATOR_ADDR",
        default_value = "127.0.0.1:21324",
        global = true
    )]
    pub emulator_addr: SocketAddr,

    /// USB vendor id to match (e.g. 0x313a).
    #[arg(
        long,
        value_name = "ID",
        default_value = "0x313a",
        value_parser = parse_vendor_id,
        global = true
    )]
    pub vendor_id: u16,

    /// USB manufacturer string to match.
    #[arg(long, value_name = "NAME", global = true)]
    pub manufacturer: Option<String>,

    /// Time to wait for each device packet (e.g. 60s, 500ms).
    #[arg(
        long,
        value_name = "DURATION",
        env = "HWLINK_TIMEOUT",
        default_value = "60s",
        value_parser = parse_duration,
        global = true
    )]
    pub timeout: Duration,
}

impl ConnectionArgs {
    pub fn device_config(&self) -> DeviceConfig {
        let transport = if self.emulator {
            TransportConfig::Emulator(EmulatorConfig {
                addr: self.emulator_addr,
                ..EmulatorConfig::default()
            })
        } else {
            TransportConfig::Usb(UsbConfig {
                vendor_id: Some(self.vendor_id),
                manufacturer: self.manufacturer.clone(),
                ..UsbConfig::default()
            })
        };
        DeviceConfig {
            transport,
            read_timeout: Some(self.timeout),
            ..DeviceConfig::default()
        }
    }

    pub fn device(&self) -> Device<TransportConfig> {
        Device::from_config(self.device_config())
    }
}

#[derive(Args, Debug)]
pub struct FeaturesArgs {
    /// Send Initialize (resets device-side session state) instead of GetFeatures.
    #[arg(long)]
    pub initialize: bool,
}

#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Number of addresses to derive.
    #[arg(long, short = 'n', default_value = "1")]
    pub count: u32,
    /// Index of the first address.
    #[arg(long, default_value = "0")]
    pub start: u32,
    /// Show the address on the device and wait for confirmation.
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Args, Debug)]
pub struct SignMessageArgs {
    /// Message to sign.
    pub message: String,
    /// Index of the signing address.
    #[arg(long, default_value = "0")]
    pub index: u32,
}

#[derive(Args, Debug)]
pub struct CheckSignatureArgs {
    /// Address that supposedly signed the message.
    #[arg(long)]
    pub address: String,
    /// Signed message.
    #[arg(long)]
    pub message: String,
    /// Signature to verify.
    #[arg(long)]
    pub signature: String,
}

#[derive(Args, Debug)]
pub struct ChangePinArgs {
    /// Remove the PIN instead of setting one.
    #[arg(long)]
    pub remove: bool,
}

#[derive(Args, Debug)]
pub struct RecoveryArgs {
    /// Number of seed words (12 or 24).
    #[arg(long, default_value = "12")]
    pub words: u32,
    /// Only check the words against the stored seed.
    #[arg(long)]
    pub dry_run: bool,
    /// Ask for a new PIN after recovery.
    #[arg(long)]
    pub pin: bool,
    /// Enable passphrase protection.
    #[arg(long)]
    pub passphrase: bool,
}

#[derive(Args, Debug)]
pub struct FirmwareUpdateArgs {
    /// Firmware image file.
    pub image: PathBuf,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    /// Text for the device to echo.
    #[arg(default_value = "ping")]
    pub message: String,
    /// Require a button press on the device before answering.
    #[arg(long)]
    pub button: bool,
}

#[derive(Args, Debug)]
pub struct GenerateMnemonicArgs {
    /// Number of seed words (12 or 24).
    #[arg(long, default_value = "12")]
    pub words: u32,
    /// Enable passphrase protection.
    #[arg(long)]
    pub passphrase: bool,
}

#[derive(Args, Debug)]
pub struct ApplySettingsArgs {
    /// New device label.
    #[arg(long)]
    pub label: Option<String>,
    /// Turn passphrase protection on or off.
    #[arg(long, value_name = "BOOL")]
    pub passphrase: Option<bool>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `60s`, `500ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration: {input}"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

/// Parse a USB id given as `0x`-prefixed hex or decimal.
pub fn parse_vendor_id(input: &str) -> Result<u16, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid USB id: {input}"))
}
