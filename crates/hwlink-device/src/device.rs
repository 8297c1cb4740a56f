use std::time::Duration;

use hwlink_frame::{kind, kind_name, FrameConfig, Message};
use hwlink_transport::{Connector, TransportConfig};
use tracing::{debug, info, warn};

use crate::error::{DeviceError, Result};
use crate::input::{
    validate_pin, ButtonKind, DeclineInput, InputDeclined, InputProvider, PinMatrixKind,
};
use crate::messages::{
    decode, ApplySettings, BackupDevice, ButtonAck, ButtonRequest, Cancel, ChangePin,
    DeviceFeatures, DeviceMessage, Failure, Features, GenerateMnemonic, GetFeatures, Initialize,
    PinMatrixAck, PinMatrixRequest, Ping, RecoveryDevice, ResponseSkycoinAddress,
    ResponseSkycoinSignMessage, SkycoinAddress, SkycoinCheckMessageSignature, SkycoinSignMessage,
    Success, WipeDevice, WordAck,
};
use crate::session::DeviceSession;

/// Default time to wait for one device packet. Long enough for a human to
/// confirm on the device.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Seed lengths the device accepts for generation and recovery.
pub const MNEMONIC_WORD_COUNTS: [u32; 2] = [12, 24];

/// Configuration for [`Device::from_config`].
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Which transport variant to open for every round trip.
    pub transport: TransportConfig,
    /// Packet read timeout. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Framing limits.
    pub frame: FrameConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            frame: FrameConfig::default(),
        }
    }
}

/// Options for [`Device::recovery`].
#[derive(Debug, Clone)]
pub struct RecoveryOptions {
    pub word_count: u32,
    /// Check the words against the stored seed without changing anything.
    pub dry_run: bool,
    pub pin_protection: bool,
    pub passphrase_protection: bool,
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        Self {
            word_count: 12,
            dry_run: false,
            pin_protection: false,
            passphrase_protection: false,
        }
    }
}

/// Which device prompts an operation accepts and which response ends it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Flow {
    operation: &'static str,
    done: &'static [u16],
    button: bool,
    pin: bool,
    word: bool,
    confirm: bool,
}

impl Flow {
    pub(crate) const fn new(operation: &'static str, done: &'static [u16]) -> Self {
        Self {
            operation,
            done,
            button: false,
            pin: false,
            word: false,
            confirm: false,
        }
    }

    pub(crate) const fn buttons(mut self) -> Self {
        self.button = true;
        self
    }

    pub(crate) const fn pin(mut self) -> Self {
        self.pin = true;
        self
    }

    pub(crate) const fn words(mut self) -> Self {
        self.word = true;
        self
    }

    /// Terminal response only counts after at least one button press.
    pub(crate) const fn confirmed(mut self) -> Self {
        self.button = true;
        self.confirm = true;
        self
    }

    fn expected(&self) -> &'static str {
        self.done.first().map_or("Success", |k| kind_name(*k))
    }
}

const SUCCESS_ONLY: &[u16] = &[kind::SUCCESS];

/// What the device has asked for so far in one conversation.
#[derive(Debug, Default, Clone, Copy)]
struct Progress {
    buttons: usize,
    words_started: bool,
}

/// Where a conversation stands between two round trips.
#[derive(Debug)]
enum Stage {
    /// Next request to send.
    Request(Message),
    /// Device waits for a button press.
    Button(ButtonKind),
    /// Device waits for a PIN.
    Pin(PinMatrixKind),
    /// Device waits for a recovery word.
    Word,
    /// Response that ends the operation.
    Done(Message),
}

/// Command layer over one device.
///
/// Holds no open handle: every round trip opens a fresh session through the
/// connector and closes it once the response is in. Operations take `&self`;
/// callers serialize access to one physical device.
#[derive(Debug, Clone)]
pub struct Device<C> {
    connector: C,
    frame: FrameConfig,
}

impl Device<TransportConfig> {
    /// Build a device from an explicit transport selection.
    pub fn from_config(config: DeviceConfig) -> Self {
        let connector = config.transport.with_read_timeout(config.read_timeout);
        info!(
            transport = connector.kind_name(),
            read_timeout = ?config.read_timeout,
            "device configured"
        );
        Self::new(connector, config.frame)
    }
}

impl<C: Connector> Device<C> {
    pub fn new(connector: C, frame: FrameConfig) -> Self {
        Self { connector, frame }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// One raw request/response pair on a fresh session.
    pub fn round_trip(&self, request: &Message) -> Result<Message> {
        DeviceSession::open(&self.connector, self.frame.clone())?.request(request)
    }

    /// Drive a conversation until the flow's terminal response arrives.
    pub(crate) fn converse(
        &self,
        request: Message,
        flow: Flow,
        input: &mut dyn InputProvider,
    ) -> Result<Message> {
        let mut stage = Stage::Request(request);
        let mut progress = Progress::default();

        loop {
            stage = match stage {
                Stage::Request(request) => {
                    let response = self.round_trip(&request)?;
                    next_stage(response, &flow, progress)?
                }
                Stage::Button(button) => {
                    debug!(operation = flow.operation, ?button, "waiting for button");
                    progress.buttons += 1;
                    input.button_request(button);
                    Stage::Request(ButtonAck {}.to_message())
                }
                Stage::Pin(prompt) => {
                    let pin = input
                        .pin(prompt)
                        .map_err(|declined| self.declined(flow.operation, declined))?;
                    if let Err(reason) = validate_pin(&pin) {
                        self.abandon(flow.operation, &reason);
                        return Err(DeviceError::InvalidArgument(reason));
                    }
                    Stage::Request(PinMatrixAck { pin }.to_message())
                }
                Stage::Word => {
                    progress.words_started = true;
                    let word = input
                        .word()
                        .map_err(|declined| self.declined(flow.operation, declined))?;
                    Stage::Request(
                        WordAck {
                            word: word.trim().to_string(),
                        }
                        .to_message(),
                    )
                }
                Stage::Done(response) => return Ok(response),
            };
        }
    }

    /// Cancel the pending device-side operation. The outcome is only logged.
    fn abandon(&self, operation: &'static str, reason: &str) {
        debug!(operation, reason, "abandoning operation, sending cancel");
        match self.cancel() {
            Ok(message) => debug!(operation, %message, "device cancelled"),
            Err(err) => warn!(operation, error = %err, "cancel failed"),
        }
    }

    fn declined(&self, operation: &'static str, declined: InputDeclined) -> DeviceError {
        self.abandon(operation, &declined.reason);
        DeviceError::InputDeclined(declined.reason)
    }

    fn simple<M: DeviceMessage>(
        &self,
        request: &M,
        flow: Flow,
        input: &mut dyn InputProvider,
    ) -> Result<String> {
        let response = self.converse(request.to_message(), flow, input)?;
        success_text(&response)
    }

    /// Report device features without resetting its session state.
    pub fn get_features(&self) -> Result<DeviceFeatures> {
        const FLOW: Flow = Flow::new("GetFeatures", &[kind::FEATURES]);
        let response = self.converse(GetFeatures {}.to_message(), FLOW, &mut DeclineInput)?;
        Ok(decode::<Features>(&response)?.into())
    }

    /// Reset device-side session state and report features.
    pub fn initialize(&self) -> Result<DeviceFeatures> {
        const FLOW: Flow = Flow::new("Initialize", &[kind::FEATURES]);
        let response = self.converse(Initialize {}.to_message(), FLOW, &mut DeclineInput)?;
        Ok(decode::<Features>(&response)?.into())
    }

    /// Derive `count` addresses starting at `start_index`.
    ///
    /// With `confirm` the device shows the address and waits for a button.
    pub fn address_gen(
        &self,
        count: u32,
        start_index: u32,
        confirm: bool,
        input: &mut dyn InputProvider,
    ) -> Result<Vec<String>> {
        if count == 0 {
            return Err(DeviceError::InvalidArgument(
                "address count must be at least 1".into(),
            ));
        }
        let flow = if confirm {
            Flow::new("AddressGen", &[kind::RESPONSE_SKYCOIN_ADDRESS])
                .pin()
                .buttons()
        } else {
            Flow::new("AddressGen", &[kind::RESPONSE_SKYCOIN_ADDRESS]).pin()
        };
        let request = SkycoinAddress {
            address_n: count,
            start_index: Some(start_index),
            confirm_address: Some(confirm),
        };

        let response = self.converse(request.to_message(), flow, input)?;
        let addresses = decode::<ResponseSkycoinAddress>(&response)?.addresses;
        if addresses.len() != count as usize {
            warn!(
                requested = count,
                received = addresses.len(),
                "device returned a different number of addresses"
            );
        }
        Ok(addresses)
    }

    /// Sign `message` with the key of address `address_index`.
    pub fn sign_message(
        &self,
        address_index: u32,
        message: &str,
        input: &mut dyn InputProvider,
    ) -> Result<String> {
        const FLOW: Flow = Flow::new("SignMessage", &[kind::RESPONSE_SKYCOIN_SIGN_MESSAGE]).pin();
        let request = SkycoinSignMessage {
            address_n: address_index,
            message: message.to_string(),
        };
        let response = self.converse(request.to_message(), FLOW, input)?;
        Ok(decode::<ResponseSkycoinSignMessage>(&response)?.signed_message)
    }

    /// Verify that `signature` over `message` was made by `address`.
    ///
    /// A bad signature comes back as [`DeviceError::Failure`].
    pub fn check_message_signature(
        &self,
        address: &str,
        message: &str,
        signature: &str,
        input: &mut dyn InputProvider,
    ) -> Result<String> {
        const FLOW: Flow = Flow::new("CheckMessageSignature", SUCCESS_ONLY).pin();
        let request = SkycoinCheckMessageSignature {
            address: address.to_string(),
            message: message.to_string(),
            signature: signature.to_string(),
        };
        self.simple(&request, FLOW, input)
    }

    /// Set or change the PIN, or remove it with `remove`.
    pub fn change_pin(&self, remove: bool, input: &mut dyn InputProvider) -> Result<String> {
        const FLOW: Flow = Flow::new("ChangePin", SUCCESS_ONLY).buttons().pin();
        self.simple(
            &ChangePin {
                remove: Some(remove),
            },
            FLOW,
            input,
        )
    }

    /// Restore a seed by entering its words.
    pub fn recovery(
        &self,
        options: &RecoveryOptions,
        input: &mut dyn InputProvider,
    ) -> Result<String> {
        const FLOW: Flow = Flow::new("Recovery", SUCCESS_ONLY).buttons().words().pin();
        check_word_count(options.word_count)?;
        let request = RecoveryDevice {
            word_count: Some(options.word_count),
            passphrase_protection: Some(options.passphrase_protection),
            pin_protection: Some(options.pin_protection),
            dry_run: Some(options.dry_run),
        };
        self.simple(&request, FLOW, input)
    }

    /// Show the seed on the device screen for the user to write down.
    pub fn backup(&self, input: &mut dyn InputProvider) -> Result<String> {
        const FLOW: Flow = Flow::new("Backup", SUCCESS_ONLY).pin().buttons();
        self.simple(&BackupDevice {}, FLOW, input)
    }

    /// Erase all secrets from the device.
    pub fn wipe(&self, input: &mut dyn InputProvider) -> Result<String> {
        const FLOW: Flow = Flow::new("Wipe", SUCCESS_ONLY).buttons();
        self.simple(&WipeDevice {}, FLOW, input)
    }

    /// Abort whatever the device is doing.
    ///
    /// `Success` and `Failure` both mean the device is idle again; the
    /// returned text is whatever message it attached.
    pub fn cancel(&self) -> Result<String> {
        const FLOW: Flow = Flow::new("Cancel", &[kind::SUCCESS, kind::FAILURE]);
        let response = self.converse(Cancel {}.to_message(), FLOW, &mut DeclineInput)?;
        if response.kind == kind::FAILURE {
            return Ok(decode::<Failure>(&response)?.message.unwrap_or_default());
        }
        success_text(&response)
    }

    /// Echo `message` through the device.
    pub fn ping(
        &self,
        message: &str,
        button_protection: bool,
        input: &mut dyn InputProvider,
    ) -> Result<String> {
        const FLOW: Flow = Flow::new("Ping", SUCCESS_ONLY).buttons();
        let request = Ping {
            message: Some(message.to_string()),
            button_protection: Some(button_protection),
        };
        self.simple(&request, FLOW, input)
    }

    /// Generate a new seed on the device.
    pub fn generate_mnemonic(
        &self,
        word_count: u32,
        passphrase_protection: bool,
        input: &mut dyn InputProvider,
    ) -> Result<String> {
        const FLOW: Flow = Flow::new("GenerateMnemonic", SUCCESS_ONLY).buttons();
        check_word_count(word_count)?;
        let request = GenerateMnemonic {
            word_count: Some(word_count),
            passphrase_protection: Some(passphrase_protection),
        };
        self.simple(&request, FLOW, input)
    }

    /// Change the device label and/or passphrase protection.
    pub fn apply_settings(
        &self,
        label: Option<&str>,
        use_passphrase: Option<bool>,
        input: &mut dyn InputProvider,
    ) -> Result<String> {
        const FLOW: Flow = Flow::new("ApplySettings", SUCCESS_ONLY).buttons().pin();
        if label.is_none() && use_passphrase.is_none() {
            return Err(DeviceError::InvalidArgument("no setting to apply".into()));
        }
        let request = ApplySettings {
            use_passphrase,
            label: label.map(str::to_string),
        };
        self.simple(&request, FLOW, input)
    }
}

/// Once the word phase has begun only further word requests, the terminal
/// kinds and `Failure` are accepted.
fn next_stage(response: Message, flow: &Flow, progress: Progress) -> Result<Stage> {
    if flow.done.contains(&response.kind) {
        if flow.confirm && progress.buttons == 0 {
            debug!(
                operation = flow.operation,
                got = kind_name(response.kind),
                "terminal response before button confirmation"
            );
            return Err(DeviceError::UnexpectedKind {
                expected: "ButtonRequest",
                got: response.kind,
            });
        }
        return Ok(Stage::Done(response));
    }
    let prompts_open = !progress.words_started;
    match response.kind {
        kind::FAILURE => Err(failure_error(&response)),
        kind::BUTTON_REQUEST if flow.button && prompts_open => {
            let request = decode::<ButtonRequest>(&response)?;
            Ok(Stage::Button(ButtonKind::from_code(request.code)))
        }
        kind::PIN_MATRIX_REQUEST if flow.pin && prompts_open => {
            let request = decode::<PinMatrixRequest>(&response)?;
            Ok(Stage::Pin(PinMatrixKind::from_code(request.r#type)))
        }
        kind::WORD_REQUEST if flow.word => Ok(Stage::Word),
        got => {
            debug!(
                operation = flow.operation,
                got = kind_name(got),
                "response not accepted at this stage"
            );
            Err(DeviceError::UnexpectedKind {
                expected: flow.expected(),
                got,
            })
        }
    }
}

fn failure_error(response: &Message) -> DeviceError {
    match decode::<Failure>(response) {
        Ok(failure) => DeviceError::Failure {
            code: failure.code,
            message: failure.message.unwrap_or_default(),
        },
        Err(err) => err,
    }
}

pub(crate) fn success_text(response: &Message) -> Result<String> {
    Ok(decode::<Success>(response)?.message.unwrap_or_default())
}

fn check_word_count(word_count: u32) -> Result<()> {
    if MNEMONIC_WORD_COUNTS.contains(&word_count) {
        Ok(())
    } else {
        Err(DeviceError::InvalidArgument(format!(
            "word count must be 12 or 24, got {word_count}"
        )))
    }
}
