//! Device message schema binding.
//!
//! Payloads are protobuf (proto2) messages. Only the messages the command
//! layer drives are bound here; every struct carries its wire kind through
//! [`DeviceMessage::KIND`].

use std::fmt;

use hwlink_frame::{kind, kind_name, Message};
use serde::Serialize;

use crate::error::{DeviceError, Result};

/// A schema message with a fixed wire kind.
pub trait DeviceMessage: prost::Message + Default {
    /// Wire kind carried in the frame header.
    const KIND: u16;

    /// Encode into a frame-level [`Message`].
    fn to_message(&self) -> Message {
        Message::new(Self::KIND, self.encode_to_vec())
    }
}

/// Decode `message` as `M`, rejecting any other kind.
pub fn decode<M: DeviceMessage>(message: &Message) -> Result<M> {
    if message.kind != M::KIND {
        return Err(DeviceError::UnexpectedKind {
            expected: kind_name(M::KIND),
            got: message.kind,
        });
    }
    M::decode(message.payload.as_ref()).map_err(|source| DeviceError::Decode {
        kind: kind_name(M::KIND),
        source,
    })
}

macro_rules! device_messages {
    ($($ty:ident => $kind:path),* $(,)?) => {
        $(
            impl DeviceMessage for $ty {
                const KIND: u16 = $kind;
            }
        )*
    };
}

device_messages! {
    Initialize => kind::INITIALIZE,
    Ping => kind::PING,
    Success => kind::SUCCESS,
    Failure => kind::FAILURE,
    ChangePin => kind::CHANGE_PIN,
    WipeDevice => kind::WIPE_DEVICE,
    FirmwareErase => kind::FIRMWARE_ERASE,
    FirmwareUpload => kind::FIRMWARE_UPLOAD,
    Features => kind::FEATURES,
    PinMatrixRequest => kind::PIN_MATRIX_REQUEST,
    PinMatrixAck => kind::PIN_MATRIX_ACK,
    Cancel => kind::CANCEL,
    ApplySettings => kind::APPLY_SETTINGS,
    ButtonRequest => kind::BUTTON_REQUEST,
    ButtonAck => kind::BUTTON_ACK,
    BackupDevice => kind::BACKUP_DEVICE,
    RecoveryDevice => kind::RECOVERY_DEVICE,
    WordRequest => kind::WORD_REQUEST,
    WordAck => kind::WORD_ACK,
    GetFeatures => kind::GET_FEATURES,
    SkycoinAddress => kind::SKYCOIN_ADDRESS,
    SkycoinCheckMessageSignature => kind::SKYCOIN_CHECK_MESSAGE_SIGNATURE,
    SkycoinSignMessage => kind::SKYCOIN_SIGN_MESSAGE,
    ResponseSkycoinAddress => kind::RESPONSE_SKYCOIN_ADDRESS,
    ResponseSkycoinSignMessage => kind::RESPONSE_SKYCOIN_SIGN_MESSAGE,
    GenerateMnemonic => kind::GENERATE_MNEMONIC,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum FailureType {
    UnexpectedMessage = 1,
    ButtonExpected = 2,
    DataError = 3,
    ActionCancelled = 4,
    PinExpected = 5,
    PinCancelled = 6,
    PinInvalid = 7,
    InvalidSignature = 8,
    ProcessError = 9,
    NotEnoughFunds = 10,
    NotInitialized = 11,
    PinMismatch = 12,
    AddressGeneratorFailed = 13,
    FirmwareError = 99,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ButtonRequestType {
    Other = 1,
    FeeOverThreshold = 2,
    ConfirmOutput = 3,
    ResetDevice = 4,
    ConfirmWord = 5,
    WipeDevice = 6,
    ProtectCall = 7,
    SignTx = 8,
    FirmwareCheck = 9,
    Address = 10,
    PublicKey = 11,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum PinMatrixRequestType {
    Current = 1,
    NewFirst = 2,
    NewSecond = 3,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Initialize {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetFeatures {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Features {
    #[prost(string, optional, tag = "1")]
    pub vendor: Option<String>,
    #[prost(uint32, optional, tag = "2")]
    pub major_version: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub minor_version: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub patch_version: Option<u32>,
    #[prost(bool, optional, tag = "5")]
    pub bootloader_mode: Option<bool>,
    #[prost(string, optional, tag = "6")]
    pub device_id: Option<String>,
    #[prost(bool, optional, tag = "7")]
    pub pin_protection: Option<bool>,
    #[prost(bool, optional, tag = "8")]
    pub passphrase_protection: Option<bool>,
    #[prost(string, optional, tag = "10")]
    pub label: Option<String>,
    #[prost(bool, optional, tag = "12")]
    pub initialized: Option<bool>,
    #[prost(bool, optional, tag = "18")]
    pub firmware_present: Option<bool>,
    #[prost(bool, optional, tag = "19")]
    pub needs_backup: Option<bool>,
    #[prost(string, optional, tag = "21")]
    pub model: Option<String>,
    #[prost(string, optional, tag = "22")]
    pub fw_version: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Success {
    #[prost(string, optional, tag = "1")]
    pub message: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Failure {
    #[prost(enumeration = "FailureType", optional, tag = "1")]
    pub code: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub message: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Ping {
    #[prost(string, optional, tag = "1")]
    pub message: Option<String>,
    #[prost(bool, optional, tag = "2")]
    pub button_protection: Option<bool>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ChangePin {
    #[prost(bool, optional, tag = "1")]
    pub remove: Option<bool>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WipeDevice {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FirmwareErase {
    #[prost(uint32, optional, tag = "1")]
    pub length: Option<u32>,
}

#[derive(Clone, PartialEq, prost::Message)]
#[prost(skip_debug)]
pub struct FirmwareUpload {
    #[prost(bytes = "vec", required, tag = "1")]
    pub payload: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub hash: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PinMatrixRequest {
    #[prost(enumeration = "PinMatrixRequestType", optional, tag = "1")]
    pub r#type: Option<i32>,
}

/// PIN answer. Debug output redacts the PIN.
#[derive(Clone, PartialEq, prost::Message)]
#[prost(skip_debug)]
pub struct PinMatrixAck {
    #[prost(string, required, tag = "1")]
    pub pin: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Cancel {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ApplySettings {
    #[prost(bool, optional, tag = "1")]
    pub use_passphrase: Option<bool>,
    #[prost(string, optional, tag = "2")]
    pub label: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ButtonRequest {
    #[prost(enumeration = "ButtonRequestType", optional, tag = "1")]
    pub code: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub data: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ButtonAck {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BackupDevice {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RecoveryDevice {
    #[prost(uint32, optional, tag = "1")]
    pub word_count: Option<u32>,
    #[prost(bool, optional, tag = "2")]
    pub passphrase_protection: Option<bool>,
    #[prost(bool, optional, tag = "3")]
    pub pin_protection: Option<bool>,
    #[prost(bool, optional, tag = "10")]
    pub dry_run: Option<bool>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WordRequest {}

/// Recovery word answer. Debug output redacts the word.
#[derive(Clone, PartialEq, prost::Message)]
#[prost(skip_debug)]
pub struct WordAck {
    #[prost(string, required, tag = "1")]
    pub word: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GenerateMnemonic {
    #[prost(uint32, optional, tag = "1")]
    pub word_count: Option<u32>,
    #[prost(bool, optional, tag = "2")]
    pub passphrase_protection: Option<bool>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SkycoinAddress {
    #[prost(uint32, required, tag = "1")]
    pub address_n: u32,
    #[prost(uint32, optional, tag = "2")]
    pub start_index: Option<u32>,
    #[prost(bool, optional, tag = "3")]
    pub confirm_address: Option<bool>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ResponseSkycoinAddress {
    #[prost(string, repeated, tag = "1")]
    pub addresses: Vec<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SkycoinSignMessage {
    #[prost(uint32, required, tag = "1")]
    pub address_n: u32,
    #[prost(string, required, tag = "2")]
    pub message: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ResponseSkycoinSignMessage {
    #[prost(string, required, tag = "1")]
    pub signed_message: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SkycoinCheckMessageSignature {
    #[prost(string, required, tag = "1")]
    pub address: String,
    #[prost(string, required, tag = "2")]
    pub message: String,
    #[prost(string, required, tag = "3")]
    pub signature: String,
}

impl fmt::Debug for PinMatrixAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinMatrixAck")
            .field("pin", &format_args!("<redacted:{} chars>", self.pin.len()))
            .finish()
    }
}

impl fmt::Debug for WordAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordAck")
            .field("word", &format_args!("<redacted:{} chars>", self.word.len()))
            .finish()
    }
}

impl fmt::Debug for FirmwareUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirmwareUpload")
            .field("payload", &format_args!("<{} bytes>", self.payload.len()))
            .field("hash", &self.hash.as_deref().map(hex_string))
            .finish()
    }
}

/// Summary of a `Features` report, as shown to users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// `major.minor.patch`, when the device reports all three.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub bootloader_mode: bool,
    pub initialized: bool,
    pub pin_protection: bool,
    pub passphrase_protection: bool,
    pub needs_backup: bool,
    pub firmware_present: bool,
}

impl From<Features> for DeviceFeatures {
    fn from(f: Features) -> Self {
        let firmware_version = match (f.major_version, f.minor_version, f.patch_version) {
            (Some(major), Some(minor), Some(patch)) => Some(format!("{major}.{minor}.{patch}")),
            _ => f.fw_version,
        };
        Self {
            vendor: f.vendor,
            model: f.model,
            firmware_version,
            device_id: f.device_id,
            label: f.label,
            bootloader_mode: f.bootloader_mode.unwrap_or(false),
            initialized: f.initialized.unwrap_or(false),
            pin_protection: f.pin_protection.unwrap_or(false),
            passphrase_protection: f.passphrase_protection.unwrap_or(false),
            needs_backup: f.needs_backup.unwrap_or(false),
            firmware_present: f.firmware_present.unwrap_or(false),
        }
    }
}

/// Human-readable name of a failure code.
pub fn failure_name(code: Option<i32>) -> &'static str {
    match code.map(FailureType::try_from) {
        Some(Ok(FailureType::UnexpectedMessage)) => "unexpected message",
        Some(Ok(FailureType::ButtonExpected)) => "button expected",
        Some(Ok(FailureType::DataError)) => "data error",
        Some(Ok(FailureType::ActionCancelled)) => "action cancelled",
        Some(Ok(FailureType::PinExpected)) => "PIN expected",
        Some(Ok(FailureType::PinCancelled)) => "PIN cancelled",
        Some(Ok(FailureType::PinInvalid)) => "PIN invalid",
        Some(Ok(FailureType::InvalidSignature)) => "invalid signature",
        Some(Ok(FailureType::ProcessError)) => "process error",
        Some(Ok(FailureType::NotEnoughFunds)) => "not enough funds",
        Some(Ok(FailureType::NotInitialized)) => "not initialized",
        Some(Ok(FailureType::PinMismatch)) => "PIN mismatch",
        Some(Ok(FailureType::AddressGeneratorFailed)) => "address generator failed",
        Some(Ok(FailureType::FirmwareError)) => "firmware error",
        Some(Err(_)) => "unknown failure",
        None => "unspecified failure",
    }
}

pub(crate) fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_message_tags_kind() {
        let msg = SkycoinAddress {
            address_n: 2,
            start_index: Some(0),
            confirm_address: None,
        }
        .to_message();

        assert_eq!(msg.kind, kind::SKYCOIN_ADDRESS);
        let back: SkycoinAddress = decode(&msg).unwrap();
        assert_eq!(back.address_n, 2);
        assert_eq!(back.start_index, Some(0));
    }

    #[test]
    fn decode_rejects_other_kind() {
        let msg = Success::default().to_message();
        let err = decode::<Features>(&msg).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::UnexpectedKind {
                expected: "Features",
                got: kind::SUCCESS
            }
        ));
    }

    #[test]
    fn decode_reports_malformed_payload() {
        let msg = Message::new(kind::FEATURES, vec![0xFFu8, 0xFF, 0xFF]);
        let err = decode::<Features>(&msg).unwrap_err();
        assert!(matches!(err, DeviceError::Decode { kind: "Features", .. }));
    }

    #[test]
    fn empty_messages_encode_to_empty_payload() {
        assert!(GetFeatures::default().to_message().payload.is_empty());
        assert!(ButtonAck::default().to_message().payload.is_empty());
        assert!(Cancel::default().to_message().payload.is_empty());
    }

    #[test]
    fn device_features_from_report() {
        let features = Features {
            vendor: Some("Skycoin Foundation".into()),
            major_version: Some(1),
            minor_version: Some(7),
            patch_version: Some(0),
            initialized: Some(true),
            pin_protection: Some(true),
            ..Features::default()
        };

        let summary = DeviceFeatures::from(features);
        assert_eq!(summary.firmware_version.as_deref(), Some("1.7.0"));
        assert!(summary.initialized);
        assert!(summary.pin_protection);
        assert!(!summary.bootloader_mode);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["vendor"], "Skycoin Foundation");
        assert!(json.get("label").is_none());
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let ack = PinMatrixAck { pin: "1234".into() };
        let out = format!("{ack:?}");
        assert!(!out.contains("1234"));
        assert!(out.contains("<redacted:4 chars>"));

        let word = WordAck {
            word: "abandon".into(),
        };
        assert!(!format!("{word:?}").contains("abandon"));
    }

    #[test]
    fn failure_names() {
        assert_eq!(failure_name(Some(7)), "PIN invalid");
        assert_eq!(failure_name(Some(4242)), "unknown failure");
        assert_eq!(failure_name(None), "unspecified failure");
    }
}
