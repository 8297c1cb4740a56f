//! Message kind identifiers.
//!
//! Kinds are assigned by the device message schema; values below follow the
//! schema revision the firmware ships with. Kinds 0-99 are the generic
//! device-management set, 100 and above are coin-specific.

/// Reset device-side session state and report features.
pub const INITIALIZE: u16 = 0;
/// Echo request.
pub const PING: u16 = 1;
/// Generic success response.
pub const SUCCESS: u16 = 2;
/// Generic failure response.
pub const FAILURE: u16 = 3;
/// Set, change or remove the PIN.
pub const CHANGE_PIN: u16 = 4;
/// Erase all device secrets.
pub const WIPE_DEVICE: u16 = 5;
/// Erase the firmware area (bootloader mode).
pub const FIRMWARE_ERASE: u16 = 6;
/// Upload a firmware image (bootloader mode).
pub const FIRMWARE_UPLOAD: u16 = 7;
/// Device feature report.
pub const FEATURES: u16 = 17;
/// Device asks for the PIN through the scrambled matrix.
pub const PIN_MATRIX_REQUEST: u16 = 18;
/// Host answers a PIN matrix request.
pub const PIN_MATRIX_ACK: u16 = 19;
/// Abort the pending device-side operation.
pub const CANCEL: u16 = 20;
/// Change device settings (label, ...).
pub const APPLY_SETTINGS: u16 = 25;
/// Device waits for a physical button confirmation.
pub const BUTTON_REQUEST: u16 = 26;
/// Host acknowledges a button request.
pub const BUTTON_ACK: u16 = 27;
/// Show the recovery seed on the device screen.
pub const BACKUP_DEVICE: u16 = 34;
/// Start seed recovery.
pub const RECOVERY_DEVICE: u16 = 45;
/// Device asks for one recovery word.
pub const WORD_REQUEST: u16 = 46;
/// Host answers a word request.
pub const WORD_ACK: u16 = 47;
/// Report features without resetting session state.
pub const GET_FEATURES: u16 = 55;

/// Derive addresses.
pub const SKYCOIN_ADDRESS: u16 = 114;
/// Verify a message signature.
pub const SKYCOIN_CHECK_MESSAGE_SIGNATURE: u16 = 115;
/// Sign a message with an address key.
pub const SKYCOIN_SIGN_MESSAGE: u16 = 116;
/// Derived addresses.
pub const RESPONSE_SKYCOIN_ADDRESS: u16 = 117;
/// Message signature.
pub const RESPONSE_SKYCOIN_SIGN_MESSAGE: u16 = 118;
/// Generate a new seed on the device.
pub const GENERATE_MNEMONIC: u16 = 119;

/// Returns a human-readable name for a message kind.
pub fn kind_name(kind: u16) -> &'static str {
    match kind {
        INITIALIZE => "Initialize",
        PING => "Ping",
        SUCCESS => "Success",
        FAILURE => "Failure",
        CHANGE_PIN => "ChangePin",
        WIPE_DEVICE => "WipeDevice",
        FIRMWARE_ERASE => "FirmwareErase",
        FIRMWARE_UPLOAD => "FirmwareUpload",
        FEATURES => "Features",
        PIN_MATRIX_REQUEST => "PinMatrixRequest",
        PIN_MATRIX_ACK => "PinMatrixAck",
        CANCEL => "Cancel",
        APPLY_SETTINGS => "ApplySettings",
        BUTTON_REQUEST => "ButtonRequest",
        BUTTON_ACK => "ButtonAck",
        BACKUP_DEVICE => "BackupDevice",
        RECOVERY_DEVICE => "RecoveryDevice",
        WORD_REQUEST => "WordRequest",
        WORD_ACK => "WordAck",
        GET_FEATURES => "GetFeatures",
        SKYCOIN_ADDRESS => "SkycoinAddress",
        SKYCOIN_CHECK_MESSAGE_SIGNATURE => "SkycoinCheckMessageSignature",
        SKYCOIN_SIGN_MESSAGE => "SkycoinSignMessage",
        RESPONSE_SKYCOIN_ADDRESS => "ResponseSkycoinAddress",
        RESPONSE_SKYCOIN_SIGN_MESSAGE => "ResponseSkycoinSignMessage",
        GENERATE_MNEMONIC => "GenerateMnemonic",
        _ => "Unknown",
    }
}
