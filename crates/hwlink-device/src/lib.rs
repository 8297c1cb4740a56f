//! Device sessions and the command protocol for hardware signing tokens.
//!
//! This is the "just works" layer. A [`Device`] drives multi-round
//! conversations (button confirmation, PIN entry, recovery words, firmware
//! upload) over the packet framing of `hwlink-frame`, opening a fresh
//! transport handle for every round trip. User answers come from an
//! [`InputProvider`] the caller supplies.

pub mod device;
pub mod error;
pub mod firmware;
pub mod input;
pub mod messages;
pub mod session;

#[cfg(test)]
mod testing;

pub use device::{
    Device, DeviceConfig, RecoveryOptions, DEFAULT_READ_TIMEOUT, MNEMONIC_WORD_COUNTS,
};
pub use error::{DeviceError, Result};
pub use input::{
    validate_pin, ButtonKind, DeclineInput, InputDeclined, InputProvider, PinMatrixKind,
    ScriptedInput,
};
pub use messages::{DeviceFeatures, DeviceMessage};
pub use session::DeviceSession;
