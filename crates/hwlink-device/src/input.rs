//! Interactive input for multi-round device conversations.
//!
//! The device can stop mid-operation and ask the host for a PIN (entered
//! through a scrambled matrix shown on the device screen), for one recovery
//! word, or for a physical button press. The command layer forwards those
//! prompts to an [`InputProvider`] supplied by the caller.

use std::collections::VecDeque;

use crate::messages::{ButtonRequestType, PinMatrixRequestType};

/// Which PIN the device is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMatrixKind {
    /// The PIN currently set on the device.
    Current,
    /// A new PIN, first entry.
    NewFirst,
    /// A new PIN, confirmation entry.
    NewSecond,
}

impl PinMatrixKind {
    pub(crate) fn from_code(code: Option<i32>) -> Self {
        match code.map(PinMatrixRequestType::try_from) {
            Some(Ok(PinMatrixRequestType::NewFirst)) => Self::NewFirst,
            Some(Ok(PinMatrixRequestType::NewSecond)) => Self::NewSecond,
            _ => Self::Current,
        }
    }

    /// Prompt text suitable for a console or dialog.
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Current => "Enter current PIN",
            Self::NewFirst => "Enter new PIN",
            Self::NewSecond => "Re-enter new PIN",
        }
    }
}

/// Why the device is waiting for a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Other,
    ConfirmWord,
    ResetDevice,
    WipeDevice,
    ProtectCall,
    FirmwareCheck,
    Address,
    /// Any code this host does not distinguish.
    Unknown(i32),
}

impl ButtonKind {
    pub(crate) fn from_code(code: Option<i32>) -> Self {
        let Some(raw) = code else {
            return Self::Other;
        };
        match ButtonRequestType::try_from(raw) {
            Ok(ButtonRequestType::Other) => Self::Other,
            Ok(ButtonRequestType::ConfirmWord) => Self::ConfirmWord,
            Ok(ButtonRequestType::ResetDevice) => Self::ResetDevice,
            Ok(ButtonRequestType::WipeDevice) => Self::WipeDevice,
            Ok(ButtonRequestType::ProtectCall) => Self::ProtectCall,
            Ok(ButtonRequestType::FirmwareCheck) => Self::FirmwareCheck,
            Ok(ButtonRequestType::Address) => Self::Address,
            _ => Self::Unknown(raw),
        }
    }
}

/// The provider refused or was unable to answer a prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct InputDeclined {
    pub reason: String,
}

impl InputDeclined {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Source of user answers for device prompts.
pub trait InputProvider {
    /// Positions of the PIN digits on the device's scrambled matrix (`1`-`9`).
    fn pin(&mut self, kind: PinMatrixKind) -> Result<String, InputDeclined>;

    /// One recovery word, in the order the device asks for them.
    fn word(&mut self) -> Result<String, InputDeclined>;

    /// The device is waiting for a physical confirmation. The acknowledgement
    /// is sent right after this returns.
    fn button_request(&mut self, _kind: ButtonKind) {}
}

impl<P: InputProvider + ?Sized> InputProvider for &mut P {
    fn pin(&mut self, kind: PinMatrixKind) -> Result<String, InputDeclined> {
        (**self).pin(kind)
    }

    fn word(&mut self) -> Result<String, InputDeclined> {
        (**self).word()
    }

    fn button_request(&mut self, kind: ButtonKind) {
        (**self).button_request(kind)
    }
}

/// Answers prompts from pre-programmed queues; declines once a queue runs dry.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    pins: VecDeque<String>,
    words: VecDeque<String>,
    pin_prompts: Vec<PinMatrixKind>,
    buttons: Vec<ButtonKind>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue PIN answers.
    pub fn with_pins<I, S>(mut self, pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pins.extend(pins.into_iter().map(Into::into));
        self
    }

    /// Queue recovery words.
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(words.into_iter().map(Into::into));
        self
    }

    /// PIN prompts seen so far, in order.
    pub fn pin_prompts(&self) -> &[PinMatrixKind] {
        &self.pin_prompts
    }

    /// Button requests seen so far, in order.
    pub fn buttons(&self) -> &[ButtonKind] {
        &self.buttons
    }

    /// Unused recovery words.
    pub fn words_left(&self) -> usize {
        self.words.len()
    }
}

impl InputProvider for ScriptedInput {
    fn pin(&mut self, kind: PinMatrixKind) -> Result<String, InputDeclined> {
        self.pin_prompts.push(kind);
        self.pins
            .pop_front()
            .ok_or_else(|| InputDeclined::new("no scripted PIN left"))
    }

    fn word(&mut self) -> Result<String, InputDeclined> {
        self.words
            .pop_front()
            .ok_or_else(|| InputDeclined::new("no scripted word left"))
    }

    fn button_request(&mut self, kind: ButtonKind) {
        self.buttons.push(kind);
    }
}

/// Declines every prompt. For non-interactive callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineInput;

impl InputProvider for DeclineInput {
    fn pin(&mut self, _kind: PinMatrixKind) -> Result<String, InputDeclined> {
        Err(InputDeclined::new("PIN entry is not available"))
    }

    fn word(&mut self) -> Result<String, InputDeclined> {
        Err(InputDeclined::new("word entry is not available"))
    }
}

/// Check a PIN answer: one to nine matrix positions, each `1`-`9`.
pub fn validate_pin(pin: &str) -> Result<(), String> {
    if pin.is_empty() {
        return Err("PIN is empty".to_string());
    }
    if pin.len() > 9 {
        return Err(format!("PIN is too long ({} digits, max 9)", pin.len()));
    }
    if let Some(c) = pin.chars().find(|c| !matches!(c, '1'..='9')) {
        return Err(format!("PIN contains invalid character {c:?} (expected 1-9)"));
    }
    Ok(())
}
