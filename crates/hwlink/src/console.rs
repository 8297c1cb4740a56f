use std::io::{self, BufRead, Write};

use hwlink_device::{ButtonKind, InputDeclined, InputProvider, PinMatrixKind};

/// Matrix position layout, matching the keypad the device shows.
const PIN_LAYOUT: &str = "    7 8 9\n    4 5 6\n    1 2 3";

/// Prompts on a terminal and reads answers line by line.
///
/// An empty line or end of input declines the prompt.
pub struct ConsoleInput<R, W> {
    reader: R,
    prompt: W,
    words_asked: usize,
}

impl ConsoleInput<io::StdinLock<'static>, io::Stderr> {
    /// Read from stdin, prompt on stderr.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsoleInput<R, W> {
    pub fn new(reader: R, prompt: W) -> Self {
        Self {
            reader,
            prompt,
            words_asked: 0,
        }
    }

    fn say(&mut self, text: &str) {
        let _ = writeln!(self.prompt, "{text}");
    }

    fn ask(&mut self, question: &str) -> Result<String, InputDeclined> {
        let _ = write!(self.prompt, "{question}: ");
        let _ = self.prompt.flush();

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Err(InputDeclined::new("input closed")),
            Ok(_) => match line.trim() {
                "" => Err(InputDeclined::new("no answer given")),
                answer => Ok(answer.to_string()),
            },
            Err(err) => Err(InputDeclined::new(format!("failed to read input: {err}"))),
        }
    }
}

impl<R: BufRead, W: Write> InputProvider for ConsoleInput<R, W> {
    fn pin(&mut self, kind: PinMatrixKind) -> Result<String, InputDeclined> {
        self.say("Type the positions of your PIN digits as laid out on the device:");
        self.say(PIN_LAYOUT);
        self.ask(kind.prompt())
    }

    fn word(&mut self) -> Result<String, InputDeclined> {
        self.words_asked += 1;
        let question = format!("Word #{} (as requested on the device)", self.words_asked);
        self.ask(&question)
    }

    fn button_request(&mut self, kind: ButtonKind) {
        let what = match kind {
            ButtonKind::WipeDevice => "wipe",
            ButtonKind::Address => "address",
            ButtonKind::FirmwareCheck => "firmware",
            ButtonKind::ConfirmWord => "word",
            ButtonKind::ResetDevice => "seed generation",
            _ => "action",
        };
        self.say(&format!("Confirm the {what} on the device..."));
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn console(input: &str) -> ConsoleInput<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleInput::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn pin_prompt_shows_layout_and_reads_answer() {
        let mut input = console("  1234 \n");
        assert_eq!(input.pin(PinMatrixKind::NewFirst).unwrap(), "1234");

        let shown = String::from_utf8(input.prompt.clone()).unwrap();
        assert!(shown.contains("7 8 9"));
        assert!(shown.contains("Enter new PIN: "));
    }

    #[test]
    fn empty_line_declines() {
        let mut input = console("\nabandon\n");
        assert!(input.pin(PinMatrixKind::Current).is_err());
        assert_eq!(input.word().unwrap(), "abandon");
    }

    #[test]
    fn eof_declines() {
        let mut input = console("");
        let err = input.word().unwrap_err();
        assert_eq!(err.reason, "input closed");
    }

    #[test]
    fn words_are_numbered() {
        let mut input = console("one\ntwo\n");
        input.word().unwrap();
        input.word().unwrap();
        let shown = String::from_utf8(input.prompt.clone()).unwrap();
        assert!(shown.contains("Word #1"));
        assert!(shown.contains("Word #2"));
    }

    #[test]
    fn button_request_prints_notice() {
        let mut input = console("");
        input.button_request(ButtonKind::WipeDevice);
        let shown = String::from_utf8(input.prompt.clone()).unwrap();
        assert_eq!(shown, "Confirm the wipe on the device...\n");
    }
}
