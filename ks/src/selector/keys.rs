//! Logical key events and the sources that produce them

use std::collections::VecDeque;
use std::io::Read;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use eyre::{Context, Result};
use tracing::{debug, trace};

/// Platform-independent menu input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalKey {
    Char(char),
    Confirm,
    Quit,
    Up,
    Down,
    Left,
    Right,
    /// Interrupt (Ctrl-C) or end of input
    Cancel,
}

/// Keys with a menu meaning besides their literal character
fn from_char(c: char) -> LogicalKey {
    match c {
        'q' => LogicalKey::Quit,
        'k' => LogicalKey::Up,
        'j' => LogicalKey::Down,
        'h' => LogicalKey::Left,
        'l' => LogicalKey::Right,
        other => LogicalKey::Char(other),
    }
}

/// Map a crossterm key event; releases and keys without a meaning are None
pub fn from_key_event(key: KeyEvent) -> Option<LogicalKey> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => Some(LogicalKey::Cancel),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(from_char(c)),
        KeyCode::Enter => Some(LogicalKey::Confirm),
        KeyCode::Esc => Some(LogicalKey::Quit),
        KeyCode::Up => Some(LogicalKey::Up),
        KeyCode::Down => Some(LogicalKey::Down),
        KeyCode::Left => Some(LogicalKey::Left),
        KeyCode::Right => Some(LogicalKey::Right),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    #[default]
    Ground,
    /// Saw ESC
    Escape,
    /// Saw ESC [ or ESC O, waiting for the final byte
    Sequence,
    /// Collecting a multi-byte UTF-8 character
    Utf8 { needed: usize },
}

/// Incremental decoder from raw terminal bytes to logical keys
#[derive(Debug, Default)]
pub struct KeyDecoder {
    state: DecodeState,
    utf8: Vec<u8>,
    after_cr: bool,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns the keys it completes (usually zero or one)
    pub fn push(&mut self, byte: u8) -> Vec<LogicalKey> {
        trace!(byte, state = ?self.state, "KeyDecoder::push: called");
        let after_cr = std::mem::take(&mut self.after_cr);

        match self.state {
            DecodeState::Escape => match byte {
                b'[' | b'O' => {
                    self.state = DecodeState::Sequence;
                    Vec::new()
                }
                _ => {
                    // A lone ESC followed by an ordinary byte
                    self.state = DecodeState::Ground;
                    let mut keys = vec![LogicalKey::Quit];
                    keys.extend(self.push(byte));
                    keys
                }
            },
            DecodeState::Sequence => match byte {
                // Parameters such as `1;5` in ESC [ 1 ; 5 A
                b'0'..=b'9' | b';' => Vec::new(),
                _ => {
                    self.state = DecodeState::Ground;
                    match byte {
                        b'A' => vec![LogicalKey::Up],
                        b'B' => vec![LogicalKey::Down],
                        b'C' => vec![LogicalKey::Right],
                        b'D' => vec![LogicalKey::Left],
                        _ => Vec::new(),
                    }
                }
            },
            DecodeState::Utf8 { needed } => {
                if byte & 0xC0 != 0x80 {
                    // Broken sequence; drop it and start over with this byte
                    self.utf8.clear();
                    self.state = DecodeState::Ground;
                    return self.push(byte);
                }
                self.utf8.push(byte);
                if needed > 1 {
                    self.state = DecodeState::Utf8 { needed: needed - 1 };
                    return Vec::new();
                }
                self.state = DecodeState::Ground;
                let bytes = std::mem::take(&mut self.utf8);
                match std::str::from_utf8(&bytes).ok().and_then(|s| s.chars().next()) {
                    Some(c) => vec![LogicalKey::Char(c)],
                    None => Vec::new(),
                }
            }
            DecodeState::Ground => match byte {
                0x1B => {
                    self.state = DecodeState::Escape;
                    Vec::new()
                }
                b'\r' => {
                    self.after_cr = true;
                    vec![LogicalKey::Confirm]
                }
                b'\n' if after_cr => Vec::new(),
                b'\n' => vec![LogicalKey::Confirm],
                0x03 | 0x04 => vec![LogicalKey::Cancel],
                0x20..=0x7E => vec![from_char(byte as char)],
                0xC2..=0xDF => self.start_utf8(byte, 1),
                0xE0..=0xEF => self.start_utf8(byte, 2),
                0xF0..=0xF4 => self.start_utf8(byte, 3),
                _ => Vec::new(),
            },
        }
    }

    /// Flush at end of input; a trailing lone ESC still means Quit
    pub fn finish(&mut self) -> Vec<LogicalKey> {
        let state = std::mem::take(&mut self.state);
        self.utf8.clear();
        match state {
            DecodeState::Escape => vec![LogicalKey::Quit],
            _ => Vec::new(),
        }
    }

    fn start_utf8(&mut self, byte: u8, needed: usize) -> Vec<LogicalKey> {
        self.utf8.clear();
        self.utf8.push(byte);
        self.state = DecodeState::Utf8 { needed };
        Vec::new()
    }
}

/// Decode a complete byte string
pub fn decode_all(bytes: &[u8]) -> Vec<LogicalKey> {
    let mut decoder = KeyDecoder::new();
    let mut keys: Vec<LogicalKey> = bytes.iter().flat_map(|b| decoder.push(*b)).collect();
    keys.extend(decoder.finish());
    keys
}

/// Blocking source of one logical key per call
pub trait KeySource {
    fn next_key(&mut self) -> Result<LogicalKey>;
}

/// Keys from the interactive terminal (raw mode expected)
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> Result<LogicalKey> {
        loop {
            if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                if let Some(logical) = from_key_event(key) {
                    debug!(?logical, "TerminalKeys::next_key: key");
                    return Ok(logical);
                }
            }
        }
    }
}

/// Keys decoded from a byte stream such as piped stdin
///
/// End of input yields `Cancel` forever after.
pub struct ByteKeys<R: Read> {
    reader: R,
    decoder: KeyDecoder,
    pending: VecDeque<LogicalKey>,
    eof: bool,
}

impl<R: Read> ByteKeys<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            decoder: KeyDecoder::new(),
            pending: VecDeque::new(),
            eof: false,
        }
    }
}

impl<R: Read> KeySource for ByteKeys<R> {
    fn next_key(&mut self) -> Result<LogicalKey> {
        let mut buf = [0u8; 1];
        while self.pending.is_empty() {
            if self.eof {
                return Ok(LogicalKey::Cancel);
            }
            let n = self.reader.read(&mut buf).context("Failed to read key input")?;
            if n == 0 {
                debug!("ByteKeys::next_key: end of input");
                self.eof = true;
                self.pending.extend(self.decoder.finish());
            } else {
                self.pending.extend(self.decoder.push(buf[0]));
            }
        }
        Ok(self.pending.pop_front().unwrap_or(LogicalKey::Cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LogicalKey::*;

    #[test]
    fn test_arrow_sequences() {
        assert_eq!(decode_all(b"\x1b[A\x1b[B\x1b[C\x1b[D"), vec![Up, Down, Right, Left]);
        assert_eq!(decode_all(b"\x1bOA\x1bOD"), vec![Up, Left]);
        // Modified arrows carry parameters
        assert_eq!(decode_all(b"\x1b[1;5C"), vec![Right]);
        // Unknown sequences vanish instead of leaking bytes
        assert_eq!(decode_all(b"\x1b[3~x"), vec![Char('x')]);
    }

    #[test]
    fn test_enter_variants() {
        assert_eq!(decode_all(b"\r"), vec![Confirm]);
        assert_eq!(decode_all(b"\n"), vec![Confirm]);
        assert_eq!(decode_all(b"\r\n\n"), vec![Confirm, Confirm]);
    }

    #[test]
    fn test_control_and_quit() {
        assert_eq!(decode_all(b"\x03"), vec![Cancel]);
        assert_eq!(decode_all(b"q"), vec![Quit]);
        assert_eq!(decode_all(b"\x1b"), vec![Quit]);
        assert_eq!(decode_all(b"\x1bx"), vec![Quit, Char('x')]);
        assert_eq!(decode_all(b"\x1b\x1b[A"), vec![Quit, Up]);
    }

    #[test]
    fn test_vi_keys_and_text() {
        assert_eq!(decode_all(b"hjklz1"), vec![Left, Down, Up, Right, Char('z'), Char('1')]);
        assert_eq!(decode_all("é한".as_bytes()), vec![Char('é'), Char('한')]);
        // A truncated multibyte char is dropped, the following byte survives
        assert_eq!(decode_all(&[0xED, b'z']), vec![Char('z')]);
    }

    #[test]
    fn test_from_key_event() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(from_key_event(ctrl_c), Some(Cancel));
        assert_eq!(from_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)), Some(Char('c')));
        assert_eq!(from_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)), Some(Confirm));
        assert_eq!(from_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)), Some(Quit));
        assert_eq!(from_key_event(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)), Some(Left));
        assert_eq!(from_key_event(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE)), None);

        let mut release = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(from_key_event(release), None);
    }

    #[test]
    fn test_byte_keys_cancel_at_eof() {
        let mut keys = ByteKeys::new(&b"j\r"[..]);
        assert_eq!(keys.next_key().unwrap(), Down);
        assert_eq!(keys.next_key().unwrap(), Confirm);
        assert_eq!(keys.next_key().unwrap(), Cancel);
        assert_eq!(keys.next_key().unwrap(), Cancel);
    }
}
