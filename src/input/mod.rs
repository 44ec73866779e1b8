//! Input Encoding Module
//!
//! Translates key events and pasted text into the byte sequences a shell
//! expects. The output depends on the terminal modes:
//! - Application cursor mode (DECCKM)
//! - Application keypad mode (DECKPAM/DECKPNM)
//! - Line feed/new line mode (LNM)
//! - Bracketed paste (DECSET 2004)
//!
//! Modifier keys add an xterm-style parameter to CSI sequences.

use serde::{Deserialize, Serialize};

use crate::core::Modes;

const BRACKETED_PASTE_START: &str = "\x1b[200~";
const BRACKETED_PASTE_END: &str = "\x1b[201~";

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    /// Get the modifier parameter for CSI sequences (1 + bitmask)
    /// Shift=1, Alt=2, Ctrl=4
    pub fn as_csi_param(&self) -> u8 {
        let mut param = 1;
        if self.shift {
            param += 1;
        }
        if self.alt {
            param += 2;
        }
        if self.ctrl {
            param += 4;
        }
        param
    }

    /// Check if any modifier is pressed
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

/// Keys the encoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A printable character
    Char(char),

    // Editing
    Enter,
    Tab,
    Backspace,
    Escape,

    // Cursor keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,

    /// Function key F1, F2, ...
    F(u8),

    // Keypad
    KeypadEnter,
    KeypadPlus,
    KeypadMinus,
    KeypadMultiply,
    KeypadDivide,
    KeypadDecimal,
    /// Keypad digit 0-9
    KeypadDigit(u8),
}

/// A key press with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        KeyEvent::new(key)
    }
}

/// Encode a key press. Keys with no encoding produce an empty vector.
pub fn encode_key(event: &KeyEvent, modes: &Modes) -> Vec<u8> {
    let mods = event.modifiers;
    let app_keypad = modes.application_keypad;

    match event.key {
        Key::Char(c) => encode_char(c, mods),

        Key::Enter => alt_prefixed(mods, newline(modes)),
        Key::Tab if mods.shift => b"\x1b[Z".to_vec(),
        Key::Tab => alt_prefixed(mods, vec![0x09]),
        Key::Backspace if mods.ctrl => vec![0x08],
        Key::Backspace => alt_prefixed(mods, vec![0x7f]),
        Key::Escape => alt_prefixed(mods, vec![0x1b]),

        // Cursor keys
        Key::Up => encode_cursor_key(b'A', mods, modes.application_cursor),
        Key::Down => encode_cursor_key(b'B', mods, modes.application_cursor),
        Key::Right => encode_cursor_key(b'C', mods, modes.application_cursor),
        Key::Left => encode_cursor_key(b'D', mods, modes.application_cursor),
        Key::Home => encode_cursor_key(b'H', mods, modes.application_cursor),
        Key::End => encode_cursor_key(b'F', mods, modes.application_cursor),

        // Navigation keys
        Key::Insert => encode_tilde_key(2, mods),
        Key::Delete => encode_tilde_key(3, mods),
        Key::PageUp => encode_tilde_key(5, mods),
        Key::PageDown => encode_tilde_key(6, mods),

        Key::F(n) => encode_function_key(n, mods),

        // Keypad keys
        Key::KeypadEnter if app_keypad => b"\x1bOM".to_vec(),
        Key::KeypadEnter => newline(modes),
        Key::KeypadPlus => encode_keypad(b'k', b'+', app_keypad),
        Key::KeypadMinus => encode_keypad(b'm', b'-', app_keypad),
        Key::KeypadMultiply => encode_keypad(b'j', b'*', app_keypad),
        Key::KeypadDivide => encode_keypad(b'o', b'/', app_keypad),
        Key::KeypadDecimal => encode_keypad(b'n', b'.', app_keypad),
        Key::KeypadDigit(d) if d <= 9 => encode_keypad(b'p' + d, b'0' + d, app_keypad),
        Key::KeypadDigit(_) => Vec::new(),
    }
}

/// Encode pasted text. Line endings become CR; in bracketed paste mode the
/// text is wrapped in paste markers and any end marker inside it is removed.
pub fn encode_paste(text: &str, modes: &Modes) -> Vec<u8> {
    let mut normalized = text.replace("\r\n", "\r").replace('\n', "\r");

    if !modes.bracketed_paste {
        return normalized.into_bytes();
    }

    // Removing one marker can splice together another
    while normalized.contains(BRACKETED_PASTE_END) {
        normalized = normalized.replace(BRACKETED_PASTE_END, "");
    }

    let mut bytes = Vec::with_capacity(normalized.len() + 12);
    bytes.extend_from_slice(BRACKETED_PASTE_START.as_bytes());
    bytes.extend_from_slice(normalized.as_bytes());
    bytes.extend_from_slice(BRACKETED_PASTE_END.as_bytes());
    bytes
}

/// Encode a character with modifiers
fn encode_char(c: char, modifiers: Modifiers) -> Vec<u8> {
    let base = match control_byte(c) {
        Some(byte) if modifiers.ctrl => vec![byte],
        _ => {
            let mut buf = [0u8; 4];
            c.encode_utf8(&mut buf).as_bytes().to_vec()
        }
    };
    alt_prefixed(modifiers, base)
}

/// C0 byte produced by Ctrl+`c`, if any
fn control_byte(c: char) -> Option<u8> {
    match c {
        'a'..='z' | 'A'..='Z' => Some((c.to_ascii_uppercase() as u8) - b'@'),
        '@' | ' ' | '2' => Some(0x00),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '7' | '/' => Some(0x1f),
        '?' | '8' => Some(0x7f),
        _ => None,
    }
}

fn alt_prefixed(modifiers: Modifiers, bytes: Vec<u8>) -> Vec<u8> {
    if modifiers.alt {
        let mut prefixed = Vec::with_capacity(bytes.len() + 1);
        prefixed.push(0x1b);
        prefixed.extend(bytes);
        prefixed
    } else {
        bytes
    }
}

fn newline(modes: &Modes) -> Vec<u8> {
    if modes.linefeed_newline {
        b"\r\n".to_vec()
    } else {
        b"\r".to_vec()
    }
}

/// Encode a cursor key (arrows, Home, End)
fn encode_cursor_key(code: u8, modifiers: Modifiers, application_mode: bool) -> Vec<u8> {
    if modifiers.any() {
        // With modifiers: CSI 1 ; modifier code
        let param = modifiers.as_csi_param();
        format!("\x1b[1;{}{}", param, code as char).into_bytes()
    } else if application_mode {
        // Application mode: SS3 code
        vec![0x1b, b'O', code]
    } else {
        // Normal mode: CSI code
        vec![0x1b, b'[', code]
    }
}

/// Encode a `CSI n ~` key (Insert, Delete, PgUp, PgDn, F5-F12)
fn encode_tilde_key(number: u8, modifiers: Modifiers) -> Vec<u8> {
    if modifiers.any() {
        let param = modifiers.as_csi_param();
        format!("\x1b[{};{}~", number, param).into_bytes()
    } else {
        format!("\x1b[{}~", number).into_bytes()
    }
}

/// Encode F1-F12; F1-F4 use SS3, the rest `CSI n ~`
fn encode_function_key(number: u8, modifiers: Modifiers) -> Vec<u8> {
    let code = match number {
        1 => b'P',
        2 => b'Q',
        3 => b'R',
        4 => b'S',
        5 => return encode_tilde_key(15, modifiers),
        6 => return encode_tilde_key(17, modifiers),
        7 => return encode_tilde_key(18, modifiers),
        8 => return encode_tilde_key(19, modifiers),
        9 => return encode_tilde_key(20, modifiers),
        10 => return encode_tilde_key(21, modifiers),
        11 => return encode_tilde_key(23, modifiers),
        12 => return encode_tilde_key(24, modifiers),
        _ => return Vec::new(),
    };

    if modifiers.any() {
        let param = modifiers.as_csi_param();
        format!("\x1b[1;{}{}", param, code as char).into_bytes()
    } else {
        vec![0x1b, b'O', code]
    }
}

/// Encode a keypad key: SS3 in application keypad mode, the literal otherwise
fn encode_keypad(app_code: u8, normal_code: u8, application_mode: bool) -> Vec<u8> {
    if application_mode {
        vec![0x1b, b'O', app_code]
    } else {
        vec![normal_code]
    }
}
