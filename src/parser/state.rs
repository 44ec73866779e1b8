//! Parser State Machine
//!
//! Implements a VT500-series compatible parser state machine.
//! The parser handles arbitrary chunk boundaries and produces
//! semantic actions for the terminal state machine.
//!
//! # State Machine
//!
//! The parser follows the state machine model described in:
//! - "A parser for DEC's ANSI-compatible video terminals" by Paul Williams
//! - https://vt100.net/emu/dec_ansi_parser
//!
//! States:
//! - Ground: Normal text processing, UTF-8 decoding
//! - Escape: After ESC, waiting for next byte
//! - EscapeIntermediate: ESC followed by intermediate bytes
//! - CsiEntry: After CSI (ESC [), before any parameter
//! - CsiParam: Collecting CSI parameters
//! - CsiIntermediate: CSI with intermediate bytes
//! - CsiIgnore: Malformed CSI, consumed through its final byte
//! - OscString: Collecting OSC payload
//! - StringIgnore: DCS/SOS/PM/APC body, discarded
//! - StringTerminator: ESC seen inside a string, waiting for `\`

use tracing::trace;

use super::action::{Action, ControlCode, CsiAction, EscAction, OscAction};

/// Maximum number of CSI parameters kept; the rest are ignored
pub const MAX_PARAMS: usize = 32;

/// Maximum number of intermediate bytes kept
const MAX_INTERMEDIATES: usize = 4;

/// Maximum OSC payload size in bytes; the excess is dropped
pub const MAX_OSC_LEN: usize = 64 * 1024;

const REPLACEMENT: char = '\u{FFFD}';

const CAN: u8 = 0x18;
const SUB: u8 = 0x1A;
const ESC: u8 = 0x1B;
const BEL: u8 = 0x07;
const DEL: u8 = 0x7F;

/// Kind of string an ESC interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringKind {
    Osc,
    Ignored,
}

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    OscString,
    StringIgnore,
    StringTerminator(StringKind),
}

/// The terminal parser
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    /// Intermediate bytes collected during parsing
    intermediates: Vec<u8>,
    /// Parameters for CSI sequences
    params: Vec<u16>,
    /// Current parameter being built
    current_param: u16,
    /// Whether we've seen a digit for the current parameter
    param_has_digit: bool,
    /// Private marker byte (`?`, `>`, `<`, `=`)
    private_marker: Option<u8>,
    /// OSC string payload
    osc_string: Vec<u8>,
    /// Bytes of an incomplete UTF-8 sequence
    utf8_buffer: [u8; 4],
    utf8_len: usize,
    /// Total length of the UTF-8 sequence being collected (0 when idle)
    utf8_expected: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the ground state
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            intermediates: Vec::with_capacity(MAX_INTERMEDIATES),
            params: Vec::with_capacity(16),
            current_param: 0,
            param_has_digit: false,
            private_marker: None,
            osc_string: Vec::with_capacity(256),
            utf8_buffer: [0; 4],
            utf8_len: 0,
            utf8_expected: 0,
        }
    }

    /// Reset the parser to initial state, dropping any partial sequence
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.clear_params();
        self.osc_string.clear();
        self.clear_utf8();
    }

    /// True when no sequence or UTF-8 character is partially parsed
    pub fn is_ground(&self) -> bool {
        self.state == State::Ground && self.utf8_expected == 0
    }

    /// Clear parameter state
    fn clear_params(&mut self) {
        self.intermediates.clear();
        self.params.clear();
        self.current_param = 0;
        self.param_has_digit = false;
        self.private_marker = None;
    }

    fn clear_utf8(&mut self) {
        self.utf8_len = 0;
        self.utf8_expected = 0;
    }

    /// Process a chunk of bytes, returning actions in stream order
    pub fn feed(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::with_capacity(data.len());

        for &byte in data {
            self.advance(byte, &mut actions);
        }

        actions
    }

    /// Process a single byte
    fn advance(&mut self, byte: u8, out: &mut Vec<Action>) {
        if self.utf8_expected > 0 {
            if (0x80..=0xBF).contains(&byte) {
                self.utf8_continuation(byte, out);
                return;
            }
            // Interrupted sequence: emit a replacement and handle the byte fresh
            trace!(byte, "truncated UTF-8 sequence");
            self.clear_utf8();
            out.push(Action::Print(REPLACEMENT));
        }

        match byte {
            CAN | SUB => {
                if self.state != State::Ground {
                    trace!(byte, "sequence cancelled");
                }
                self.state = State::Ground;
                self.clear_params();
                self.osc_string.clear();
                return;
            }
            ESC => {
                self.begin_escape(out);
                return;
            }
            _ => {}
        }

        match self.state {
            State::Ground => self.process_ground(byte, out),
            State::Escape => self.process_escape(byte, out),
            State::EscapeIntermediate => self.process_escape_intermediate(byte, out),
            State::CsiEntry => self.process_csi_entry(byte, out),
            State::CsiParam => self.process_csi_param(byte, out),
            State::CsiIntermediate => self.process_csi_intermediate(byte, out),
            State::CsiIgnore => self.process_csi_ignore(byte, out),
            State::OscString => self.process_osc_string(byte, out),
            State::StringIgnore => {}
            State::StringTerminator(kind) => self.process_string_terminator(kind, byte, out),
        }
    }

    fn begin_escape(&mut self, out: &mut Vec<Action>) {
        match self.state {
            State::OscString => self.state = State::StringTerminator(StringKind::Osc),
            State::StringIgnore => self.state = State::StringTerminator(StringKind::Ignored),
            State::StringTerminator(kind) => {
                // ESC ESC: finish the string leniently, the second ESC starts anew
                self.finish_string(kind, out);
                self.clear_params();
                self.state = State::Escape;
            }
            _ => {
                self.clear_params();
                self.state = State::Escape;
            }
        }
    }

    fn execute(&mut self, byte: u8, out: &mut Vec<Action>) {
        out.push(Action::Control(ControlCode::from_byte(byte)));
    }

    fn process_ground(&mut self, byte: u8, out: &mut Vec<Action>) {
        match byte {
            0x00..=0x1F => self.execute(byte, out),
            0x20..=0x7E => out.push(Action::Print(byte as char)),
            DEL => {}
            0xC2..=0xDF => self.begin_utf8(byte, 2),
            0xE0..=0xEF => self.begin_utf8(byte, 3),
            0xF0..=0xF4 => self.begin_utf8(byte, 4),
            _ => {
                trace!(byte, "invalid UTF-8 lead byte");
                out.push(Action::Print(REPLACEMENT));
            }
        }
    }

    fn begin_utf8(&mut self, byte: u8, expected: usize) {
        self.utf8_buffer[0] = byte;
        self.utf8_len = 1;
        self.utf8_expected = expected;
    }

    fn utf8_continuation(&mut self, byte: u8, out: &mut Vec<Action>) {
        self.utf8_buffer[self.utf8_len] = byte;
        self.utf8_len += 1;

        if self.utf8_len < self.utf8_expected {
            return;
        }

        // Overlong forms, surrogates and values past U+10FFFF fail here
        let c = std::str::from_utf8(&self.utf8_buffer[..self.utf8_len])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(REPLACEMENT);
        self.clear_utf8();
        out.push(Action::Print(c));
    }

    fn process_escape(&mut self, byte: u8, out: &mut Vec<Action>) {
        match byte {
            0x00..=0x1F => self.execute(byte, out),
            0x20..=0x2F => {
                self.collect_intermediate(byte);
                self.state = State::EscapeIntermediate;
            }
            b'[' => self.state = State::CsiEntry,
            b']' => {
                self.osc_string.clear();
                self.state = State::OscString;
            }
            b'P' | b'X' | b'^' | b'_' => self.state = State::StringIgnore,
            0x30..=0x7E => {
                self.state = State::Ground;
                self.dispatch_esc(byte, out);
            }
            DEL => {}
            _ => {
                trace!(byte, "unexpected byte after ESC");
                self.state = State::Ground;
            }
        }
    }

    fn process_escape_intermediate(&mut self, byte: u8, out: &mut Vec<Action>) {
        match byte {
            0x00..=0x1F => self.execute(byte, out),
            0x20..=0x2F => self.collect_intermediate(byte),
            0x30..=0x7E => {
                self.state = State::Ground;
                self.dispatch_esc(byte, out);
            }
            DEL => {}
            _ => {
                trace!(byte, "unexpected byte in escape intermediate");
                self.state = State::Ground;
            }
        }
    }

    fn process_csi_entry(&mut self, byte: u8, out: &mut Vec<Action>) {
        match byte {
            0x00..=0x1F => self.execute(byte, out),
            b'0'..=b'9' => {
                self.collect_digit(byte);
                self.state = State::CsiParam;
            }
            b';' | b':' => {
                self.push_param();
                self.state = State::CsiParam;
            }
            b'<'..=b'?' => {
                self.private_marker = Some(byte);
                self.state = State::CsiParam;
            }
            0x20..=0x2F => {
                self.collect_intermediate(byte);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7E => self.dispatch_csi(byte, out),
            DEL => {}
            _ => self.state = State::CsiIgnore,
        }
    }

    fn process_csi_param(&mut self, byte: u8, out: &mut Vec<Action>) {
        match byte {
            0x00..=0x1F => self.execute(byte, out),
            b'0'..=b'9' => self.collect_digit(byte),
            b';' | b':' => self.push_param(),
            0x20..=0x2F => {
                self.finish_params();
                self.collect_intermediate(byte);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7E => {
                self.finish_params();
                self.dispatch_csi(byte, out);
            }
            DEL => {}
            _ => {
                trace!(byte, "malformed CSI parameter");
                self.state = State::CsiIgnore;
            }
        }
    }

    fn process_csi_intermediate(&mut self, byte: u8, out: &mut Vec<Action>) {
        match byte {
            0x00..=0x1F => self.execute(byte, out),
            0x20..=0x2F => self.collect_intermediate(byte),
            0x40..=0x7E => self.dispatch_csi(byte, out),
            DEL => {}
            _ => {
                trace!(byte, "malformed CSI intermediate");
                self.state = State::CsiIgnore;
            }
        }
    }

    fn process_csi_ignore(&mut self, byte: u8, out: &mut Vec<Action>) {
        match byte {
            0x00..=0x1F => self.execute(byte, out),
            0x40..=0x7E => {
                self.clear_params();
                self.state = State::Ground;
            }
            _ => {}
        }
    }

    fn process_osc_string(&mut self, byte: u8, out: &mut Vec<Action>) {
        match byte {
            BEL => self.finish_string(StringKind::Osc, out),
            0x00..=0x1F => {}
            _ => {
                if self.osc_string.len() < MAX_OSC_LEN {
                    self.osc_string.push(byte);
                }
            }
        }
    }

    fn process_string_terminator(&mut self, kind: StringKind, byte: u8, out: &mut Vec<Action>) {
        self.finish_string(kind, out);

        if byte != b'\\' {
            // Lenient termination: the ESC begins a new sequence
            self.clear_params();
            self.state = State::Escape;
            self.process_escape(byte, out);
        }
    }

    fn finish_string(&mut self, kind: StringKind, out: &mut Vec<Action>) {
        match kind {
            StringKind::Osc => {
                let payload = String::from_utf8_lossy(&self.osc_string).into_owned();
                self.osc_string.clear();
                out.push(Action::Osc(OscAction::from_payload(payload)));
            }
            StringKind::Ignored => out.push(Action::DcsIgnored),
        }
        self.state = State::Ground;
    }

    fn collect_intermediate(&mut self, byte: u8) {
        if self.intermediates.len() < MAX_INTERMEDIATES {
            self.intermediates.push(byte);
        }
    }

    fn collect_digit(&mut self, byte: u8) {
        self.current_param = self
            .current_param
            .saturating_mul(10)
            .saturating_add(u16::from(byte - b'0'));
        self.param_has_digit = true;
    }

    fn push_param(&mut self) {
        if self.params.len() < MAX_PARAMS {
            self.params.push(self.current_param);
        }
        self.current_param = 0;
        self.param_has_digit = false;
    }

    /// Push the trailing parameter, if any was started
    fn finish_params(&mut self) {
        if self.param_has_digit || !self.params.is_empty() {
            self.push_param();
        }
    }

    fn dispatch_csi(&mut self, final_byte: u8, out: &mut Vec<Action>) {
        out.push(Action::Csi(CsiAction {
            final_byte,
            params: std::mem::take(&mut self.params),
            intermediates: std::mem::take(&mut self.intermediates),
            private_marker: self.private_marker.take(),
        }));
        self.clear_params();
        self.state = State::Ground;
    }

    fn dispatch_esc(&mut self, final_byte: u8, out: &mut Vec<Action>) {
        out.push(Action::Esc(EscAction::from_sequence(
            &self.intermediates,
            final_byte,
        )));
        self.clear_params();
    }
}
