//! Terminal Actions
//!
//! Semantic operations produced by the parser. Actions carry no behavior;
//! the terminal state machine decides what each one means.

use serde::{Deserialize, Serialize};

use crate::core::{Charset, Color, NamedColor};

/// A terminal action produced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Print a character to the screen
    Print(char),

    /// Execute a C0 control character
    Control(ControlCode),

    /// Execute a CSI (Control Sequence Introducer) command
    Csi(CsiAction),

    /// Execute an OSC (Operating System Command)
    Osc(OscAction),

    /// Execute an ESC sequence (non-CSI)
    Esc(EscAction),

    /// A DCS, SOS, PM or APC string was consumed and discarded
    DcsIgnored,
}

/// C0 control codes (0x00-0x1F) that reach the state machine.
///
/// ESC, CAN and SUB never appear here; the parser consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCode {
    /// NUL - Null (ignored)
    Null,
    /// BEL - Bell
    Bell,
    /// BS - Backspace
    Backspace,
    /// HT - Horizontal Tab
    Tab,
    /// LF - Line Feed
    LineFeed,
    /// VT - Vertical Tab (treated as LF)
    VerticalTab,
    /// FF - Form Feed (treated as LF)
    FormFeed,
    /// CR - Carriage Return
    CarriageReturn,
    /// SO - Shift Out (switch to G1 charset)
    ShiftOut,
    /// SI - Shift In (switch to G0 charset)
    ShiftIn,
    /// Any other C0 byte; no effect
    Other(u8),
}

impl ControlCode {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => ControlCode::Null,
            0x07 => ControlCode::Bell,
            0x08 => ControlCode::Backspace,
            0x09 => ControlCode::Tab,
            0x0A => ControlCode::LineFeed,
            0x0B => ControlCode::VerticalTab,
            0x0C => ControlCode::FormFeed,
            0x0D => ControlCode::CarriageReturn,
            0x0E => ControlCode::ShiftOut,
            0x0F => ControlCode::ShiftIn,
            other => ControlCode::Other(other),
        }
    }
}

/// CSI (Control Sequence Introducer) actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiAction {
    /// The final byte that identifies the command (0x40-0x7E)
    pub final_byte: u8,
    /// Parameters; an empty parameter is reported as 0
    pub params: Vec<u16>,
    /// Intermediate bytes (0x20-0x2F) seen after the parameters
    pub intermediates: Vec<u8>,
    /// Private marker (`?`, `>`, `<` or `=`) seen right after the introducer
    pub private_marker: Option<u8>,
}

impl CsiAction {
    pub fn new(final_byte: u8) -> Self {
        Self {
            final_byte,
            params: Vec::new(),
            intermediates: Vec::new(),
            private_marker: None,
        }
    }

    /// Get parameter at index, or default value if not present
    pub fn param(&self, index: usize, default: u16) -> u16 {
        self.params.get(index).copied().unwrap_or(default)
    }

    /// Get parameter at index, treating 0 as default
    pub fn param_or_default(&self, index: usize, default: u16) -> u16 {
        match self.params.get(index) {
            Some(&0) | None => default,
            Some(&v) => v,
        }
    }

    /// True for DEC private sequences (`CSI ? ...`)
    pub fn is_dec_private(&self) -> bool {
        self.private_marker == Some(b'?')
    }

    /// Interpret the parameters as an SGR attribute list.
    ///
    /// An empty list means reset. A malformed extended color (38/48 without
    /// enough sub-parameters, or an unknown color space) ends processing;
    /// attributes parsed before it are kept.
    pub fn parse_sgr(&self) -> Vec<SgrAttribute> {
        if self.params.is_empty() {
            return vec![SgrAttribute::Reset];
        }

        let mut attrs = Vec::with_capacity(self.params.len());
        let mut iter = self.params.iter().copied();

        while let Some(param) = iter.next() {
            let attr = match param {
                0 => SgrAttribute::Reset,
                1 => SgrAttribute::Bold,
                2 => SgrAttribute::Dim,
                3 => SgrAttribute::Italic,
                4 => SgrAttribute::Underline,
                5 | 6 => SgrAttribute::Blink,
                7 => SgrAttribute::Reverse,
                8 => SgrAttribute::Hidden,
                9 => SgrAttribute::Strikethrough,
                21 => SgrAttribute::NotBold,
                22 => SgrAttribute::NormalIntensity,
                23 => SgrAttribute::NotItalic,
                24 => SgrAttribute::NotUnderlined,
                25 => SgrAttribute::NotBlinking,
                27 => SgrAttribute::NotReversed,
                28 => SgrAttribute::NotHidden,
                29 => SgrAttribute::NotStrikethrough,
                30..=37 => SgrAttribute::Foreground(Color::Named(NamedColor::from_index(param - 30))),
                38 => match parse_extended_color(&mut iter) {
                    Some(color) => SgrAttribute::Foreground(color),
                    None => break,
                },
                39 => SgrAttribute::Foreground(Color::Default),
                40..=47 => SgrAttribute::Background(Color::Named(NamedColor::from_index(param - 40))),
                48 => match parse_extended_color(&mut iter) {
                    Some(color) => SgrAttribute::Background(color),
                    None => break,
                },
                49 => SgrAttribute::Background(Color::Default),
                90..=97 => SgrAttribute::Foreground(Color::Bright(NamedColor::from_index(param - 90))),
                100..=107 => {
                    SgrAttribute::Background(Color::Bright(NamedColor::from_index(param - 100)))
                }
                _ => continue,
            };
            attrs.push(attr);
        }

        attrs
    }
}

/// Parse the tail of a `38;...`/`48;...` extended color
fn parse_extended_color(iter: &mut impl Iterator<Item = u16>) -> Option<Color> {
    match iter.next()? {
        5 => {
            let index = iter.next()?;
            Some(Color::Indexed(index.min(255) as u8))
        }
        2 => {
            let r = iter.next()?;
            let g = iter.next()?;
            let b = iter.next()?;
            Some(Color::Rgb(
                r.min(255) as u8,
                g.min(255) as u8,
                b.min(255) as u8,
            ))
        }
        _ => None,
    }
}

/// A single SGR (Select Graphic Rendition) instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrAttribute {
    Reset,
    Bold,
    Dim,
    Italic,
    Underline,
    Blink,
    Reverse,
    Hidden,
    Strikethrough,
    NotBold,
    /// Neither bold nor dim
    NormalIntensity,
    NotItalic,
    NotUnderlined,
    NotBlinking,
    NotReversed,
    NotHidden,
    NotStrikethrough,
    Foreground(Color),
    Background(Color),
}

/// OSC (Operating System Command) actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OscAction {
    /// OSC 0 - set icon name and window title
    SetIconAndTitle(String),

    /// OSC 1 - set icon name
    SetIconName(String),

    /// OSC 2 - set window title
    SetTitle(String),

    /// OSC 8 - hyperlink.
    /// `params` holds the `key=value` list (e.g. `id=xyz`);
    /// an empty `uri` ends the current link.
    Hyperlink { params: String, uri: String },

    /// Anything else, with the raw payload
    Unknown(String),
}

impl OscAction {
    /// Classify a raw OSC payload (`Ps ; Pt`)
    pub fn from_payload(payload: String) -> Self {
        let Some((command, rest)) = payload.split_once(';') else {
            return OscAction::Unknown(payload);
        };

        match command {
            "0" => OscAction::SetIconAndTitle(rest.to_string()),
            "1" => OscAction::SetIconName(rest.to_string()),
            "2" => OscAction::SetTitle(rest.to_string()),
            "8" => match rest.split_once(';') {
                Some((params, uri)) => OscAction::Hyperlink {
                    params: params.to_string(),
                    uri: uri.to_string(),
                },
                None => OscAction::Unknown(payload),
            },
            _ => OscAction::Unknown(payload),
        }
    }
}

/// ESC sequence actions (non-CSI)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscAction {
    /// ESC 7 - Save cursor (DECSC)
    SaveCursor,

    /// ESC 8 - Restore cursor (DECRC)
    RestoreCursor,

    /// ESC D - Index (IND) - move cursor down, scroll if at bottom
    Index,

    /// ESC M - Reverse Index (RI) - move cursor up, scroll if at top
    ReverseIndex,

    /// ESC E - Next Line (NEL) - move to beginning of next line
    NextLine,

    /// ESC H - Horizontal Tab Set (HTS)
    TabSet,

    /// ESC c - Full Reset (RIS)
    FullReset,

    /// ESC = - Application Keypad Mode (DECKPAM)
    ApplicationKeypad,

    /// ESC > - Normal Keypad Mode (DECKPNM)
    NormalKeypad,

    /// ESC ( / ) / * / + - designate a charset into G0..G3
    DesignateCharset { slot: u8, charset: Charset },

    /// ESC # 8 - DEC Screen Alignment Test (DECALN)
    AlignmentTest,

    /// Unknown ESC sequence: intermediates followed by the final byte
    Unknown(Vec<u8>),
}

impl EscAction {
    /// Map an ESC final byte (with its intermediates) to an action
    pub fn from_sequence(intermediates: &[u8], final_byte: u8) -> Self {
        match (intermediates, final_byte) {
            ([], b'7') => EscAction::SaveCursor,
            ([], b'8') => EscAction::RestoreCursor,
            ([], b'D') => EscAction::Index,
            ([], b'M') => EscAction::ReverseIndex,
            ([], b'E') => EscAction::NextLine,
            ([], b'H') => EscAction::TabSet,
            ([], b'c') => EscAction::FullReset,
            ([], b'=') => EscAction::ApplicationKeypad,
            ([], b'>') => EscAction::NormalKeypad,
            ([b'#'], b'8') => EscAction::AlignmentTest,
            ([designator @ b'('..=b'+'], _) => EscAction::DesignateCharset {
                slot: designator - b'(',
                charset: Charset::from_designation(final_byte),
            },
            _ => {
                let mut seq = intermediates.to_vec();
                seq.push(final_byte);
                EscAction::Unknown(seq)
            }
        }
    }
}
