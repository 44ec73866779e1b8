//! Character sets
//!
//! G0-G3 designation and SO/SI shifting. Only the DEC Special Graphics
//! (line drawing) and UK sets differ from ASCII.

use serde::{Deserialize, Serialize};

/// Character set designations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Charset {
    #[default]
    Ascii,
    /// DEC Special Graphics (line drawing characters)
    DecSpecialGraphics,
    /// UK national set; `#` becomes `£`
    Uk,
}

impl Charset {
    /// Charset named by the final byte of `ESC ( x`; unknown sets map to ASCII
    pub fn from_designation(final_byte: u8) -> Self {
        match final_byte {
            b'0' | b'2' => Charset::DecSpecialGraphics,
            b'A' => Charset::Uk,
            _ => Charset::Ascii,
        }
    }

    /// Translate a printable character through this set
    pub fn translate(self, c: char) -> char {
        match self {
            Charset::Ascii => c,
            Charset::Uk if c == '#' => '£',
            Charset::Uk => c,
            Charset::DecSpecialGraphics => dec_special_graphics(c),
        }
    }
}

fn dec_special_graphics(c: char) -> char {
    match c {
        '`' => '◆',
        'a' => '▒',
        'b' => '␉',
        'c' => '␌',
        'd' => '␍',
        'e' => '␊',
        'f' => '°',
        'g' => '±',
        'h' => '␤',
        'i' => '␋',
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'o' => '⎺',
        'p' => '⎻',
        'q' => '─',
        'r' => '⎼',
        's' => '⎽',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        '~' => '·',
        _ => c,
    }
}

/// Designated sets for G0-G3 and which of G0/G1 is shifted in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharsetState {
    slots: [Charset; 4],
    /// G1 shifted in by SO; SI returns to G0
    shifted_out: bool,
}

impl CharsetState {
    pub fn designate(&mut self, slot: u8, charset: Charset) {
        if let Some(entry) = self.slots.get_mut(usize::from(slot)) {
            *entry = charset;
        }
    }

    pub fn shift_out(&mut self) {
        self.shifted_out = true;
    }

    pub fn shift_in(&mut self) {
        self.shifted_out = false;
    }

    /// The set currently mapped into GL
    pub fn active(&self) -> Charset {
        self.slots[usize::from(self.shifted_out)]
    }

    pub fn translate(&self, c: char) -> char {
        self.active().translate(c)
    }
}
