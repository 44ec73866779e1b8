//! Terminal Cell
//!
//! Represents a single cell in the terminal grid, containing a character
//! and its associated styling attributes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

/// A single cell in the terminal grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character in this cell. `None` for blank cells and for the
    /// right-hand half of a double-width character.
    pub content: Option<char>,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text style attributes
    pub style: Style,
    /// OSC 8 hyperlink target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<Arc<str>>,
    /// This cell is the continuation of a wide character
    #[serde(default, skip_serializing_if = "is_false")]
    pub wide_continuation: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Cell {
    /// Create a new cell with a single character
    pub fn new(c: char) -> Self {
        Self {
            content: Some(c),
            ..Default::default()
        }
    }

    /// Check if this cell is empty (no content)
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// Blank cell with default colors and no attributes
    pub fn is_blank(&self) -> bool {
        self.content.is_none()
            && !self.wide_continuation
            && self.bg == Color::Default
            && self.style == Style::default()
            && self.hyperlink.is_none()
    }

    /// Character to show for this cell; empty cells read as a space
    pub fn display_char(&self) -> char {
        self.content.unwrap_or(' ')
    }

    /// Display width of this cell: 0 for wide continuations, 2 for wide
    /// characters, 1 otherwise
    pub fn width(&self) -> usize {
        if self.wide_continuation {
            return 0;
        }
        self.content.map(char_width).unwrap_or(1).max(1)
    }

    /// Check if this cell holds the left half of a double-width character
    pub fn is_wide(&self) -> bool {
        self.content.map(char_width) == Some(2)
    }

    /// Clear the cell to default state
    pub fn clear(&mut self) {
        *self = Cell::default();
    }
}

/// Terminal display width of a character (0, 1 or 2)
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0).min(2)
}

/// The eight base ANSI colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl NamedColor {
    /// Color for an SGR offset (0-7); higher values wrap
    pub fn from_index(index: u16) -> Self {
        match index % 8 {
            0 => NamedColor::Black,
            1 => NamedColor::Red,
            2 => NamedColor::Green,
            3 => NamedColor::Yellow,
            4 => NamedColor::Blue,
            5 => NamedColor::Magenta,
            6 => NamedColor::Cyan,
            _ => NamedColor::White,
        }
    }

    /// Position in the ANSI palette (0-7)
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Color representation; resolution to RGB happens at the render boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// Standard ANSI color (SGR 30-37 / 40-47)
    Named(NamedColor),
    /// Bright ANSI color (SGR 90-97 / 100-107)
    Bright(NamedColor),
    /// 256-color palette entry
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(u8, u8, u8),
}

/// Text style attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub reverse: bool,
    pub hidden: bool,
    pub strikethrough: bool,
}

impl Style {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
