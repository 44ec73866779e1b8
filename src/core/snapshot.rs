//! Deterministic snapshot generation
//!
//! Snapshots capture what a renderer needs in a serializable, owned form.
//! Each one carries the terminal version it was taken at; given the same
//! byte stream, the terminal produces identical snapshots.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Color, NamedColor, Style};
use super::cursor::{Cursor, CursorShape};
use super::line::Line;
use super::modes::Modes;
use super::screen::Screen;

/// A render-ready snapshot of the terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Terminal version this snapshot was taken at
    pub version: u64,
    /// Screen dimensions
    pub rows: usize,
    pub cols: usize,
    /// How many lines back into scrollback the view is
    pub scroll_offset: usize,
    /// Visible lines, top to bottom
    pub lines: Vec<LineSnapshot>,
    /// Cursor state
    pub cursor: CursorSnapshot,
    /// Scroll region
    pub scroll_top: usize,
    pub scroll_bottom: usize,
    /// Terminal modes
    pub modes: Modes,
    /// Window title
    pub title: String,
    /// Icon name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_name: String,
    /// Whether on alternate screen
    pub alternate_screen: bool,
    /// Scrollback line count
    pub scrollback_len: usize,
}

/// Snapshot of a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub cells: Vec<CellSnapshot>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub wrapped: bool,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Character content, empty for blank and continuation cells
    pub content: String,
    /// Foreground color
    pub fg: ColorSnapshot,
    /// Background color
    pub bg: ColorSnapshot,
    /// Style attributes
    pub style: StyleSnapshot,
    /// Cell width (0 for continuation, 1 normal, 2 wide)
    pub width: u8,
    /// OSC 8 hyperlink target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
}

/// Snapshot of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColorSnapshot {
    Default,
    Named { index: u8 },
    Bright { index: u8 },
    Indexed { index: u8 },
    Rgb { r: u8, g: u8, b: u8 },
}

/// Snapshot of style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blink: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Snapshot of cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub row: usize,
    pub col: usize,
    pub visible: bool,
    pub shape: String,
    pub blinking: bool,
}

impl From<&Color> for ColorSnapshot {
    fn from(color: &Color) -> Self {
        match *color {
            Color::Default => ColorSnapshot::Default,
            Color::Named(named) => ColorSnapshot::Named {
                index: named.index(),
            },
            Color::Bright(named) => ColorSnapshot::Bright {
                index: named.index(),
            },
            Color::Indexed(index) => ColorSnapshot::Indexed { index },
            Color::Rgb(r, g, b) => ColorSnapshot::Rgb { r, g, b },
        }
    }
}

impl From<ColorSnapshot> for Color {
    fn from(color: ColorSnapshot) -> Self {
        match color {
            ColorSnapshot::Default => Color::Default,
            ColorSnapshot::Named { index } => Color::Named(NamedColor::from_index(index.into())),
            ColorSnapshot::Bright { index } => Color::Bright(NamedColor::from_index(index.into())),
            ColorSnapshot::Indexed { index } => Color::Indexed(index),
            ColorSnapshot::Rgb { r, g, b } => Color::Rgb(r, g, b),
        }
    }
}

impl From<&Style> for StyleSnapshot {
    fn from(style: &Style) -> Self {
        StyleSnapshot {
            bold: style.bold,
            dim: style.dim,
            italic: style.italic,
            underline: style.underline,
            blink: style.blink,
            reverse: style.reverse,
            hidden: style.hidden,
            strikethrough: style.strikethrough,
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            content: cell.content.map(String::from).unwrap_or_default(),
            fg: ColorSnapshot::from(&cell.fg),
            bg: ColorSnapshot::from(&cell.bg),
            style: StyleSnapshot::from(&cell.style),
            width: cell.width() as u8,
            hyperlink: cell.hyperlink.as_deref().map(String::from),
        }
    }
}

impl From<&Line> for LineSnapshot {
    fn from(line: &Line) -> Self {
        LineSnapshot {
            cells: line.cells().iter().map(CellSnapshot::from).collect(),
            wrapped: line.is_wrapped(),
        }
    }
}

impl From<&Cursor> for CursorSnapshot {
    fn from(cursor: &Cursor) -> Self {
        CursorSnapshot {
            row: cursor.row,
            col: cursor.col,
            visible: cursor.visible,
            shape: match cursor.shape {
                CursorShape::Block => "block".to_string(),
                CursorShape::Underline => "underline".to_string(),
                CursorShape::Bar => "bar".to_string(),
            },
            blinking: cursor.blinking,
        }
    }
}

impl Snapshot {
    /// Capture the screen as seen `scroll_offset` lines back into history
    pub fn capture(screen: &Screen, version: u64, scroll_offset: usize) -> Self {
        let scroll_offset = if screen.is_alternate() {
            0
        } else {
            scroll_offset.min(screen.scrollback().len())
        };
        let (scroll_top, scroll_bottom) = screen.scroll_region();

        Snapshot {
            version,
            rows: screen.rows(),
            cols: screen.cols(),
            scroll_offset,
            lines: screen
                .visible_lines(scroll_offset)
                .iter()
                .map(LineSnapshot::from)
                .collect(),
            cursor: CursorSnapshot::from(screen.cursor()),
            scroll_top,
            scroll_bottom,
            modes: screen.modes().clone(),
            title: screen.title().to_string(),
            icon_name: screen.icon_name().to_string(),
            alternate_screen: screen.is_alternate(),
            scrollback_len: screen.scrollback().len(),
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text of the visible lines: trailing spaces and trailing empty
    /// lines removed
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for line in &self.lines {
            for cell in &line.cells {
                if cell.width == 0 {
                    continue;
                }
                if cell.content.is_empty() {
                    result.push(' ');
                } else {
                    result.push_str(&cell.content);
                }
            }
            while result.ends_with(' ') {
                result.pop();
            }
            result.push('\n');
        }

        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }

    /// Compare visible content, ignoring version and metadata
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.lines == other.lines
    }
}
