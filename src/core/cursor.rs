//! Cursor state management
//!
//! The cursor tracks position, visibility, shape and the pen (attributes
//! applied to the next printed character). It also supports save/restore
//! operations (DECSC/DECRC and CSI s/u).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::charset::CharsetState;
use super::{Color, Style};

/// Cursor shape/style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    /// Block cursor (filled rectangle)
    #[default]
    Block,
    /// Underline cursor
    Underline,
    /// Vertical bar cursor
    Bar,
}

/// Cursor state including position, visibility, and pen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Row position (0-indexed)
    pub row: usize,
    /// Column position (0-indexed)
    pub col: usize,
    /// Whether the cursor is visible (DECTCEM)
    pub visible: bool,
    /// Cursor shape
    pub shape: CursorShape,
    /// Whether cursor is blinking
    pub blinking: bool,
    /// Pending wrap - cursor is at the right margin, next char will wrap
    pub pending_wrap: bool,
    /// Current text attributes (applied to new characters)
    pub style: Style,
    /// Current foreground color
    pub fg: Color,
    /// Current background color
    pub bg: Color,
    /// Current OSC 8 hyperlink target
    pub hyperlink: Option<Arc<str>>,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            visible: true,
            shape: CursorShape::Block,
            blinking: true,
            pending_wrap: false,
            style: Style::default(),
            fg: Color::Default,
            bg: Color::Default,
            hyperlink: None,
        }
    }
}

/// Saved cursor state for DECSC/DECRC
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCursor {
    pub row: usize,
    pub col: usize,
    pub pending_wrap: bool,
    pub style: Style,
    pub fg: Color,
    pub bg: Color,
    pub hyperlink: Option<Arc<str>>,
    pub origin_mode: bool,
    pub charsets: CharsetState,
}

impl Cursor {
    /// Create a new cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Move cursor to absolute position, clamping to bounds
    pub fn move_to(&mut self, row: usize, col: usize, rows: usize, cols: usize) {
        self.row = row.min(rows.saturating_sub(1));
        self.col = col.min(cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Carriage return - move to column 0
    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.pending_wrap = false;
    }

    /// Save position and pen; mode state is filled in by the screen
    pub fn save(&self) -> SavedCursor {
        SavedCursor {
            row: self.row,
            col: self.col,
            pending_wrap: self.pending_wrap,
            style: self.style,
            fg: self.fg,
            bg: self.bg,
            hyperlink: self.hyperlink.clone(),
            origin_mode: false,
            charsets: CharsetState::default(),
        }
    }

    /// Restore position and pen, clamped to the current size
    pub fn restore(&mut self, saved: &SavedCursor, rows: usize, cols: usize) {
        self.move_to(saved.row, saved.col, rows, cols);
        self.pending_wrap = saved.pending_wrap && self.col == saved.col;
        self.style = saved.style;
        self.fg = saved.fg;
        self.bg = saved.bg;
        self.hyperlink = saved.hyperlink.clone();
    }

    /// Reset only the text attributes (SGR 0)
    pub fn reset_attributes(&mut self) {
        self.style = Style::default();
        self.fg = Color::Default;
        self.bg = Color::Default;
    }
}
