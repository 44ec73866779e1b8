//! Screen model implementation
//!
//! The screen represents the visible terminal grid plus state like scroll
//! regions, tab stops, and mode flags. It supports both primary and alternate
//! screen buffers; only the primary screen feeds the scrollback.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::cell::{char_width, Cell};
use super::charset::CharsetState;
use super::cursor::{Cursor, SavedCursor};
use super::grid::Grid;
use super::line::Line;
use super::modes::Modes;
use super::scrollback::Scrollback;

/// Default distance between tab stops
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// The main screen structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    /// Number of rows
    rows: usize,
    /// Number of columns
    cols: usize,
    /// Primary screen grid
    primary: Grid,
    /// Alternate screen grid
    alternate: Grid,
    /// Scrollback buffer (only fed by the primary screen)
    scrollback: Scrollback,
    /// The cursor and its pen
    cursor: Cursor,
    /// Saved cursor for primary screen (DECSC/DECRC)
    saved_primary: Option<SavedCursor>,
    /// Saved cursor for alternate screen
    saved_alternate: Option<SavedCursor>,
    /// Scroll region top (0-indexed, inclusive)
    scroll_top: usize,
    /// Scroll region bottom (0-indexed, inclusive)
    scroll_bottom: usize,
    /// Tab stops, one flag per column
    tab_stops: Vec<bool>,
    tab_width: usize,
    /// Terminal modes
    modes: Modes,
    /// G0-G3 character sets
    charsets: CharsetState,
    /// Last printed character, for REP
    last_char: Option<char>,
    /// Window title (OSC 0/2)
    title: String,
    /// Icon name (OSC 0/1)
    icon_name: String,
}

impl Screen {
    /// Create a new screen with the given dimensions (clamped to at least 1x1)
    pub fn new(rows: usize, cols: usize, scrollback_capacity: usize) -> Self {
        Self::with_tab_width(rows, cols, scrollback_capacity, DEFAULT_TAB_WIDTH)
    }

    /// Create a new screen with custom default tab stops
    pub fn with_tab_width(
        rows: usize,
        cols: usize,
        scrollback_capacity: usize,
        tab_width: usize,
    ) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let tab_width = tab_width.max(1);

        Self {
            rows,
            cols,
            primary: Grid::new(rows, cols),
            alternate: Grid::new(rows, cols),
            scrollback: Scrollback::new(scrollback_capacity),
            cursor: Cursor::new(),
            saved_primary: None,
            saved_alternate: None,
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tab_stops: default_tab_stops(cols, tab_width),
            tab_width,
            modes: Modes::default(),
            charsets: CharsetState::default(),
            last_char: None,
            title: String::new(),
            icon_name: String::new(),
        }
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the active grid
    pub fn grid(&self) -> &Grid {
        if self.modes.alternate_screen {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn grid_mut(&mut self) -> &mut Grid {
        if self.modes.alternate_screen {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    fn current_line_mut(&mut self) -> Option<&mut Line> {
        let row = self.cursor.row;
        self.grid_mut().line_mut(row)
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut Modes {
        &mut self.modes
    }

    pub fn charsets_mut(&mut self) -> &mut CharsetState {
        &mut self.charsets
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn is_alternate(&self) -> bool {
        self.modes.alternate_screen
    }

    /// Scroll region as (top, bottom), inclusive
    pub fn scroll_region(&self) -> (usize, usize) {
        (self.scroll_top, self.scroll_bottom)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    pub fn set_icon_name(&mut self, name: String) {
        self.icon_name = name;
    }

    /// Get a line of the active screen
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.grid().line(row)
    }

    /// Get a cell of the active screen
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid().cell(row, col)
    }

    /// Line addressed by a signed row: 0.. is the live screen,
    /// -1 is the most recent scrollback line
    pub fn line_at(&self, row: isize) -> Option<&Line> {
        if row >= 0 {
            self.grid().line(row as usize)
        } else {
            self.scrollback.get_from_end(row.unsigned_abs() - 1)
        }
    }

    /// Exactly `rows` lines as seen `scroll_offset` lines back into history.
    /// The offset is clamped to the scrollback length and ignored on the
    /// alternate screen.
    pub fn visible_lines(&self, scroll_offset: usize) -> Vec<Line> {
        if self.modes.alternate_screen {
            return self.alternate.lines().to_vec();
        }

        let history = self.scrollback.len();
        let offset = scroll_offset.min(history);
        (0..self.rows)
            .map(|i| {
                let index = history - offset + i;
                if index < history {
                    self.scrollback
                        .get(index)
                        .map(|line| line.resized(self.cols))
                        .unwrap_or_else(|| Line::new(self.cols))
                } else {
                    self.primary
                        .line(index - history)
                        .cloned()
                        .unwrap_or_else(|| Line::new(self.cols))
                }
            })
            .collect()
    }

    /// Print a character at the current cursor position
    pub fn print(&mut self, c: char) {
        let c = self.charsets.translate(c);
        let width = char_width(c);

        if width == 0 {
            trace!(?c, "dropping zero-width character");
            return;
        }

        if self.cursor.pending_wrap {
            self.wrap();
        }

        let cols = self.cols;
        if width == 2 && self.cursor.col + 1 >= cols && cols >= 2 {
            if self.modes.autowrap {
                // Not enough room: blank the last cell and wrap early
                let col = self.cursor.col;
                if let Some(line) = self.current_line_mut() {
                    line.clear_range(col, col + 1);
                }
                self.wrap();
            } else {
                self.cursor.col = cols - 2;
            }
        }

        let col = self.cursor.col;
        let insert = self.modes.insert;
        let cell = Cell {
            content: Some(c),
            fg: self.cursor.fg,
            bg: self.cursor.bg,
            style: self.cursor.style,
            hyperlink: self.cursor.hyperlink.clone(),
            wide_continuation: false,
        };

        if let Some(line) = self.current_line_mut() {
            if insert {
                line.insert_cells(col, width);
            }
            line.clear_range(col, col + width);
            if width == 2 && col + 1 < cols {
                let mut tail = cell.clone();
                tail.content = None;
                tail.wide_continuation = true;
                if let Some(slot) = line.cell_mut(col + 1) {
                    *slot = tail;
                }
            }
            if let Some(slot) = line.cell_mut(col) {
                *slot = cell;
            }
        }

        self.last_char = Some(c);

        let next = col + width;
        if next >= cols {
            self.cursor.col = cols - 1;
            self.cursor.pending_wrap = self.modes.autowrap;
        } else {
            self.cursor.col = next;
        }
    }

    /// Repeat the last printed character (REP)
    pub fn repeat_last(&mut self, n: usize) {
        if let Some(c) = self.last_char {
            for _ in 0..n {
                self.print(c);
            }
        }
    }

    /// Soft wrap: continue on the next line and mark it as a continuation.
    /// Below the scroll region on the last row there is no next line, so
    /// printing restarts on the same row and nothing is marked.
    fn wrap(&mut self) {
        self.cursor.pending_wrap = false;
        self.cursor.col = 0;
        let row = self.cursor.row;
        let scrolls = row == self.scroll_bottom;
        self.index();
        if !scrolls && self.cursor.row == row {
            return;
        }
        if let Some(line) = self.current_line_mut() {
            line.set_wrapped(true);
        }
    }

    /// Handle linefeed (LF, VT, FF)
    pub fn linefeed(&mut self) {
        self.index();
        if self.modes.linefeed_newline {
            self.cursor.col = 0;
        }
    }

    /// Handle index (IND) - move cursor down, scroll if at bottom of region
    pub fn index(&mut self) {
        self.cursor.pending_wrap = false;
        if self.cursor.row == self.scroll_bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.rows {
            self.cursor.row += 1;
        }
    }

    /// Handle reverse index (RI) - move cursor up, scroll if at top of region
    pub fn reverse_index(&mut self) {
        self.cursor.pending_wrap = false;
        if self.cursor.row == self.scroll_top {
            self.scroll_down(1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
    }

    /// Handle next line (NEL) - move to start of next line
    pub fn next_line(&mut self) {
        self.index();
        self.cursor.col = 0;
    }

    /// Handle carriage return (CR)
    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    /// Handle backspace (BS); never wraps to the previous line
    pub fn backspace(&mut self) {
        self.cursor.pending_wrap = false;
        self.cursor.col = self.cursor.col.saturating_sub(1);
    }

    /// Move to the n-th next tab stop, or the last column (HT, CHT)
    pub fn tab(&mut self, n: usize) {
        self.cursor.pending_wrap = false;
        for _ in 0..n {
            let next = (self.cursor.col + 1..self.cols).find(|&col| self.tab_stops[col]);
            match next {
                Some(col) => self.cursor.col = col,
                None => {
                    self.cursor.col = self.cols - 1;
                    break;
                }
            }
        }
    }

    /// Move to the n-th previous tab stop, or column 0 (CBT)
    pub fn back_tab(&mut self, n: usize) {
        self.cursor.pending_wrap = false;
        for _ in 0..n {
            let prev = (0..self.cursor.col).rev().find(|&col| self.tab_stops[col]);
            match prev {
                Some(col) => self.cursor.col = col,
                None => {
                    self.cursor.col = 0;
                    break;
                }
            }
        }
    }

    /// Scroll the region up by n lines (content moves up, new lines at bottom).
    /// On the primary screen with the region at the top, the lines leaving
    /// the screen go to scrollback.
    pub fn scroll_up(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);

        if self.modes.alternate_screen {
            self.alternate.scroll_up(top, bottom, n);
        } else {
            let evicted = self.primary.scroll_up(top, bottom, n);
            if top == 0 {
                self.scrollback.extend(evicted);
            }
        }
    }

    /// Scroll the region down by n lines (content moves down, new lines at top)
    pub fn scroll_down(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        self.grid_mut().scroll_down(top, bottom, n);
    }

    /// Set scroll region (DECSTBM), 0-indexed inclusive.
    /// An empty or inverted region resets to the full screen.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let top = top.min(self.rows - 1);
        let bottom = bottom.min(self.rows - 1);

        if top < bottom {
            self.scroll_top = top;
            self.scroll_bottom = bottom;
        } else {
            self.reset_scroll_region();
        }

        self.move_cursor_to(0, 0);
    }

    /// Reset scroll region to full screen
    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
    }

    /// Set a tab stop at the current column (HTS)
    pub fn set_tab_stop(&mut self) {
        let col = self.cursor.col;
        if let Some(stop) = self.tab_stops.get_mut(col) {
            *stop = true;
        }
    }

    /// Clear tab stop at current column
    pub fn clear_tab_stop(&mut self) {
        let col = self.cursor.col;
        if let Some(stop) = self.tab_stops.get_mut(col) {
            *stop = false;
        }
    }

    /// Clear all tab stops
    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.iter_mut().for_each(|stop| *stop = false);
    }

    /// Erase in display (ED).
    /// 0 = cursor to end, 1 = start to cursor, 2 = whole screen,
    /// 3 = whole screen and scrollback.
    pub fn erase_in_display(&mut self, mode: u16) {
        let (row, col) = (self.cursor.row, self.cursor.col);

        match mode {
            0 => self.grid_mut().clear_below(row, col),
            1 => self.grid_mut().clear_above(row, col),
            2 => self.grid_mut().clear(),
            3 => {
                self.grid_mut().clear();
                self.scrollback.clear();
            }
            _ => trace!(mode, "unknown erase-in-display mode"),
        }
    }

    /// Erase in line (EL).
    /// 0 = cursor to end, 1 = start to cursor, 2 = whole line.
    pub fn erase_in_line(&mut self, mode: u16) {
        let col = self.cursor.col;
        let Some(line) = self.current_line_mut() else {
            return;
        };

        match mode {
            0 => line.clear_from(col),
            1 => line.clear_to(col),
            2 => {
                let cols = line.cols();
                line.clear_range(0, cols);
            }
            _ => trace!(mode, "unknown erase-in-line mode"),
        }
    }

    /// Erase characters (ECH)
    pub fn erase_chars(&mut self, n: usize) {
        let col = self.cursor.col;
        if let Some(line) = self.current_line_mut() {
            line.clear_range(col, col.saturating_add(n));
        }
    }

    /// Insert lines (IL) at the cursor row; no-op outside the scroll region
    pub fn insert_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if row < self.scroll_top || row > self.scroll_bottom {
            return;
        }
        let bottom = self.scroll_bottom;
        self.grid_mut().insert_lines(row, n, bottom);
        self.cursor.carriage_return();
    }

    /// Delete lines (DL) at the cursor row; no-op outside the scroll region
    pub fn delete_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if row < self.scroll_top || row > self.scroll_bottom {
            return;
        }
        let bottom = self.scroll_bottom;
        self.grid_mut().delete_lines(row, n, bottom);
        self.cursor.carriage_return();
    }

    /// Insert blank characters (ICH)
    pub fn insert_chars(&mut self, n: usize) {
        let col = self.cursor.col;
        self.cursor.pending_wrap = false;
        if let Some(line) = self.current_line_mut() {
            line.insert_cells(col, n);
        }
    }

    /// Delete characters (DCH)
    pub fn delete_chars(&mut self, n: usize) {
        let col = self.cursor.col;
        self.cursor.pending_wrap = false;
        if let Some(line) = self.current_line_mut() {
            line.delete_cells(col, n);
        }
    }

    /// Move cursor to position (CUP/HVP), relative to the region in origin mode
    pub fn move_cursor_to(&mut self, row: usize, col: usize) {
        let row = if self.modes.origin {
            self.scroll_top.saturating_add(row).min(self.scroll_bottom)
        } else {
            row.min(self.rows - 1)
        };
        self.cursor.move_to(row, col, self.rows, self.cols);
    }

    /// Move cursor up (CUU), stopping at the top margin when inside the region
    pub fn move_cursor_up(&mut self, n: usize) {
        let min_row = if self.cursor.row >= self.scroll_top {
            self.scroll_top
        } else {
            0
        };
        self.cursor.row = self.cursor.row.saturating_sub(n).max(min_row);
        self.cursor.pending_wrap = false;
    }

    /// Move cursor down (CUD), stopping at the bottom margin when inside the region
    pub fn move_cursor_down(&mut self, n: usize) {
        let max_row = if self.cursor.row <= self.scroll_bottom {
            self.scroll_bottom
        } else {
            self.rows - 1
        };
        self.cursor.row = self.cursor.row.saturating_add(n).min(max_row);
        self.cursor.pending_wrap = false;
    }

    /// Move cursor forward/right (CUF)
    pub fn move_cursor_forward(&mut self, n: usize) {
        self.cursor.col = self.cursor.col.saturating_add(n).min(self.cols - 1);
        self.cursor.pending_wrap = false;
    }

    /// Move cursor backward/left (CUB)
    pub fn move_cursor_backward(&mut self, n: usize) {
        self.cursor.col = self.cursor.col.saturating_sub(n);
        self.cursor.pending_wrap = false;
    }

    /// Move cursor to column (CHA)
    pub fn move_cursor_to_col(&mut self, col: usize) {
        self.cursor.col = col.min(self.cols - 1);
        self.cursor.pending_wrap = false;
    }

    /// Move cursor to row (VPA), relative to the region in origin mode
    pub fn move_cursor_to_row(&mut self, row: usize) {
        let col = self.cursor.col;
        self.move_cursor_to(row, col);
    }

    /// Save cursor state (DECSC)
    pub fn save_cursor(&mut self) {
        let saved = SavedCursor {
            origin_mode: self.modes.origin,
            charsets: self.charsets.clone(),
            ..self.cursor.save()
        };
        if self.modes.alternate_screen {
            self.saved_alternate = Some(saved);
        } else {
            self.saved_primary = Some(saved);
        }
    }

    /// Restore cursor state (DECRC); without a prior save, homes the
    /// cursor and resets the pen
    pub fn restore_cursor(&mut self) {
        let saved = if self.modes.alternate_screen {
            self.saved_alternate.clone()
        } else {
            self.saved_primary.clone()
        }
        .unwrap_or_default();

        self.cursor.restore(&saved, self.rows, self.cols);
        self.modes.origin = saved.origin_mode;
        self.charsets = saved.charsets;
    }

    /// Switch to the alternate screen, which starts out blank
    pub fn enter_alternate_screen(&mut self, save_cursor: bool) {
        if self.modes.alternate_screen {
            return;
        }
        if save_cursor {
            self.save_cursor();
        }
        self.modes.alternate_screen = true;
        self.alternate.clear();
        self.cursor.pending_wrap = false;
    }

    /// Switch back to the primary screen
    pub fn exit_alternate_screen(&mut self, restore_cursor: bool) {
        if !self.modes.alternate_screen {
            return;
        }
        self.modes.alternate_screen = false;
        self.cursor.pending_wrap = false;
        if restore_cursor {
            self.restore_cursor();
        }
    }

    /// DEC screen alignment test (DECALN): fill the screen with `E`
    pub fn alignment_test(&mut self) {
        let (rows, cols) = (self.rows, self.cols);
        let grid = self.grid_mut();
        for row in 0..rows {
            for col in 0..cols {
                if let Some(cell) = grid.cell_mut(row, col) {
                    *cell = Cell::new('E');
                }
            }
        }
        self.reset_scroll_region();
        self.cursor.move_to(0, 0, rows, cols);
    }

    /// Blank the active screen and home the cursor
    pub fn clear_screen(&mut self) {
        self.grid_mut().clear();
        self.cursor.move_to(0, 0, self.rows, self.cols);
    }

    /// Drop all scrollback lines
    pub fn clear_scrollback(&mut self) {
        self.scrollback.clear();
    }

    /// Soft terminal reset (DECSTR): modes, margins and pen, keeping content
    pub fn soft_reset(&mut self) {
        self.modes.insert = false;
        self.modes.origin = false;
        self.modes.autowrap = true;
        self.modes.application_cursor = false;
        self.modes.application_keypad = false;
        self.reset_scroll_region();
        self.cursor.visible = true;
        self.cursor.pending_wrap = false;
        self.cursor.reset_attributes();
        self.cursor.hyperlink = None;
        self.charsets = CharsetState::default();
        self.saved_primary = None;
        self.saved_alternate = None;
    }

    /// Full reset (RIS): back to the initial state, scrollback included
    pub fn full_reset(&mut self) {
        *self = Self::with_tab_width(
            self.rows,
            self.cols,
            self.scrollback.capacity(),
            self.tab_width,
        );
    }

    /// Resize the screen to `rows` x `cols` (each clamped to at least 1).
    ///
    /// Columns are padded or truncated without rewrapping. When rows shrink,
    /// blank lines below the cursor are dropped first and the remaining
    /// overflow leaves from the top (into scrollback on the primary screen).
    /// When rows grow, the primary screen pulls lines back from scrollback.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        let rows = rows.max(1);
        let cols = cols.max(1);
        if rows == self.rows && cols == self.cols {
            return;
        }

        let region_was_full = self.scroll_top == 0 && self.scroll_bottom == self.rows - 1;

        if cols != self.cols {
            self.primary.set_cols(cols);
            self.alternate.set_cols(cols);
            self.resize_tab_stops(cols);
            self.cols = cols;
        }

        if rows < self.rows {
            self.shrink_rows(self.rows - rows);
        } else if rows > self.rows {
            self.grow_rows(rows - self.rows);
        }
        self.rows = rows;

        if region_was_full || self.scroll_bottom >= rows {
            self.reset_scroll_region();
        }

        self.cursor.move_to(self.cursor.row, self.cursor.col, rows, cols);
        for saved in [&mut self.saved_primary, &mut self.saved_alternate]
            .into_iter()
            .flatten()
        {
            saved.row = saved.row.min(rows - 1);
            saved.col = saved.col.min(cols - 1);
            saved.pending_wrap = false;
        }
    }

    fn shrink_rows(&mut self, shrink: usize) {
        let alternate_active = self.modes.alternate_screen;

        // Anchor: rows at or above it are kept in preference to trailing blanks
        let primary_anchor = if alternate_active {
            let saved_row = self.saved_primary.as_ref().map_or(0, |saved| saved.row);
            self.primary.last_non_blank_row().unwrap_or(0).max(saved_row)
        } else {
            self.cursor.row
        };
        let alternate_anchor = if alternate_active {
            self.cursor.row
        } else {
            self.alternate.last_non_blank_row().unwrap_or(0)
        };

        let (evicted, primary_shift) = shrink_grid(&mut self.primary, shrink, primary_anchor);
        self.scrollback.extend(evicted);
        let (_, alternate_shift) = shrink_grid(&mut self.alternate, shrink, alternate_anchor);

        if alternate_active {
            self.cursor.row = self.cursor.row.saturating_sub(alternate_shift);
            if let Some(saved) = self.saved_primary.as_mut() {
                saved.row = saved.row.saturating_sub(primary_shift);
            }
        } else {
            self.cursor.row = self.cursor.row.saturating_sub(primary_shift);
        }
    }

    fn grow_rows(&mut self, grow: usize) {
        let mut pulled = 0;
        while pulled < grow {
            let Some(line) = self.scrollback.pop_newest() else {
                break;
            };
            self.primary.push_top(line);
            pulled += 1;
        }
        self.primary.push_blank_bottom(grow - pulled);
        self.alternate.push_blank_bottom(grow);

        if self.modes.alternate_screen {
            if let Some(saved) = self.saved_primary.as_mut() {
                saved.row += pulled;
            }
        } else {
            self.cursor.row += pulled;
        }
    }

    fn resize_tab_stops(&mut self, cols: usize) {
        let old = self.tab_stops.len();
        self.tab_stops.truncate(cols);
        let width = self.tab_width;
        self.tab_stops
            .extend((old..cols).map(|col| col > 0 && col % width == 0));
    }
}

/// Remove `shrink` rows from a grid: trailing blank rows below `anchor`
/// first, then rows from the top. Returns the rows taken from the top and
/// how many there were.
fn shrink_grid(grid: &mut Grid, shrink: usize, anchor: usize) -> (Vec<Line>, usize) {
    let rows = grid.rows();
    let trailing_blank = grid
        .lines()
        .iter()
        .enumerate()
        .rev()
        .take_while(|(row, line)| *row > anchor && line.is_blank())
        .count();

    let from_bottom = trailing_blank.min(shrink).min(rows);
    grid.truncate_bottom(from_bottom);
    let from_top = shrink - from_bottom;
    let evicted = grid.drain_top(from_top);
    let shift = evicted.len();
    (evicted, shift)
}

fn default_tab_stops(cols: usize, width: usize) -> Vec<bool> {
    (0..cols).map(|col| col > 0 && col % width == 0).collect()
}
