//! Terminal line representation
//!
//! A line represents a row of cells in the terminal grid,
//! with metadata about wrapping behavior.

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// A row of cells in the terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// The cells in this line
    cells: Vec<Cell>,
    /// True if this line continues the previous one
    /// (the previous line overflowed and continued onto this line)
    wrapped: bool,
}

impl Line {
    /// Create a new blank line with the specified number of columns
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cols],
            wrapped: false,
        }
    }

    /// Build a line from a string, one character per cell, padded to `cols`
    pub fn from_text(text: &str, cols: usize) -> Self {
        let mut line = Self::new(cols);
        for (cell, c) in line.cells.iter_mut().zip(text.chars()) {
            cell.content = Some(c);
        }
        line
    }

    /// Get the number of columns in this line
    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    /// Get a reference to a cell at the given column
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Get a mutable reference to a cell at the given column
    pub fn cell_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    /// Get all cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Check if this line is wrapped from the previous line
    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Set the wrapped flag
    pub fn set_wrapped(&mut self, wrapped: bool) {
        self.wrapped = wrapped;
    }

    /// True if every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }

    /// Resize the line to a new number of columns.
    ///
    /// Growing pads with blank cells. Shrinking truncates; a wide character
    /// whose right half is cut off is blanked.
    pub fn resize(&mut self, cols: usize) {
        let old_len = self.cells.len();
        self.cells.resize_with(cols, Cell::default);

        if cols < old_len {
            if let Some(last) = self.cells.last_mut() {
                if last.is_wide() {
                    last.clear();
                }
            }
        }
    }

    /// Copy of this line padded or truncated to `cols`
    pub fn resized(&self, cols: usize) -> Line {
        let mut line = self.clone();
        line.resize(cols);
        line
    }

    /// Clear all cells in the line
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(Cell::clear);
        self.wrapped = false;
    }

    /// Clear cells from the given column to the end of the line
    pub fn clear_from(&mut self, col: usize) {
        let start = col.min(self.cells.len());
        self.clear_range(start, self.cells.len());
    }

    /// Clear cells from the start of the line to the given column (inclusive)
    pub fn clear_to(&mut self, col: usize) {
        self.clear_range(0, col.saturating_add(1));
    }

    /// Clear cells in `[start, end)`, fixing up any wide character cut in half
    pub fn clear_range(&mut self, start: usize, end: usize) {
        let len = self.cells.len();
        let end = end.min(len);
        if start >= end {
            return;
        }

        for cell in &mut self.cells[start..end] {
            cell.clear();
        }

        // Left half of a wide char whose continuation was erased
        if start > 0 && self.cells[start - 1].is_wide() {
            self.cells[start - 1].clear();
        }
        // Continuation whose left half was erased
        if end < len && self.cells[end].wide_continuation {
            self.cells[end].clear();
        }
    }

    /// Insert blank cells at the given column, shifting existing cells right.
    /// Cells that shift past the end are lost.
    pub fn insert_cells(&mut self, col: usize, count: usize) {
        let len = self.cells.len();
        if col >= len {
            return;
        }

        let count = count.min(len - col);
        self.cells[col..].rotate_right(count);
        for cell in &mut self.cells[col..col + count] {
            cell.clear();
        }
        self.fix_wide_boundaries();
    }

    /// Delete cells at the given column, shifting remaining cells left.
    /// Blank cells are inserted at the end.
    pub fn delete_cells(&mut self, col: usize, count: usize) {
        let len = self.cells.len();
        if col >= len {
            return;
        }

        let count = count.min(len - col);
        self.cells[col..].rotate_left(count);
        for cell in &mut self.cells[len - count..] {
            cell.clear();
        }
        self.fix_wide_boundaries();
    }

    /// Blank orphaned wide-character halves after cells were shifted
    fn fix_wide_boundaries(&mut self) {
        let len = self.cells.len();
        for i in 0..len {
            if self.cells[i].wide_continuation {
                let has_head = i > 0 && self.cells[i - 1].is_wide();
                if !has_head {
                    self.cells[i].clear();
                }
            } else if self.cells[i].is_wide() {
                let has_tail = i + 1 < len && self.cells[i + 1].wide_continuation;
                if !has_tail {
                    self.cells[i].clear();
                }
            }
        }
    }

    /// Text content of the line with trailing blanks trimmed;
    /// wide-character continuations are skipped
    pub fn text(&self) -> String {
        let text: String = self
            .cells
            .iter()
            .filter(|cell| !cell.wide_continuation)
            .map(Cell::display_char)
            .collect();
        text.trim_end_matches(' ').to_string()
    }
}
