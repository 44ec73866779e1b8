//! Terminal Grid
//!
//! A fixed-size stack of lines representing the visible terminal area.
//! Scrolling operations rotate lines in place instead of reallocating.

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::line::Line;

/// The terminal grid - `rows` lines of `cols` cells each
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// The lines in the grid, top to bottom
    lines: Vec<Line>,
    /// Number of columns
    cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            lines: (0..rows).map(|_| Line::new(cols)).collect(),
            cols,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.lines.len()
    }

    /// Get a reference to a cell
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.lines.get(row).and_then(|line| line.cell(col))
    }

    /// Get a mutable reference to a cell
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.lines.get_mut(row).and_then(|line| line.cell_mut(col))
    }

    /// Get a reference to a line
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    /// Get a mutable reference to a line
    pub fn line_mut(&mut self, row: usize) -> Option<&mut Line> {
        self.lines.get_mut(row)
    }

    /// All lines, top to bottom
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        self.lines.iter_mut().for_each(Line::clear);
    }

    /// Clear from (row, col) to the end of the grid
    pub fn clear_below(&mut self, row: usize, col: usize) {
        if let Some(line) = self.lines.get_mut(row) {
            line.clear_from(col);
        }
        for line in self.lines.iter_mut().skip(row + 1) {
            line.clear();
        }
    }

    /// Clear from the start of the grid to (row, col) inclusive
    pub fn clear_above(&mut self, row: usize, col: usize) {
        for line in self.lines.iter_mut().take(row) {
            line.clear();
        }
        if let Some(line) = self.lines.get_mut(row) {
            line.clear_to(col);
        }
    }

    /// Scroll lines `top..=bottom` up by `n`. The lines that leave the
    /// region are returned oldest first; blank lines fill the bottom.
    pub fn scroll_up(&mut self, top: usize, bottom: usize, n: usize) -> Vec<Line> {
        let Some((top, bottom)) = self.clamp_region(top, bottom) else {
            return Vec::new();
        };
        let n = n.min(bottom - top + 1);
        if n == 0 {
            return Vec::new();
        }

        let region = &mut self.lines[top..=bottom];
        region.rotate_left(n);

        let start = region.len() - n;
        region[start..]
            .iter_mut()
            .map(|line| std::mem::replace(line, Line::new(self.cols)))
            .collect()
    }

    /// Scroll lines `top..=bottom` down by `n`; lines pushed past the
    /// bottom are discarded and blank lines fill the top.
    pub fn scroll_down(&mut self, top: usize, bottom: usize, n: usize) {
        let Some((top, bottom)) = self.clamp_region(top, bottom) else {
            return;
        };
        let n = n.min(bottom - top + 1);

        let region = &mut self.lines[top..=bottom];
        region.rotate_right(n);
        region[..n].iter_mut().for_each(Line::clear);
    }

    /// Insert `n` blank lines at `row`, pushing lines down within `row..=bottom`
    pub fn insert_lines(&mut self, row: usize, n: usize, bottom: usize) {
        if row <= bottom {
            self.scroll_down(row, bottom, n);
        }
    }

    /// Delete `n` lines at `row`, pulling lines up within `row..=bottom`
    pub fn delete_lines(&mut self, row: usize, n: usize, bottom: usize) {
        if row <= bottom {
            self.scroll_up(row, bottom, n);
        }
    }

    /// Remove `n` lines from the top, returning them oldest first
    pub fn drain_top(&mut self, n: usize) -> Vec<Line> {
        let n = n.min(self.lines.len());
        self.lines.drain(..n).collect()
    }

    /// Remove `n` lines from the bottom
    pub fn truncate_bottom(&mut self, n: usize) {
        let keep = self.lines.len().saturating_sub(n);
        self.lines.truncate(keep);
    }

    /// Put a line on top of the grid, normalized to the grid width
    pub fn push_top(&mut self, line: Line) {
        self.lines.insert(0, line.resized(self.cols));
    }

    /// Append `n` blank lines at the bottom
    pub fn push_blank_bottom(&mut self, n: usize) {
        let cols = self.cols;
        self.lines.extend((0..n).map(|_| Line::new(cols)));
    }

    /// Change the width of every line
    pub fn set_cols(&mut self, cols: usize) {
        for line in &mut self.lines {
            line.resize(cols);
        }
        self.cols = cols;
    }

    /// Index of the last row holding anything other than blank cells
    pub fn last_non_blank_row(&self) -> Option<usize> {
        self.lines.iter().rposition(|line| !line.is_blank())
    }

    fn clamp_region(&self, top: usize, bottom: usize) -> Option<(usize, usize)> {
        let bottom = bottom.min(self.lines.len().checked_sub(1)?);
        (top <= bottom).then_some((top, bottom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_rows(texts: &[&str], cols: usize) -> Grid {
        let mut grid = Grid::new(texts.len(), cols);
        for (row, text) in texts.iter().enumerate() {
            if let Some(line) = grid.line_mut(row) {
                *line = Line::from_text(text, cols);
            }
        }
        grid
    }

    fn texts(grid: &Grid) -> Vec<String> {
        grid.lines().iter().map(Line::text).collect()
    }

    #[test]
    fn test_grid_new() {
        let grid = Grid::new(24, 80);
        assert_eq!(grid.rows(), 24);
        assert_eq!(grid.cols(), 80);
    }

    #[test]
    fn test_scroll_up_full() {
        let mut grid = grid_with_rows(&["A", "B", "C"], 4);
        let out = grid.scroll_up(0, 2, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text(), "A");
        assert_eq!(texts(&grid), vec!["B", "C", ""]);
    }

    #[test]
    fn test_scroll_up_region() {
        let mut grid = grid_with_rows(&["A", "B", "C", "D"], 4);
        let out = grid.scroll_up(1, 2, 1);
        assert_eq!(out[0].text(), "B");
        assert_eq!(texts(&grid), vec!["A", "C", "", "D"]);
    }

    #[test]
    fn test_scroll_up_more_than_region() {
        let mut grid = grid_with_rows(&["A", "B", "C"], 4);
        let out = grid.scroll_up(0, 2, 10);
        assert_eq!(out.len(), 3);
        assert_eq!(texts(&grid), vec!["", "", ""]);
    }

    #[test]
    fn test_scroll_down_region() {
        let mut grid = grid_with_rows(&["A", "B", "C", "D"], 4);
        grid.scroll_down(0, 2, 1);
        assert_eq!(texts(&grid), vec!["", "A", "B", "D"]);
    }

    #[test]
    fn test_insert_delete_lines() {
        let mut grid = grid_with_rows(&["A", "B", "C", "D"], 4);
        grid.insert_lines(1, 1, 3);
        assert_eq!(texts(&grid), vec!["A", "", "B", "C"]);
        grid.delete_lines(0, 2, 3);
        assert_eq!(texts(&grid), vec!["B", "C", "", ""]);
    }

    #[test]
    fn test_clear_below_above() {
        let mut grid = grid_with_rows(&["AAAA", "BBBB", "CCCC"], 4);
        grid.clear_below(1, 2);
        assert_eq!(texts(&grid), vec!["AAAA", "BB", ""]);

        let mut grid = grid_with_rows(&["AAAA", "BBBB", "CCCC"], 4);
        grid.clear_above(1, 1);
        assert_eq!(texts(&grid), vec!["", "  BB", "CCCC"]);
    }

    #[test]
    fn test_drain_and_push() {
        let mut grid = grid_with_rows(&["A", "B", "C"], 4);
        let out = grid.drain_top(2);
        assert_eq!(out.len(), 2);
        assert_eq!(grid.rows(), 1);
        grid.push_top(Line::from_text("Z", 10));
        grid.push_blank_bottom(1);
        assert_eq!(texts(&grid), vec!["Z", "C", ""]);
        assert_eq!(grid.line(0).map(Line::cols), Some(4));
    }

    #[test]
    fn test_set_cols() {
        let mut grid = grid_with_rows(&["Hello"], 5);
        grid.set_cols(3);
        assert_eq!(texts(&grid), vec!["Hel"]);
        assert_eq!(grid.cols(), 3);
    }

    #[test]
    fn test_last_non_blank_row() {
        let grid = grid_with_rows(&["A", "", "C", ""], 4);
        assert_eq!(grid.last_non_blank_row(), Some(2));
        assert_eq!(Grid::new(3, 3).last_non_blank_row(), None);
    }
}
