//! Selection and search
//!
//! Read-only queries over the screen and scrollback. Rows are signed:
//! row 0 is the top of the live screen and negative rows address the
//! scrollback, -1 being the most recent scrollback line.

use serde::{Deserialize, Serialize};

use super::line::Line;
use super::screen::Screen;

/// A position in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionPoint {
    /// Row index (negative for scrollback)
    pub row: isize,
    /// Column index (0-based)
    pub col: usize,
}

impl SelectionPoint {
    pub fn new(row: isize, col: usize) -> Self {
        Self { row, col }
    }

    /// Check if this point comes before another one in reading order
    pub fn is_before(&self, other: &SelectionPoint) -> bool {
        (self.row, self.col) < (other.row, other.col)
    }
}

/// A text selection, always stored in reading order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    start: SelectionPoint,
    end: SelectionPoint,
}

impl Selection {
    /// Create a selection between two points given in any order
    pub fn new(a: SelectionPoint, b: SelectionPoint) -> Self {
        if b.is_before(&a) {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    /// First selected cell
    pub fn start(&self) -> SelectionPoint {
        self.start
    }

    /// Last selected cell (inclusive)
    pub fn end(&self) -> SelectionPoint {
        self.end
    }

    /// Check if a cell at (row, col) is within the selection
    pub fn contains(&self, row: isize, col: usize) -> bool {
        if row < self.start.row || row > self.end.row {
            return false;
        }
        let after_start = row > self.start.row || col >= self.start.col;
        let before_end = row < self.end.row || col <= self.end.col;
        after_start && before_end
    }

    /// Extract the selected text.
    ///
    /// Rows are joined with `\n` except where the next row is a soft-wrap
    /// continuation. Segments running to the end of their row lose trailing
    /// blanks unless the row continues on the next one. Rows that are
    /// neither on screen nor in scrollback are skipped.
    pub fn extract_text(&self, screen: &Screen) -> String {
        let mut text = String::new();

        // Only rows that exist; a stale selection may reach far past them
        let first_row = self.start.row.max(-(screen.scrollback().len() as isize));
        let last_row = self.end.row.min(screen.rows() as isize - 1);

        for row in first_row..=last_row {
            let Some(line) = screen.line_at(row) else {
                continue;
            };
            let last = line.cols().saturating_sub(1);
            let from = if row == self.start.row { self.start.col } else { 0 };
            let to = if row == self.end.row {
                self.end.col.min(last)
            } else {
                last
            };
            let next_wrapped =
                row < last_row && screen.line_at(row + 1).map_or(false, Line::is_wrapped);

            let mut segment: String = line
                .cells()
                .iter()
                .enumerate()
                .skip(from)
                .take_while(|(col, _)| *col <= to)
                .filter(|(_, cell)| !cell.wide_continuation)
                .map(|(_, cell)| cell.display_char())
                .collect();

            if to == last && !next_wrapped {
                let trimmed = segment.trim_end_matches(' ').len();
                segment.truncate(trimmed);
            }

            text.push_str(&segment);
            if row < last_row && !next_wrapped {
                text.push('\n');
            }
        }

        text
    }
}

/// Where a search looks for matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchScope {
    /// The live screen only
    Screen,
    /// Scrollback (oldest first), then the live screen
    #[default]
    ScreenAndScrollback,
}

/// Lowercased text of one row with the column each character came from
#[derive(Debug, Clone, Default)]
struct RowText {
    chars: Vec<char>,
    cols: Vec<usize>,
}

impl RowText {
    fn from_line(line: &Line) -> Self {
        let mut row = RowText::default();
        for (col, cell) in line.cells().iter().enumerate() {
            if cell.wide_continuation {
                continue;
            }
            for lower in cell.display_char().to_lowercase() {
                row.chars.push(lower);
                row.cols.push(col);
            }
        }
        row
    }
}

/// Lazy, restartable iterator over case-insensitive matches.
///
/// Matches never span rows. Every start position is tried, so overlapping
/// matches are all reported. Cloning yields an independent cursor.
#[derive(Debug, Clone)]
pub struct SearchIter<'a> {
    screen: &'a Screen,
    needle: Vec<char>,
    /// Row being scanned
    row: isize,
    /// One past the last row to scan
    end_row: isize,
    /// Next start position within the current row text
    pos: usize,
    current: Option<RowText>,
}

impl<'a> SearchIter<'a> {
    pub fn new(screen: &'a Screen, query: &str, scope: SearchScope) -> Self {
        let start_row = match scope {
            SearchScope::Screen => 0,
            SearchScope::ScreenAndScrollback => -(screen.scrollback().len() as isize),
        };

        Self {
            screen,
            needle: query.chars().flat_map(char::to_lowercase).collect(),
            row: start_row,
            end_row: screen.rows() as isize,
            pos: 0,
            current: None,
        }
    }
}

impl Iterator for SearchIter<'_> {
    type Item = Selection;

    fn next(&mut self) -> Option<Selection> {
        let n = self.needle.len();
        if n == 0 {
            return None;
        }

        while self.row < self.end_row {
            let screen = self.screen;
            let row = self.row;
            let text = self.current.get_or_insert_with(|| {
                screen
                    .line_at(row)
                    .map(RowText::from_line)
                    .unwrap_or_default()
            });

            while self.pos + n <= text.chars.len() {
                let i = self.pos;
                self.pos += 1;

                if text.chars[i..i + n] == self.needle[..] {
                    let start_col = text.cols[i];
                    let mut end_col = text.cols[i + n - 1];
                    if let Some(cell) = screen.line_at(row).and_then(|l| l.cell(end_col)) {
                        if cell.is_wide() {
                            end_col += 1;
                        }
                    }
                    return Some(Selection::new(
                        SelectionPoint::new(row, start_col),
                        SelectionPoint::new(row, end_col),
                    ));
                }
            }

            self.row += 1;
            self.pos = 0;
            self.current = None;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_with(lines: &[&str], rows: usize, cols: usize) -> Screen {
        let mut screen = Screen::new(rows, cols, 100);
        for (i, text) in lines.iter().enumerate() {
            if i > 0 {
                screen.carriage_return();
                screen.linefeed();
            }
            for c in text.chars() {
                screen.print(c);
            }
        }
        screen
    }

    fn sel(r1: isize, c1: usize, r2: isize, c2: usize) -> Selection {
        Selection::new(SelectionPoint::new(r1, c1), SelectionPoint::new(r2, c2))
    }

    #[test]
    fn test_selection_normalized() {
        let s = sel(3, 5, 1, 2);
        assert_eq!(s.start(), SelectionPoint::new(1, 2));
        assert_eq!(s.end(), SelectionPoint::new(3, 5));

        let same_row = sel(0, 9, 0, 1);
        assert_eq!(same_row.start().col, 1);
    }

    #[test]
    fn test_selection_contains() {
        let s = sel(1, 5, 3, 2);
        assert!(!s.contains(0, 5));
        assert!(!s.contains(1, 4));
        assert!(s.contains(1, 5));
        assert!(s.contains(2, 0));
        assert!(s.contains(3, 2));
        assert!(!s.contains(3, 3));
    }

    #[test]
    fn test_extract_single_row_columns() {
        let screen = screen_with(&["0123456789"], 3, 20);
        assert_eq!(sel(0, 2, 0, 5).extract_text(&screen), "2345");
    }

    #[test]
    fn test_extract_multi_row_trims_and_joins() {
        let screen = screen_with(&["hello", "world"], 3, 10);
        assert_eq!(sel(0, 0, 1, 9).extract_text(&screen), "hello\nworld");
        assert_eq!(sel(0, 3, 1, 2).extract_text(&screen), "lo\nwor");
    }

    #[test]
    fn test_extract_soft_wrap_no_newline() {
        let screen = screen_with(&["abcdefgh"], 3, 5);
        assert_eq!(sel(0, 0, 1, 4).extract_text(&screen), "abcdefgh");
    }

    #[test]
    fn test_extract_keeps_blanks_before_wrap() {
        let mut screen = Screen::new(3, 4, 100);
        for c in "ab  cd".chars() {
            screen.print(c);
        }
        assert_eq!(sel(0, 0, 1, 3).extract_text(&screen), "ab  cd");
    }

    #[test]
    fn test_extract_skips_wide_continuation() {
        let screen = screen_with(&["中文ab"], 2, 10);
        assert_eq!(sel(0, 0, 0, 9).extract_text(&screen), "中文ab");
    }

    #[test]
    fn test_extract_from_scrollback() {
        let screen = screen_with(&["old", "mid", "new"], 2, 10);
        assert_eq!(sel(-1, 0, 1, 9).extract_text(&screen), "old\nmid\nnew");
        assert_eq!(sel(-1, 1, -1, 2).extract_text(&screen), "ld");
    }

    #[test]
    fn test_extract_skips_missing_rows() {
        let screen = screen_with(&["only"], 2, 10);
        assert_eq!(sel(-5, 0, 0, 9).extract_text(&screen), "only");
    }

    #[test]
    fn test_extract_clamps_extreme_rows() {
        let screen = screen_with(&["one", "two", "three", "four"], 3, 10);
        assert_eq!(screen.scrollback().len(), 1);

        let huge = sel(-(1 << 40), 0, 1 << 40, 9);
        assert_eq!(huge.extract_text(&screen), "one\ntwo\nthree\nfour");

        let (min, max) = (isize::MIN, isize::MAX);
        assert_eq!(sel(min, 0, max, usize::MAX).extract_text(&screen), "one\ntwo\nthree\nfour");

        // entirely outside the buffer
        assert_eq!(sel(50, 0, 60, 5).extract_text(&screen), "");
        assert_eq!(sel(-60, 0, -50, 5).extract_text(&screen), "");
    }

    #[test]
    fn test_search_case_insensitive() {
        let screen = screen_with(&["Hello world", "say HELLO"], 3, 20);
        let matches: Vec<Selection> =
            SearchIter::new(&screen, "hello", SearchScope::Screen).collect();
        assert_eq!(matches, vec![sel(0, 0, 0, 4), sel(1, 4, 1, 8)]);
    }

    #[test]
    fn test_search_overlapping() {
        let screen = screen_with(&["aaaa"], 1, 10);
        let count = SearchIter::new(&screen, "aa", SearchScope::Screen).count();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_search_scrollback_first() {
        let screen = screen_with(&["needle one", "other", "needle two"], 2, 20);
        let rows: Vec<isize> = SearchIter::new(&screen, "needle", SearchScope::ScreenAndScrollback)
            .map(|s| s.start().row)
            .collect();
        assert_eq!(rows, vec![-1, 1]);

        let screen_only = SearchIter::new(&screen, "needle", SearchScope::Screen).count();
        assert_eq!(screen_only, 1);
    }

    #[test]
    fn test_search_empty_query() {
        let screen = screen_with(&["text"], 1, 10);
        assert_eq!(SearchIter::new(&screen, "", SearchScope::Screen).count(), 0);
    }

    #[test]
    fn test_search_does_not_span_rows() {
        let screen = screen_with(&["abcde"], 2, 3);
        assert_eq!(SearchIter::new(&screen, "cd", SearchScope::Screen).count(), 0);
    }

    #[test]
    fn test_search_iter_restartable() {
        let screen = screen_with(&["x x x"], 1, 10);
        let mut iter = SearchIter::new(&screen, "x", SearchScope::Screen);
        iter.next();
        let fork = iter.clone();
        assert_eq!(iter.count(), 2);
        assert_eq!(fork.count(), 2);
    }

    #[test]
    fn test_search_wide_match_covers_both_cells() {
        let screen = screen_with(&["a中b"], 1, 10);
        let found: Vec<Selection> = SearchIter::new(&screen, "中", SearchScope::Screen).collect();
        assert_eq!(found, vec![sel(0, 1, 0, 2)]);
        assert_eq!(found[0].extract_text(&screen), "中");
    }
}
