//! Scrollback buffer implementation
//!
//! The scrollback buffer stores lines that have scrolled off the top of the
//! visible screen. Lines are appended at the tail and evicted from the head
//! once the configured capacity is reached.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::line::Line;

/// FIFO buffer of lines that scrolled off the screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scrollback {
    /// Oldest line at the front
    lines: VecDeque<Line>,
    /// Maximum number of lines to store
    capacity: usize,
}

impl Scrollback {
    /// Create a new scrollback buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            // Don't pre-allocate huge buffers for large capacities
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Get the number of lines in the scrollback
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the scrollback is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the maximum capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a line, evicting the oldest one when full
    pub fn push(&mut self, line: Line) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Push several lines, oldest first
    pub fn extend(&mut self, lines: impl IntoIterator<Item = Line>) {
        for line in lines {
            self.push(line);
        }
    }

    /// Remove and return the most recent line
    pub fn pop_newest(&mut self) -> Option<Line> {
        self.lines.pop_back()
    }

    /// Get a line by index (0 = oldest line in scrollback)
    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Get a line by index from the end (0 = most recent line)
    pub fn get_from_end(&self, index: usize) -> Option<&Line> {
        let index = self.lines.len().checked_sub(index + 1)?;
        self.lines.get(index)
    }

    /// Clear all lines from the scrollback
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Iterate over all lines from oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Line> + ExactSizeIterator {
        self.lines.iter()
    }

    /// Set a new capacity, dropping the oldest lines if shrinking
    pub fn set_capacity(&mut self, capacity: usize) {
        if self.lines.len() > capacity {
            let excess = self.lines.len() - capacity;
            self.lines.drain(..excess);
        }
        self.capacity = capacity;
    }
}
