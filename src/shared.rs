//! Shared terminal handle
//!
//! A cloneable handle for hosts where the transport reader and the renderer
//! live on different threads. Mutations take the write lock, so chunks and
//! resizes are applied one at a time in call order. Reads take the read
//! lock and may run concurrently with each other.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::EngineConfig;
use crate::core::{Cursor, Line, SearchScope, Selection, SelectionPoint, Snapshot};
use crate::input::KeyEvent;
use crate::terminal::Terminal;

/// Single-writer / multi-reader handle around a [`Terminal`]
#[derive(Debug, Clone)]
pub struct SharedTerminal {
    inner: Arc<RwLock<Terminal>>,
}

impl SharedTerminal {
    pub fn new(terminal: Terminal) -> Self {
        Self {
            inner: Arc::new(RwLock::new(terminal)),
        }
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self::new(Terminal::with_config(config))
    }

    /// Lock for reading; for queries not covered by the helpers below
    pub fn read(&self) -> RwLockReadGuard<'_, Terminal> {
        self.inner.read()
    }

    /// Lock for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, Terminal> {
        self.inner.write()
    }

    pub fn feed(&self, data: &[u8]) {
        self.inner.write().feed(data);
    }

    pub fn resize(&self, rows: usize, cols: usize) {
        self.inner.write().resize(rows, cols);
    }

    pub fn clear_screen(&self) {
        self.inner.write().clear_screen();
    }

    pub fn clear_scrollback(&self) {
        self.inner.write().clear_scrollback();
    }

    pub fn take_responses(&self) -> Vec<u8> {
        self.inner.write().take_responses()
    }

    pub fn set_update_callback<F>(&self, callback: F)
    where
        F: FnMut(u64) + Send + Sync + 'static,
    {
        self.inner.write().set_update_callback(callback);
    }

    pub fn visible_lines(&self, scroll_offset: usize) -> Vec<Line> {
        self.inner.read().visible_lines(scroll_offset)
    }

    pub fn cursor(&self) -> Cursor {
        self.inner.read().cursor()
    }

    pub fn snapshot(&self, scroll_offset: usize) -> Snapshot {
        self.inner.read().snapshot(scroll_offset)
    }

    pub fn version(&self) -> u64 {
        self.inner.read().version()
    }

    pub fn select(&self, start: SelectionPoint, end: SelectionPoint) -> Selection {
        Selection::new(start, end)
    }

    pub fn extract_text(&self, selection: &Selection) -> String {
        self.inner.read().extract_text(selection)
    }

    /// All matches, collected while the read lock is held. Use
    /// [`SharedTerminal::read`] to iterate lazily instead.
    pub fn search(&self, query: &str) -> Vec<Selection> {
        self.search_in(query, SearchScope::ScreenAndScrollback)
    }

    pub fn search_in(&self, query: &str, scope: SearchScope) -> Vec<Selection> {
        self.inner.read().search_in(query, scope).collect()
    }

    pub fn encode_key(&self, event: &KeyEvent) -> Vec<u8> {
        self.inner.read().encode_key(event)
    }

    pub fn encode_paste(&self, text: &str) -> Vec<u8> {
        self.inner.read().encode_paste(text)
    }
}

impl From<Terminal> for SharedTerminal {
    fn from(terminal: Terminal) -> Self {
        Self::new(terminal)
    }
}
