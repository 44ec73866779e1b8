//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - Screen model (primary and alternate screens, scroll region, resize)
//! - Cell, line and grid representation with attributes
//! - Cursor state and positioning
//! - Scrollback buffer
//! - Selection and search over screen and scrollback
//! - Deterministic snapshot generation
//!
//! The core is completely deterministic: given the same sequence of
//! terminal actions, it always produces the same state.

mod cell;
mod charset;
mod cursor;
mod grid;
mod line;
mod modes;
mod screen;
mod scrollback;
mod selection;
mod snapshot;

pub use cell::{char_width, Cell, Color, NamedColor, Style};
pub use charset::{Charset, CharsetState};
pub use cursor::{Cursor, CursorShape, SavedCursor};
pub use grid::Grid;
pub use line::Line;
pub use modes::Modes;
pub use screen::{Screen, DEFAULT_TAB_WIDTH};
pub use scrollback::Scrollback;
pub use selection::{SearchIter, SearchScope, Selection, SelectionPoint};
pub use snapshot::{
    CellSnapshot, ColorSnapshot, CursorSnapshot, LineSnapshot, Snapshot, StyleSnapshot,
};
