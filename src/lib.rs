//! termgrid: a terminal emulation engine
//!
//! Turns the byte stream a shell produces into a structured screen model,
//! and turns local key presses and pastes back into bytes for the shell.
//!
//! - `parser`: resumable VT/xterm escape sequence parser
//! - `core`: screen model, cells, cursor, scrollback, selection, snapshots
//! - `terminal`: applies parsed actions to the screen
//! - `input`: key and paste encoding
//! - `config`: engine configuration and color palette
//! - `shared`: lock-protected handle for multi-threaded hosts
//!
//! ```
//! use termgrid::Terminal;
//!
//! let mut term = Terminal::new(24, 80, 1000);
//! term.feed(b"\x1b[1mhello\x1b[0m world");
//! assert_eq!(term.snapshot(0).to_text(), "hello world\n");
//! ```

pub mod config;
pub mod core;
pub mod input;
pub mod parser;
pub mod shared;
pub mod terminal;

pub use config::{ColorPalette, ConfigError, EngineConfig};
pub use core::{Cursor, Line, Modes, SearchIter, SearchScope, Selection, SelectionPoint, Snapshot};
pub use input::{Key, KeyEvent, Modifiers};
pub use shared::SharedTerminal;
pub use terminal::Terminal;
