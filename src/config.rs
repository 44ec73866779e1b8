//! Engine configuration
//!
//! Dimensions, scrollback capacity and tab width for a new terminal, plus
//! the default color palette used to resolve cell colors at the rendering
//! boundary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{Cell, Color, DEFAULT_TAB_WIDTH};

/// Terminal engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial number of rows
    pub rows: usize,
    /// Initial number of columns
    pub cols: usize,
    /// Maximum scrollback lines (0 disables scrollback)
    pub scrollback_lines: usize,
    /// Distance between default tab stops
    pub tab_width: usize,
    /// Colors the terminal resolves cells with for the host renderer
    /// (`Terminal::cell_colors`)
    pub palette: ColorPalette,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            scrollback_lines: 10000,
            tab_width: DEFAULT_TAB_WIDTH,
            palette: ColorPalette::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from the default location or return the default
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded engine config");
                config
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring unreadable config");
                Self::default()
            }
        }
    }
}

/// `~/.config/termgrid/config.json`
fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("termgrid")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Default colors for resolving cells to RGB
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    /// Default foreground color
    pub foreground: (u8, u8, u8),
    /// Default background color
    pub background: (u8, u8, u8),
    /// The 16 ANSI colors (0-7 normal, 8-15 bright)
    pub ansi: [(u8, u8, u8); 16],
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            foreground: (229, 229, 229),
            background: (0, 0, 0),
            // xterm defaults
            ansi: [
                (0, 0, 0),       // 0: Black
                (205, 0, 0),     // 1: Red
                (0, 205, 0),     // 2: Green
                (205, 205, 0),   // 3: Yellow
                (0, 0, 238),     // 4: Blue
                (205, 0, 205),   // 5: Magenta
                (0, 205, 205),   // 6: Cyan
                (229, 229, 229), // 7: White
                (127, 127, 127), // 8: Bright Black
                (255, 0, 0),     // 9: Bright Red
                (0, 255, 0),     // 10: Bright Green
                (255, 255, 0),   // 11: Bright Yellow
                (92, 92, 255),   // 12: Bright Blue
                (255, 0, 255),   // 13: Bright Magenta
                (0, 255, 255),   // 14: Bright Cyan
                (255, 255, 255), // 15: Bright White
            ],
        }
    }
}

impl ColorPalette {
    /// Get the RGB color for an indexed color (0-255)
    pub fn indexed(&self, index: u8) -> (u8, u8, u8) {
        match index {
            // ANSI colors
            0..=15 => self.ansi[usize::from(index)],
            // 216 color cube (16-231)
            16..=231 => {
                let n = index - 16;
                let b = n % 6;
                let g = (n / 6) % 6;
                let r = n / 36;
                let to_component = |c: u8| if c == 0 { 0 } else { 55 + c * 40 };
                (to_component(r), to_component(g), to_component(b))
            }
            // Grayscale (232-255)
            232..=255 => {
                let gray = 8 + (index - 232) * 10;
                (gray, gray, gray)
            }
        }
    }

    /// Convert a color to RGB
    pub fn resolve(&self, color: Color, is_foreground: bool) -> (u8, u8, u8) {
        match color {
            Color::Default if is_foreground => self.foreground,
            Color::Default => self.background,
            Color::Named(named) => self.ansi[usize::from(named.index())],
            Color::Bright(named) => self.ansi[usize::from(named.index()) + 8],
            Color::Indexed(i) => self.indexed(i),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }

    /// Foreground and background RGB for a cell, with reverse video applied
    pub fn resolve_cell(&self, cell: &Cell) -> ((u8, u8, u8), (u8, u8, u8)) {
        let fg = self.resolve(cell.fg, true);
        let bg = self.resolve(cell.bg, false);
        if cell.style.reverse {
            (bg, fg)
        } else {
            (fg, bg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NamedColor;

    #[test]
    fn test_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.rows, 24);
        assert_eq!(config.cols, 80);
        assert_eq!(config.scrollback_lines, 10000);
        assert_eq!(config.tab_width, 8);
    }

    #[test]
    fn test_color_palette_indexed() {
        let palette = ColorPalette::default();

        // ANSI colors
        assert_eq!(palette.indexed(0), (0, 0, 0));
        assert_eq!(palette.indexed(1), (205, 0, 0));

        // Color cube
        assert_eq!(palette.indexed(16), (0, 0, 0));
        assert_eq!(palette.indexed(231), (255, 255, 255));

        // Grayscale
        assert_eq!(palette.indexed(232), (8, 8, 8));
        assert_eq!(palette.indexed(255), (238, 238, 238));
    }

    #[test]
    fn test_resolve_named_and_bright() {
        let palette = ColorPalette::default();
        assert_eq!(palette.resolve(Color::Named(NamedColor::Red), true), (205, 0, 0));
        assert_eq!(palette.resolve(Color::Bright(NamedColor::Red), true), (255, 0, 0));
        assert_eq!(palette.resolve(Color::Default, true), palette.foreground);
        assert_eq!(palette.resolve(Color::Default, false), palette.background);
        assert_eq!(palette.resolve(Color::Rgb(1, 2, 3), false), (1, 2, 3));
    }

    #[test]
    fn test_resolve_cell_reverse() {
        let palette = ColorPalette::default();
        let mut cell = Cell::new('x');
        cell.fg = Color::Named(NamedColor::Green);
        cell.style.reverse = true;

        let (fg, bg) = palette.resolve_cell(&cell);
        assert_eq!(fg, palette.background);
        assert_eq!(bg, (0, 205, 0));
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = EngineConfig {
            rows: 40,
            scrollback_lines: 50,
            ..EngineConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "cols": 132 }"#).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.cols, 132);
        assert_eq!(loaded.rows, 24);
    }

    #[test]
    fn test_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(EngineConfig::load(&missing), Err(ConfigError::Io(_))));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "not json").unwrap();
        assert!(matches!(EngineConfig::load(&bad), Err(ConfigError::Json(_))));
    }
}
