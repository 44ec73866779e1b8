//! Terminal mode flags
//!
//! Mode flags that change how input is interpreted or encoded. Modes whose
//! effect goes beyond a flag (alternate screen, origin mode, cursor
//! visibility) are switched by the terminal, which keeps these flags in sync.

use serde::{Deserialize, Serialize};

/// Terminal mode flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    /// DECAWM - Auto wrap mode
    /// When enabled, characters written past the right margin wrap to the next line
    pub autowrap: bool,

    /// DECOM - Origin mode
    /// When enabled, cursor positions are relative to the scroll region
    pub origin: bool,

    /// IRM - Insert/Replace mode
    /// When enabled, characters are inserted rather than overwriting
    pub insert: bool,

    /// LNM - Line feed/new line mode
    /// When enabled, LF also performs CR and Enter sends CR LF
    pub linefeed_newline: bool,

    /// DECCKM - Cursor key mode
    /// When enabled, cursor keys send `ESC O x` instead of `ESC [ x`
    pub application_cursor: bool,

    /// DECKPAM/DECKPNM - Keypad mode
    pub application_keypad: bool,

    /// Bracketed paste mode (DECSET 2004)
    pub bracketed_paste: bool,

    /// Alternate screen buffer active (DECSET 47/1047/1049)
    pub alternate_screen: bool,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            autowrap: true,
            origin: false,
            insert: false,
            linefeed_newline: false,
            application_cursor: false,
            application_keypad: false,
            bracketed_paste: false,
            alternate_screen: false,
        }
    }
}

impl Modes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all modes to default values
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set or reset a flag-only DEC private mode (`CSI ? Ps h/l`).
    /// Returns true if the mode was recognized.
    pub fn set_dec_mode(&mut self, mode: u16, enable: bool) -> bool {
        let flag = match mode {
            1 => &mut self.application_cursor,
            7 => &mut self.autowrap,
            66 => &mut self.application_keypad,
            2004 => &mut self.bracketed_paste,
            _ => return false,
        };
        *flag = enable;
        true
    }

    /// Set or reset an ANSI mode (`CSI Ps h/l`).
    /// Returns true if the mode was recognized.
    pub fn set_ansi_mode(&mut self, mode: u16, enable: bool) -> bool {
        let flag = match mode {
            4 => &mut self.insert,
            20 => &mut self.linefeed_newline,
            _ => return false,
        };
        *flag = enable;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_default() {
        let modes = Modes::new();
        assert!(modes.autowrap);
        assert!(!modes.origin);
        assert!(!modes.insert);
        assert!(!modes.bracketed_paste);
        assert!(!modes.alternate_screen);
    }

    #[test]
    fn test_dec_mode_set_reset() {
        let mut modes = Modes::new();

        assert!(modes.set_dec_mode(2004, true));
        assert!(modes.bracketed_paste);

        assert!(modes.set_dec_mode(2004, false));
        assert!(!modes.bracketed_paste);

        assert!(modes.set_dec_mode(1, true));
        assert!(modes.application_cursor);
    }

    #[test]
    fn test_ansi_modes() {
        let mut modes = Modes::new();

        modes.set_ansi_mode(4, true);
        assert!(modes.insert);

        modes.set_ansi_mode(4, false);
        assert!(!modes.insert);
    }

    #[test]
    fn test_unknown_mode() {
        let mut modes = Modes::new();
        assert!(!modes.set_dec_mode(9999, true));
        assert!(!modes.set_ansi_mode(9999, false));
        assert_eq!(modes, Modes::default());
    }
}
