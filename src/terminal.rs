//! Terminal Executor
//!
//! Ties together the parser and the screen model: bytes are parsed into
//! actions and each action is applied to the screen. This is also the
//! public face of the engine, exposing views, selection, search and input
//! encoding over the current state.
//!
//! Nothing here fails. Unsupported sequences are logged and dropped.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{ColorPalette, EngineConfig};
use crate::core::{
    Cursor, CursorShape, Line, Modes, Screen, SearchIter, SearchScope, Selection, SelectionPoint,
    Snapshot,
};
use crate::input::{self, KeyEvent};
use crate::parser::{
    Action, ControlCode, CsiAction, EscAction, OscAction, Parser, SgrAttribute,
};

/// Reply bytes held for the transport before further replies are dropped
pub const MAX_PENDING_RESPONSES: usize = 4096;

/// Callback invoked with the new version after every mutation
pub type UpdateCallback = Box<dyn FnMut(u64) + Send + Sync>;

/// Terminal executor that processes parsed actions and updates the screen
pub struct Terminal {
    /// The terminal screen
    screen: Screen,
    /// The escape sequence parser
    parser: Parser,
    /// Bumped by every mutation
    version: u64,
    /// Replies to DSR/DA queries, waiting for the transport
    responses: Vec<u8>,
    /// Colors used to resolve cells for the renderer
    palette: ColorPalette,
    on_update: Option<UpdateCallback>,
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("screen", &self.screen)
            .field("parser", &self.parser)
            .field("version", &self.version)
            .field("responses", &self.responses)
            .finish_non_exhaustive()
    }
}

impl Terminal {
    /// Create a new terminal with the given dimensions (clamped to at least 1x1)
    pub fn new(rows: usize, cols: usize, scrollback_capacity: usize) -> Self {
        Self::from_screen(
            Screen::new(rows, cols, scrollback_capacity),
            ColorPalette::default(),
        )
    }

    /// Create a terminal from an engine configuration
    pub fn with_config(config: &EngineConfig) -> Self {
        let screen = Screen::with_tab_width(
            config.rows,
            config.cols,
            config.scrollback_lines,
            config.tab_width,
        );
        Self::from_screen(screen, config.palette.clone())
    }

    fn from_screen(screen: Screen, palette: ColorPalette) -> Self {
        Self {
            screen,
            parser: Parser::new(),
            version: 0,
            responses: Vec::new(),
            palette,
            on_update: None,
        }
    }

    /// Get a reference to the screen
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn rows(&self) -> usize {
        self.screen.rows()
    }

    pub fn cols(&self) -> usize {
        self.screen.cols()
    }

    /// Process bytes from the transport. Sequences split across calls are
    /// resumed on the next call.
    pub fn feed(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let actions = self.parser.feed(data);
        trace!(bytes = data.len(), actions = actions.len(), "feed");
        for action in actions {
            self.apply_action(action);
        }
        self.bump_version();
    }

    /// Apply a single parsed action
    pub fn apply(&mut self, action: Action) {
        self.apply_action(action);
        self.bump_version();
    }

    /// Resize the terminal; dimensions are clamped to at least 1x1
    pub fn resize(&mut self, rows: usize, cols: usize) {
        debug!(rows, cols, "resize");
        self.screen.resize(rows, cols);
        self.bump_version();
    }

    /// Blank the active screen and home the cursor
    pub fn clear_screen(&mut self) {
        self.screen.clear_screen();
        self.bump_version();
    }

    /// Drop all scrollback
    pub fn clear_scrollback(&mut self) {
        self.screen.clear_scrollback();
        self.bump_version();
    }

    /// Exactly `rows` lines, `scroll_offset` lines back into history
    pub fn visible_lines(&self, scroll_offset: usize) -> Vec<Line> {
        self.screen.visible_lines(scroll_offset)
    }

    pub fn cursor(&self) -> Cursor {
        self.screen.cursor().clone()
    }

    /// A render snapshot tagged with the current version
    pub fn snapshot(&self, scroll_offset: usize) -> Snapshot {
        Snapshot::capture(&self.screen, self.version, scroll_offset)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Register a callback invoked after each feed, resize or clear
    pub fn set_update_callback<F>(&mut self, callback: F)
    where
        F: FnMut(u64) + Send + Sync + 'static,
    {
        self.on_update = Some(Box::new(callback));
    }

    pub fn clear_update_callback(&mut self) {
        self.on_update = None;
    }

    /// Drain the bytes queued in reply to terminal queries. At most
    /// [`MAX_PENDING_RESPONSES`] bytes are held; replies that would not
    /// fit are dropped whole.
    pub fn take_responses(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.responses)
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: ColorPalette) {
        self.palette = palette;
    }

    /// Foreground and background RGB of a cell on the active screen,
    /// with reverse video applied
    pub fn cell_colors(&self, row: usize, col: usize) -> Option<((u8, u8, u8), (u8, u8, u8))> {
        self.screen
            .cell(row, col)
            .map(|cell| self.palette.resolve_cell(cell))
    }

    pub fn title(&self) -> &str {
        self.screen.title()
    }

    pub fn icon_name(&self) -> &str {
        self.screen.icon_name()
    }

    pub fn modes(&self) -> &Modes {
        self.screen.modes()
    }

    pub fn scrollback_len(&self) -> usize {
        self.screen.scrollback().len()
    }

    /// Selection between two points, normalized to reading order
    pub fn select(&self, start: SelectionPoint, end: SelectionPoint) -> Selection {
        Selection::new(start, end)
    }

    pub fn extract_text(&self, selection: &Selection) -> String {
        selection.extract_text(&self.screen)
    }

    /// Case-insensitive search over scrollback then the screen
    pub fn search(&self, query: &str) -> SearchIter<'_> {
        self.search_in(query, SearchScope::ScreenAndScrollback)
    }

    pub fn search_in(&self, query: &str, scope: SearchScope) -> SearchIter<'_> {
        SearchIter::new(&self.screen, query, scope)
    }

    /// Encode a key press for the current modes
    pub fn encode_key(&self, event: &KeyEvent) -> Vec<u8> {
        input::encode_key(event, self.screen.modes())
    }

    /// Encode pasted text for the current modes
    pub fn encode_paste(&self, text: &str) -> Vec<u8> {
        input::encode_paste(text, self.screen.modes())
    }

    fn bump_version(&mut self) {
        self.version += 1;
        if let Some(callback) = self.on_update.as_mut() {
            callback(self.version);
        }
    }

    fn respond(&mut self, bytes: &[u8]) {
        if self.responses.len() + bytes.len() > MAX_PENDING_RESPONSES {
            debug!(
                pending = self.responses.len(),
                dropped = bytes.len(),
                "response queue full, dropping reply"
            );
            return;
        }
        self.responses.extend_from_slice(bytes);
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Print(c) => self.screen.print(c),
            Action::Control(code) => self.execute_control(code),
            Action::Csi(csi) => self.execute_csi(&csi),
            Action::Esc(esc) => self.execute_esc(esc),
            Action::Osc(osc) => self.execute_osc(osc),
            Action::DcsIgnored => trace!("DCS sequence ignored"),
        }
    }

    /// Execute a C0 control character
    fn execute_control(&mut self, code: ControlCode) {
        match code {
            ControlCode::Null => {}
            ControlCode::Bell => debug!("bell"),
            ControlCode::Backspace => self.screen.backspace(),
            ControlCode::Tab => self.screen.tab(1),
            // VT and FF are treated as LF
            ControlCode::LineFeed | ControlCode::VerticalTab | ControlCode::FormFeed => {
                self.screen.linefeed()
            }
            ControlCode::CarriageReturn => self.screen.carriage_return(),
            ControlCode::ShiftOut => self.screen.charsets_mut().shift_out(),
            ControlCode::ShiftIn => self.screen.charsets_mut().shift_in(),
            ControlCode::Other(byte) => trace!(byte, "ignoring C0 control"),
        }
    }

    /// Execute a CSI sequence
    fn execute_csi(&mut self, csi: &CsiAction) {
        match csi.private_marker {
            None => {}
            Some(b'?') => {
                self.execute_csi_private(csi);
                return;
            }
            Some(marker) => {
                debug!(
                    marker = %(marker as char),
                    final_byte = %(csi.final_byte as char),
                    "unhandled CSI with private marker"
                );
                return;
            }
        }

        match (csi.intermediates.as_slice(), csi.final_byte) {
            ([], _) => {}
            ([b'!'], b'p') => {
                // DECSTR - Soft Terminal Reset
                self.screen.soft_reset();
                return;
            }
            ([b' '], b'q') => {
                // DECSCUSR - Set Cursor Style
                self.set_cursor_style(csi.param(0, 0));
                return;
            }
            _ => {
                debug!(
                    intermediates = ?csi.intermediates,
                    final_byte = %(csi.final_byte as char),
                    "unhandled CSI"
                );
                return;
            }
        }

        let count = |index| usize::from(csi.param_or_default(index, 1));

        match csi.final_byte {
            // Cursor movement
            b'A' => self.screen.move_cursor_up(count(0)),
            // CUD, VPR
            b'B' | b'e' => self.screen.move_cursor_down(count(0)),
            // CUF, HPR
            b'C' | b'a' => self.screen.move_cursor_forward(count(0)),
            b'D' => self.screen.move_cursor_backward(count(0)),
            b'E' => {
                // CNL - Cursor Next Line
                self.screen.move_cursor_down(count(0));
                self.screen.carriage_return();
            }
            b'F' => {
                // CPL - Cursor Previous Line
                self.screen.move_cursor_up(count(0));
                self.screen.carriage_return();
            }
            // CHA, HPA
            b'G' | b'`' => self.screen.move_cursor_to_col(count(0) - 1),
            b'H' | b'f' => {
                // CUP, HVP
                self.screen.move_cursor_to(count(0) - 1, count(1) - 1);
            }
            // VPA
            b'd' => self.screen.move_cursor_to_row(count(0) - 1),
            // CHT, CBT
            b'I' => self.screen.tab(count(0)),
            b'Z' => self.screen.back_tab(count(0)),

            // Erase operations
            b'J' => self.screen.erase_in_display(csi.param(0, 0)),
            b'K' => self.screen.erase_in_line(csi.param(0, 0)),
            b'X' => self.screen.erase_chars(count(0)),

            // Insert/Delete
            b'L' => self.screen.insert_lines(count(0)),
            b'M' => self.screen.delete_lines(count(0)),
            b'@' => self.screen.insert_chars(count(0)),
            b'P' => self.screen.delete_chars(count(0)),

            // Scroll
            b'S' => self.screen.scroll_up(count(0)),
            b'T' => self.screen.scroll_down(count(0)),

            b'r' => {
                // DECSTBM - Set Top and Bottom Margins
                let top = count(0) - 1;
                let bottom = match csi.param(1, 0) {
                    0 => self.screen.rows(),
                    n => usize::from(n),
                } - 1;
                self.screen.set_scroll_region(top, bottom);
            }

            b'm' => self.execute_sgr(csi),

            b'g' => {
                // TBC - Tab Clear
                match csi.param(0, 0) {
                    0 => self.screen.clear_tab_stop(),
                    3 => self.screen.clear_all_tab_stops(),
                    mode => debug!(mode, "unknown tab clear mode"),
                }
            }

            // SCOSC/SCORC; with parameters these are margin settings
            b's' if csi.params.is_empty() => self.screen.save_cursor(),
            b'u' if csi.params.is_empty() => self.screen.restore_cursor(),

            // SM/RM - Set/Reset Mode
            b'h' => self.set_ansi_modes(csi, true),
            b'l' => self.set_ansi_modes(csi, false),

            b'n' => {
                // DSR - Device Status Report
                match csi.param(0, 0) {
                    5 => self.respond(b"\x1b[0n"),
                    6 => self.report_cursor_position(),
                    other => debug!(request = other, "unknown status report request"),
                }
            }
            b'c' => {
                // DA1 - Primary Device Attributes
                if csi.param(0, 0) == 0 {
                    self.respond(b"\x1b[?1;2c");
                }
            }

            // REP - Repeat preceding character
            b'b' => self.screen.repeat_last(count(0)),

            _ => {
                debug!(
                    params = ?csi.params,
                    final_byte = %(csi.final_byte as char),
                    "unhandled CSI"
                );
            }
        }
    }

    /// Execute a private CSI sequence (starts with ?)
    fn execute_csi_private(&mut self, csi: &CsiAction) {
        match csi.final_byte {
            b'h' => {
                // DECSET - DEC Private Mode Set
                for &mode in &csi.params {
                    self.set_dec_mode(mode, true);
                }
            }
            b'l' => {
                // DECRST - DEC Private Mode Reset
                for &mode in &csi.params {
                    self.set_dec_mode(mode, false);
                }
            }
            _ => {
                debug!(
                    params = ?csi.params,
                    final_byte = %(csi.final_byte as char),
                    "unhandled private CSI"
                );
            }
        }
    }

    /// Set or reset a DEC private mode
    fn set_dec_mode(&mut self, mode: u16, enable: bool) {
        match mode {
            6 => {
                // DECOM - Origin Mode; homes the cursor either way
                self.screen.modes_mut().origin = enable;
                self.screen.move_cursor_to(0, 0);
            }
            12 => {
                // Cursor blinking (att610)
                self.screen.cursor_mut().blinking = enable;
            }
            25 => {
                // DECTCEM - Text Cursor Enable Mode
                self.screen.cursor_mut().visible = enable;
            }
            47 | 1047 => {
                // Alternate screen buffer without cursor save
                if enable {
                    self.screen.enter_alternate_screen(false);
                } else {
                    self.screen.exit_alternate_screen(false);
                }
            }
            1048 => {
                // Save/restore cursor
                if enable {
                    self.screen.save_cursor();
                } else {
                    self.screen.restore_cursor();
                }
            }
            1049 => {
                // Alternate screen buffer with cursor save/restore
                if enable {
                    self.screen.enter_alternate_screen(true);
                } else {
                    self.screen.exit_alternate_screen(true);
                }
            }
            _ => {
                if !self.screen.modes_mut().set_dec_mode(mode, enable) {
                    debug!(mode, enable, "unknown DEC mode");
                }
            }
        }
    }

    /// Set or reset ANSI modes
    fn set_ansi_modes(&mut self, csi: &CsiAction, enable: bool) {
        for &mode in &csi.params {
            if !self.screen.modes_mut().set_ansi_mode(mode, enable) {
                debug!(mode, enable, "unknown ANSI mode");
            }
        }
    }

    /// DECSCUSR: 0/1 blinking block, 2 steady block, 3/4 underline, 5/6 bar
    fn set_cursor_style(&mut self, style: u16) {
        let (shape, blinking) = match style {
            0 | 1 => (CursorShape::Block, true),
            2 => (CursorShape::Block, false),
            3 => (CursorShape::Underline, true),
            4 => (CursorShape::Underline, false),
            5 => (CursorShape::Bar, true),
            6 => (CursorShape::Bar, false),
            _ => {
                debug!(style, "unknown cursor style");
                return;
            }
        };
        let cursor = self.screen.cursor_mut();
        cursor.shape = shape;
        cursor.blinking = blinking;
    }

    /// CPR - reply with the 1-based cursor position (region-relative in
    /// origin mode)
    fn report_cursor_position(&mut self) {
        let cursor = self.screen.cursor();
        let top = if self.screen.modes().origin {
            self.screen.scroll_region().0
        } else {
            0
        };
        let reply = format!(
            "\x1b[{};{}R",
            cursor.row.saturating_sub(top) + 1,
            cursor.col + 1
        );
        self.respond(reply.as_bytes());
    }

    /// Execute SGR (Select Graphic Rendition)
    fn execute_sgr(&mut self, csi: &CsiAction) {
        let cursor = self.screen.cursor_mut();

        for attr in csi.parse_sgr() {
            match attr {
                SgrAttribute::Reset => cursor.reset_attributes(),
                SgrAttribute::Bold => cursor.style.bold = true,
                SgrAttribute::Dim => cursor.style.dim = true,
                SgrAttribute::Italic => cursor.style.italic = true,
                SgrAttribute::Underline => cursor.style.underline = true,
                SgrAttribute::Blink => cursor.style.blink = true,
                SgrAttribute::Reverse => cursor.style.reverse = true,
                SgrAttribute::Hidden => cursor.style.hidden = true,
                SgrAttribute::Strikethrough => cursor.style.strikethrough = true,
                SgrAttribute::NotBold => cursor.style.bold = false,
                SgrAttribute::NormalIntensity => {
                    cursor.style.bold = false;
                    cursor.style.dim = false;
                }
                SgrAttribute::NotItalic => cursor.style.italic = false,
                SgrAttribute::NotUnderlined => cursor.style.underline = false,
                SgrAttribute::NotBlinking => cursor.style.blink = false,
                SgrAttribute::NotReversed => cursor.style.reverse = false,
                SgrAttribute::NotHidden => cursor.style.hidden = false,
                SgrAttribute::NotStrikethrough => cursor.style.strikethrough = false,
                SgrAttribute::Foreground(color) => cursor.fg = color,
                SgrAttribute::Background(color) => cursor.bg = color,
            }
        }
    }

    /// Execute an ESC sequence
    fn execute_esc(&mut self, esc: EscAction) {
        match esc {
            EscAction::SaveCursor => self.screen.save_cursor(),
            EscAction::RestoreCursor => self.screen.restore_cursor(),
            EscAction::Index => self.screen.index(),
            EscAction::ReverseIndex => self.screen.reverse_index(),
            EscAction::NextLine => self.screen.next_line(),
            EscAction::TabSet => self.screen.set_tab_stop(),
            EscAction::FullReset => {
                debug!("full reset");
                self.screen.full_reset();
            }
            EscAction::ApplicationKeypad => self.screen.modes_mut().application_keypad = true,
            EscAction::NormalKeypad => self.screen.modes_mut().application_keypad = false,
            EscAction::DesignateCharset { slot, charset } => {
                self.screen.charsets_mut().designate(slot, charset);
            }
            EscAction::AlignmentTest => self.screen.alignment_test(),
            EscAction::Unknown(bytes) => debug!(?bytes, "unknown ESC sequence"),
        }
    }

    /// Execute an OSC sequence
    fn execute_osc(&mut self, osc: OscAction) {
        match osc {
            OscAction::SetIconAndTitle(title) => {
                self.screen.set_icon_name(title.clone());
                self.screen.set_title(title);
            }
            OscAction::SetIconName(name) => self.screen.set_icon_name(name),
            OscAction::SetTitle(title) => self.screen.set_title(title),
            OscAction::Hyperlink { params, uri } => {
                trace!(%params, %uri, "hyperlink");
                self.screen.cursor_mut().hyperlink = if uri.is_empty() {
                    None
                } else {
                    Some(Arc::from(uri))
                };
            }
            OscAction::Unknown(payload) => {
                let command = payload.split(';').next().unwrap_or_default();
                debug!(command, len = payload.len(), "unknown OSC");
            }
        }
    }
}
