//! End-to-end tests for the terminal engine
//!
//! Each test feeds a byte sequence through the public `Terminal` API and
//! checks the resulting screen, scrollback, selection or encoded input.

use std::sync::{Arc, Mutex};

use termgrid::core::{Color, NamedColor};
use termgrid::{
    Key, KeyEvent, Modifiers, SearchScope, SelectionPoint, SharedTerminal, Snapshot, Terminal,
};

/// Helper to feed a whole input at once
fn run(input: &[u8], rows: usize, cols: usize) -> Terminal {
    let mut term = Terminal::new(rows, cols, 100);
    term.feed(input);
    term
}

/// Helper to feed an input in fixed-size chunks (tests streaming)
fn run_chunked(input: &[u8], rows: usize, cols: usize, chunk_size: usize) -> Terminal {
    let mut term = Terminal::new(rows, cols, 100);
    for chunk in input.chunks(chunk_size) {
        term.feed(chunk);
    }
    term
}

fn row_text(term: &Terminal, row: usize) -> String {
    term.visible_lines(0)[row].text()
}

// ============================================================================
// Printing and cursor movement
// ============================================================================

#[test]
fn test_printable_ascii_advances_cursor() {
    let term = run(b"hello", 24, 80);
    assert_eq!(term.cursor().col, 5);
    assert_eq!(term.cursor().row, 0);
    assert_eq!(term.scrollback_len(), 0);
}

#[test]
fn test_cursor_forward_clamps() {
    let term = run(b"\x1b[5C", 24, 80);
    assert_eq!(term.cursor().col, 5);

    let term = run(b"\x1b[500C", 24, 80);
    assert_eq!(term.cursor().col, 79);
}

#[test]
fn test_cursor_position_and_report() {
    let mut term = run(b"\x1b[10;20H\x1b[6n", 24, 80);
    assert_eq!(term.cursor().row, 9);
    assert_eq!(term.cursor().col, 19);
    assert_eq!(term.take_responses(), b"\x1b[10;20R");
}

#[test]
fn test_sgr_reset_applies_to_later_prints() {
    let term = run(b"\x1b[1;31mA\x1b[0mB", 24, 80);
    let lines = term.visible_lines(0);

    let a = lines[0].cell(0).unwrap();
    assert!(a.style.bold);
    assert_eq!(a.fg, Color::Named(NamedColor::Red));

    let b = lines[0].cell(1).unwrap();
    assert!(!b.style.bold);
    assert_eq!(b.fg, Color::Default);
}

#[test]
fn test_extended_colors() {
    let term = run(b"\x1b[38;5;196mA\x1b[48;2;1;2;3mB\x1b[38:2:10:20:30mC", 24, 80);
    let lines = term.visible_lines(0);
    assert_eq!(lines[0].cell(0).unwrap().fg, Color::Indexed(196));
    assert_eq!(lines[0].cell(1).unwrap().bg, Color::Rgb(1, 2, 3));
    assert_eq!(lines[0].cell(2).unwrap().fg, Color::Rgb(10, 20, 30));
}

#[test]
fn test_wide_characters() {
    let term = run("a中b".as_bytes(), 24, 80);
    assert_eq!(term.cursor().col, 4);
    assert_eq!(row_text(&term, 0), "a中b");

    let line = &term.visible_lines(0)[0];
    assert!(line.cell(1).unwrap().is_wide());
    assert!(line.cell(2).unwrap().wide_continuation);
}

#[test]
fn test_invalid_utf8_becomes_replacement() {
    let term = run(b"a\xffb", 24, 80);
    assert_eq!(row_text(&term, 0), "a\u{FFFD}b");
}

// ============================================================================
// Wrapping and scrolling
// ============================================================================

#[test]
fn test_line_wrapping_marks_line() {
    let term = run(b"0123456789ab", 5, 10);
    let lines = term.visible_lines(0);

    assert_eq!(lines[0].text(), "0123456789");
    assert_eq!(lines[1].text(), "ab");
    assert!(lines[1].is_wrapped());
    assert!(!lines[0].is_wrapped());

    let sel = term.select(SelectionPoint::new(0, 0), SelectionPoint::new(1, 1));
    assert_eq!(term.extract_text(&sel), "0123456789ab");
}

#[test]
fn test_autowrap_off_overwrites_last_column() {
    let term = run(b"\x1b[?7l0123456789XYZ", 5, 10);
    assert_eq!(row_text(&term, 0), "012345678Z");
    assert_eq!(row_text(&term, 1), "");
}

#[test]
fn test_newline_at_bottom_scrolls_into_scrollback() {
    let mut term = run(b"one\r\ntwo\r\nthree", 3, 10);
    let before = term.visible_lines(0);

    term.feed(b"\r\n");
    let after = term.visible_lines(0);

    assert_eq!(term.scrollback_len(), 1);
    assert_eq!(after[0], before[1]);
    assert_eq!(after[1], before[2]);
    assert_eq!(after[2].text(), "");

    // the evicted row is one line back in the view
    assert_eq!(term.visible_lines(1)[0].text(), "one");
}

#[test]
fn test_scrollback_capacity_evicts_oldest() {
    let mut term = Terminal::new(2, 10, 3);
    for i in 0..10 {
        term.feed(format!("line{}\r\n", i).as_bytes());
        assert!(term.scrollback_len() <= 3);
    }
    assert_eq!(term.scrollback_len(), 3);

    let oldest = term.visible_lines(3);
    assert_eq!(oldest[0].text(), "line6");
}

#[test]
fn test_zero_capacity_scrollback() {
    let term = {
        let mut term = Terminal::new(2, 10, 0);
        term.feed(b"a\r\nb\r\nc\r\n");
        term
    };
    assert_eq!(term.scrollback_len(), 0);
    assert_eq!(term.visible_lines(5), term.visible_lines(0));
}

#[test]
fn test_scroll_region_keeps_scrollback_empty() {
    let term = run(b"\x1b[2;4r\x1b[4;1Ha\nb\nc\n", 6, 10);
    assert_eq!(term.scrollback_len(), 0);
    assert_eq!(row_text(&term, 0), "");
    assert_eq!(row_text(&term, 3), "");
}

#[test]
fn test_insert_and_delete_chars() {
    let term = run(b"ABCDE\x1b[1;2H\x1b[2@XX", 24, 80);
    assert_eq!(row_text(&term, 0), "AXXBCDE");

    let term = run(b"ABCDE\x1b[1;2H\x1b[2P", 24, 80);
    assert_eq!(row_text(&term, 0), "ADE");
}

#[test]
fn test_erase_in_line_and_display() {
    let term = run(b"AAAAAAAAAA\x1b[1;6H\x1b[K", 3, 10);
    assert_eq!(row_text(&term, 0), "AAAAA");

    let term = run(b"top\r\nmiddle\r\nbottom\x1b[2;1H\x1b[J", 3, 10);
    assert_eq!(row_text(&term, 0), "top");
    assert_eq!(row_text(&term, 1), "");
    assert_eq!(row_text(&term, 2), "");
}

#[test]
fn test_tabs() {
    let term = run(b"a\tb\x1b[3g\r\tc", 3, 40);
    assert_eq!(term.cursor().col, 39);
    assert_eq!(row_text(&term, 0), format!("a{}b", " ".repeat(7)) + &" ".repeat(30) + "c");
}

// ============================================================================
// Streaming
// ============================================================================

#[test]
fn test_split_csi_equals_whole() {
    let mut split = Terminal::new(24, 80, 100);
    split.feed(b"\x1b[");
    split.feed(b"32m");
    split.feed(b"x");

    let whole = run(b"\x1b[32mx", 24, 80);

    assert_eq!(split.snapshot(0).lines, whole.snapshot(0).lines);
    assert_eq!(
        split.visible_lines(0)[0].cell(0).unwrap().fg,
        Color::Named(NamedColor::Green)
    );
}

#[test]
fn test_chunk_sizes_do_not_change_result() {
    let input = "\x1b[1;31mRed\x1b[0m \x1b]0;title\x07中文\r\n\x1b[?1049hAlt\x1b[?1049lMain\x1b[2;3H!"
        .as_bytes();
    let whole = run(input, 5, 20);

    for chunk_size in 1..8 {
        let chunked = run_chunked(input, 5, 20, chunk_size);
        assert!(
            whole.snapshot(0).content_equals(&chunked.snapshot(0)),
            "chunk size {} diverged",
            chunk_size
        );
        assert_eq!(whole.cursor(), chunked.cursor());
        assert_eq!(chunked.title(), "title");
    }
}

// ============================================================================
// Alternate screen, modes and OSC
// ============================================================================

#[test]
fn test_alternate_screen_round_trip() {
    let mut term = run(b"MainScreen", 5, 20);
    term.feed(b"\x1b[?1049h");

    // entering keeps the cursor where it was on a cleared screen
    assert!(term.modes().alternate_screen);
    assert_eq!(row_text(&term, 0), "");
    assert_eq!(term.cursor().col, 10);

    term.feed(b"\x1b[HAltScreen");
    assert_eq!(row_text(&term, 0), "AltScreen");

    term.feed(b"\x1b[?1049l");
    assert!(!term.modes().alternate_screen);
    assert_eq!(row_text(&term, 0), "MainScreen");
    assert_eq!(term.cursor().col, 10);
}

#[test]
fn test_alternate_screen_does_not_grow_scrollback() {
    let mut term = Terminal::new(3, 10, 100);
    term.feed(b"\x1b[?1049h");
    for _ in 0..20 {
        term.feed(b"x\r\n");
    }
    assert_eq!(term.scrollback_len(), 0);
}

#[test]
fn test_osc_title_and_hyperlink() {
    let term = run(b"\x1b]2;hello\x1b\\\x1b]8;;http://x\x07L\x1b]8;;\x07N", 3, 20);
    assert_eq!(term.title(), "hello");

    let line = &term.visible_lines(0)[0];
    assert_eq!(line.cell(0).unwrap().hyperlink.as_deref(), Some("http://x"));
    assert_eq!(line.cell(1).unwrap().hyperlink, None);
}

#[test]
fn test_dec_special_graphics() {
    let term = run(b"\x1b(0qx\x1b(Bq", 3, 10);
    assert_eq!(row_text(&term, 0), "─│q");
}

#[test]
fn test_full_reset() {
    let mut term = run(b"\x1b[31mtext\x1b[?1h\x1b]0;t\x07", 3, 10);
    term.feed(b"\x1bc");

    assert_eq!(row_text(&term, 0), "");
    assert!(!term.modes().application_cursor);
    assert_eq!(term.cursor().row, 0);
    assert_eq!(term.cursor().col, 0);
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn test_shrink_rows_pushes_top_into_scrollback() {
    let mut term = run(b"1\r\n2\r\n3\r\n4\r\n5", 5, 10);
    term.resize(3, 10);

    assert_eq!(term.scrollback_len(), 2);
    assert_eq!(row_text(&term, 0), "3");
    assert_eq!(row_text(&term, 2), "5");
    assert_eq!(term.cursor().row, 2);
}

#[test]
fn test_shrink_rows_drops_blank_rows_first() {
    let mut term = run(b"1\r\n2", 5, 10);
    term.resize(3, 10);

    assert_eq!(term.scrollback_len(), 0);
    assert_eq!(row_text(&term, 0), "1");
    assert_eq!(row_text(&term, 1), "2");
    assert_eq!(term.cursor().row, 1);
}

#[test]
fn test_grow_rows_pulls_from_scrollback() {
    let mut term = run(b"1\r\n2\r\n3\r\n4\r\n5", 3, 10);
    assert_eq!(term.scrollback_len(), 2);

    term.resize(5, 10);
    assert_eq!(term.scrollback_len(), 0);
    assert_eq!(row_text(&term, 0), "1");
    assert_eq!(row_text(&term, 4), "5");
    assert_eq!(term.cursor().row, 4);
}

#[test]
fn test_resize_columns_truncates_and_clamps() {
    let mut term = run(b"0123456789", 3, 20);
    term.resize(3, 4);

    assert_eq!(row_text(&term, 0), "0123");
    assert!(term.cursor().col < 4);

    term.resize(3, 8);
    assert_eq!(term.visible_lines(0)[0].cols(), 8);
}

#[test]
fn test_resize_zero_is_clamped() {
    let mut term = Terminal::new(3, 10, 10);
    term.resize(0, 0);
    assert_eq!(term.rows(), 1);
    assert_eq!(term.cols(), 1);
    assert_eq!(term.cursor().row, 0);
    assert_eq!(term.cursor().col, 0);
}

// ============================================================================
// Selection and search
// ============================================================================

#[test]
fn test_extract_single_row_columns() {
    let term = run(b"abcdefgh", 3, 20);
    let sel = term.select(SelectionPoint::new(0, 2), SelectionPoint::new(0, 5));
    assert_eq!(term.extract_text(&sel), "cdef");

    // reversed endpoints give the same selection
    let reversed = term.select(SelectionPoint::new(0, 5), SelectionPoint::new(0, 2));
    assert_eq!(term.extract_text(&reversed), "cdef");
}

#[test]
fn test_extract_multi_row_and_scrollback() {
    let term = run(b"first\r\nsecond\r\nthird\r\nfourth", 3, 20);
    assert_eq!(term.scrollback_len(), 1);

    let sel = term.select(SelectionPoint::new(-1, 0), SelectionPoint::new(1, 19));
    assert_eq!(term.extract_text(&sel), "first\nsecond\nthird");
}

#[test]
fn test_search_finds_matches_in_order() {
    let term = run(b"foo bar\r\nbaz FOO\r\nfoo\r\nx", 3, 20);
    assert_eq!(term.scrollback_len(), 1);

    let all: Vec<_> = term.search("foo").collect();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].start(), SelectionPoint::new(-1, 0));
    assert_eq!(all[1].start(), SelectionPoint::new(0, 4));
    assert_eq!(all[1].end(), SelectionPoint::new(0, 6));
    assert_eq!(all[2].start(), SelectionPoint::new(1, 0));

    let screen_only = term.search_in("foo", SearchScope::Screen).count();
    assert_eq!(screen_only, 2);

    assert_eq!(term.search("").count(), 0);
    assert_eq!(term.search("missing").count(), 0);
}

#[test]
fn test_search_stays_within_a_row() {
    let mut term = run(b"xxxxxxhel", 3, 8);
    term.feed(b"lo");

    // "he" + "llo" only meet across a soft wrap
    assert_eq!(term.search("hello").count(), 0);
    assert_eq!(term.search("llo").count(), 1);
}

#[test]
fn test_search_wide_match_covers_both_cells() {
    let term = run("ab中文c".as_bytes(), 3, 20);
    let found: Vec<_> = term.search("文").collect();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].start(), SelectionPoint::new(0, 4));
    assert_eq!(found[0].end(), SelectionPoint::new(0, 5));
    assert_eq!(term.extract_text(&found[0]), "文");
}

// ============================================================================
// Input encoding
// ============================================================================

#[test]
fn test_key_encoding_follows_modes() {
    let mut term = Terminal::new(3, 10, 10);
    assert_eq!(term.encode_key(&Key::Up.into()), b"\x1b[A");

    term.feed(b"\x1b[?1h");
    assert_eq!(term.encode_key(&Key::Up.into()), b"\x1bOA");

    let ctrl_c = KeyEvent::with_modifiers(
        Key::Char('c'),
        Modifiers {
            ctrl: true,
            ..Modifiers::default()
        },
    );
    assert_eq!(term.encode_key(&ctrl_c), vec![0x03]);
}

#[test]
fn test_paste_encoding_follows_bracketed_mode() {
    let mut term = Terminal::new(3, 10, 10);
    assert_eq!(term.encode_paste("a\nb"), b"a\rb");

    term.feed(b"\x1b[?2004h");
    assert_eq!(term.encode_paste("a\x1b[201~b"), b"\x1b[200~ab\x1b[201~");
}

// ============================================================================
// Snapshots, versions and sharing
// ============================================================================

#[test]
fn test_snapshot_json_round_trip() {
    let term = run(b"\x1b[1;4;38;5;100mstyled\x1b[0m plain", 3, 20);
    let snapshot = term.snapshot(0);

    let json = snapshot.to_json().unwrap();
    let restored = Snapshot::from_json(&json).unwrap();
    assert_eq!(restored, snapshot);
    assert_eq!(restored.to_text(), "styled plain\n");
}

#[test]
fn test_version_and_update_callback() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut term = Terminal::new(3, 10, 10);

    let sink = Arc::clone(&seen);
    term.set_update_callback(move |version| sink.lock().unwrap().push(version));

    term.feed(b"a");
    term.feed(b"");
    term.resize(4, 10);

    assert_eq!(term.version(), 2);
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[test]
fn test_shared_terminal_matches_terminal() {
    let input = b"hello\r\nworld\x1b[2;3H";
    let shared = SharedTerminal::new(Terminal::new(3, 10, 10));
    shared.feed(input);

    let plain = run(input, 3, 10);
    assert!(shared.snapshot(0).content_equals(&plain.snapshot(0)));
    assert_eq!(shared.cursor(), plain.cursor());
}
