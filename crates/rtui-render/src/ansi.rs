#![forbid(unsafe_code)]

//! ANSI escape sequence writers.
//!
//! Small, allocation-free helpers used by the presenter. Every function
//! writes one complete sequence to any `Write`, which keeps byte-level tests
//! trivial (`Vec<u8>` as the sink).

use std::io::{self, Write};

use crate::cell::{PackedRgba, StyleFlags};

/// SGR reset: `CSI 0 m`.
pub const SGR_RESET: &[u8] = b"\x1b[0m";

/// Reset all attributes and colors.
pub fn sgr_reset<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SGR_RESET)
}

/// Ordered table of (flag, SGR "on" code).
pub const FLAG_TABLE: [(StyleFlags, u8); 2] = [(StyleFlags::BOLD, 1), (StyleFlags::UNDERLINE, 4)];

/// Enable every flag in `flags` with one combined SGR sequence.
///
/// Writes nothing for an empty set.
pub fn sgr_flags<W: Write>(w: &mut W, flags: StyleFlags) -> io::Result<()> {
    if flags.is_empty() {
        return Ok(());
    }
    let codes: Vec<String> = FLAG_TABLE
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, code)| code.to_string())
        .collect();
    write!(w, "\x1b[{}m", codes.join(";"))
}

/// Foreground true color: `CSI 38;2;r;g;b m`.
pub fn sgr_fg_rgb<W: Write>(w: &mut W, r: u8, g: u8, b: u8) -> io::Result<()> {
    write!(w, "\x1b[38;2;{r};{g};{b}m")
}

/// Background true color: `CSI 48;2;r;g;b m`.
pub fn sgr_bg_rgb<W: Write>(w: &mut W, r: u8, g: u8, b: u8) -> io::Result<()> {
    write!(w, "\x1b[48;2;{r};{g};{b}m")
}

/// Default foreground: `CSI 39 m`.
pub fn sgr_fg_default<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[39m")
}

/// Default background: `CSI 49 m`.
pub fn sgr_bg_default<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[49m")
}

/// Foreground from a packed color; alpha 0 selects the terminal default.
pub fn sgr_fg_packed<W: Write>(w: &mut W, color: PackedRgba) -> io::Result<()> {
    if color.is_default() {
        return sgr_fg_default(w);
    }
    sgr_fg_rgb(w, color.r(), color.g(), color.b())
}

/// Background from a packed color; alpha 0 selects the terminal default.
pub fn sgr_bg_packed<W: Write>(w: &mut W, color: PackedRgba) -> io::Result<()> {
    if color.is_default() {
        return sgr_bg_default(w);
    }
    sgr_bg_rgb(w, color.r(), color.g(), color.b())
}

/// CUP (Cursor Position): `CSI row ; col H`.
///
/// Takes 0-indexed input and emits the 1-indexed form.
pub fn cup<W: Write>(w: &mut W, row: u16, col: u16) -> io::Result<()> {
    write!(
        w,
        "\x1b[{};{}H",
        row.saturating_add(1),
        col.saturating_add(1)
    )
}

/// Hide the cursor: `CSI ? 25 l`.
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
/// Show the cursor: `CSI ? 25 h`.
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";

/// Hide the cursor.
pub fn cursor_hide<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_HIDE)
}

/// Show the cursor.
pub fn cursor_show<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_SHOW)
}

/// Begin synchronized output (`CSI ? 2026 h`).
pub const SYNC_BEGIN: &[u8] = b"\x1b[?2026h";
/// End synchronized output (`CSI ? 2026 l`).
pub const SYNC_END: &[u8] = b"\x1b[?2026l";

/// Begin a synchronized update; terminals without support ignore it.
pub fn sync_begin<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SYNC_BEGIN)
}

/// End a synchronized update.
pub fn sync_end<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SYNC_END)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn cup_is_one_indexed() {
        assert_eq!(bytes(|w| cup(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(bytes(|w| cup(w, 4, 9)), "\x1b[5;10H");
    }

    #[test]
    fn packed_default_uses_39_49() {
        assert_eq!(
            bytes(|w| sgr_fg_packed(w, PackedRgba::TRANSPARENT)),
            "\x1b[39m"
        );
        assert_eq!(
            bytes(|w| sgr_bg_packed(w, PackedRgba::TRANSPARENT)),
            "\x1b[49m"
        );
        assert_eq!(
            bytes(|w| sgr_fg_packed(w, PackedRgba::rgb(1, 2, 3))),
            "\x1b[38;2;1;2;3m"
        );
    }

    #[test]
    fn flags_combine_in_table_order() {
        assert_eq!(bytes(|w| sgr_flags(w, StyleFlags::empty())), "");
        assert_eq!(
            bytes(|w| sgr_flags(w, StyleFlags::UNDERLINE | StyleFlags::BOLD)),
            "\x1b[1;4m"
        );
    }
}
