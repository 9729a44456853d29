#![forbid(unsafe_code)]

//! Drawing primitives for the buffer.
//!
//! Helpers on top of `Buffer::set()` for the shapes the dashboard draws:
//! text runs, lines, and boxed dialogs. All operations respect the buffer's
//! scissor stack automatically.

use crate::buffer::Buffer;
use crate::cell::{Cell, CellContent, char_width};
use crate::style::Style;
use rtui_core::geometry::Rect;

/// Characters used to draw a box around a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BoxChars {
    /// Single-line box-drawing characters (U+250x).
    pub const SQUARE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };
}

fn styled(c: char, style: Style) -> Cell {
    let mut cell = Cell {
        content: CellContent::Char(c),
        ..Cell::default()
    };
    style.apply_to(&mut cell);
    cell
}

/// Extension trait for drawing on a Buffer.
pub trait Draw {
    /// Write one styled character.
    fn put_char(&mut self, x: u16, y: u16, c: char, style: Style);

    /// Draw a horizontal run of the same character.
    fn draw_horizontal_line(&mut self, x: u16, y: u16, width: u16, c: char, style: Style);

    /// Print text with a right-side clipping boundary.
    ///
    /// Stops at `max_x` (exclusive) and never starts a wide character that
    /// would cross it. Returns the x position after the last character.
    fn print_text_clipped(&mut self, x: u16, y: u16, text: &str, style: Style, max_x: u16)
    -> u16;

    /// Print text up to the buffer edge.
    fn print_text(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16;

    /// Draw a box outline and fill its interior with spaces in `style`.
    ///
    /// If the rect is too small for an interior (width or height <= 2), only
    /// the outline is drawn.
    fn draw_box(&mut self, rect: Rect, chars: BoxChars, style: Style);
}

impl Draw for Buffer {
    fn put_char(&mut self, x: u16, y: u16, c: char, style: Style) {
        self.set(x, y, styled(c, style));
    }

    fn draw_horizontal_line(&mut self, x: u16, y: u16, width: u16, c: char, style: Style) {
        let cell = styled(c, style);
        for i in 0..width {
            self.set(x.saturating_add(i), y, cell);
        }
    }

    fn print_text_clipped(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        style: Style,
        max_x: u16,
    ) -> u16 {
        let mut cx = x;
        for c in text.chars() {
            // Control and combining characters still take one column once
            // sanitized by `Buffer::set`.
            let width = u16::try_from(char_width(c).max(1)).unwrap_or(1);
            if cx >= max_x || cx.saturating_add(width) > max_x {
                break;
            }
            self.set(cx, y, styled(c, style));
            cx = cx.saturating_add(width);
        }
        cx
    }

    fn print_text(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        self.print_text_clipped(x, y, text, style, self.width())
    }

    fn draw_box(&mut self, rect: Rect, chars: BoxChars, style: Style) {
        if rect.is_empty() {
            return;
        }

        if rect.width > 2 && rect.height > 2 {
            self.fill(rect.inset(1), styled(' ', style));
        }

        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;
        self.draw_horizontal_line(rect.x, rect.y, rect.width, chars.horizontal, style);
        self.draw_horizontal_line(rect.x, bottom, rect.width, chars.horizontal, style);
        for y in rect.y..=bottom {
            self.put_char(rect.x, y, chars.vertical, style);
            self.put_char(right, y, chars.vertical, style);
        }

        self.put_char(rect.x, rect.y, chars.top_left, style);
        self.put_char(right, rect.y, chars.top_right, style);
        self.put_char(rect.x, bottom, chars.bottom_left, style);
        self.put_char(right, bottom, chars.bottom_right, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::PackedRgba;

    #[test]
    fn print_text_clips_at_max_x() {
        let mut buf = Buffer::new(10, 1);
        let end = buf.print_text_clipped(1, 0, "hello", Style::new(), 4);
        assert_eq!(end, 4);
        assert_eq!(buf.row_text(0), " hel      ");
    }

    #[test]
    fn print_text_skips_wide_char_crossing_edge() {
        let mut buf = Buffer::new(3, 1);
        let end = buf.print_text(0, 0, "a中b", Style::new());
        assert_eq!(end, 3);
        assert_eq!(buf.row_text(0), "a中");
        let mut narrow = Buffer::new(2, 1);
        assert_eq!(narrow.print_text(0, 0, "a中", Style::new()), 1);
    }

    #[test]
    fn draw_box_outlines_and_fills() {
        let mut buf = Buffer::new(4, 3);
        let style = Style::new().bg(PackedRgba::DARK_BLUE);
        buf.draw_box(Rect::from_size(4, 3), BoxChars::SQUARE, style);
        assert_eq!(buf.row_text(0), "┌──┐");
        assert_eq!(buf.row_text(1), "│  │");
        assert_eq!(buf.row_text(2), "└──┘");
        assert_eq!(buf.get(1, 1).map(|c| c.bg), Some(PackedRgba::DARK_BLUE));
    }

    #[test]
    fn draw_box_single_row() {
        let mut buf = Buffer::new(3, 1);
        buf.draw_box(Rect::from_size(3, 1), BoxChars::SQUARE, Style::new());
        assert_eq!(buf.row_text(0), "└─┘");
    }
}
