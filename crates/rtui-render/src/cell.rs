#![forbid(unsafe_code)]

//! Cell types and invariants.
//!
//! The `Cell` is the unit of the terminal grid: one character plus colors and
//! attribute flags. Wide characters own the cell they start in; the cells to
//! their right hold [`CellContent::Continuation`] so the grid never renders
//! half a glyph.

use unicode_width::UnicodeWidthChar;

/// What a cell displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellContent {
    /// Nothing was drawn; presented as a space.
    #[default]
    Empty,
    /// A single character.
    Char(char),
    /// Placeholder for the trailing columns of a wide character.
    Continuation,
}

impl CellContent {
    /// The character to emit for this content, if any.
    ///
    /// Continuation cells emit nothing; the terminal advances past them while
    /// printing the wide character that owns them.
    #[inline]
    pub const fn as_char(self) -> Option<char> {
        match self {
            CellContent::Empty => Some(' '),
            CellContent::Char(c) => Some(c),
            CellContent::Continuation => None,
        }
    }
}

/// A single terminal cell.
///
/// # Default
///
/// The default cell is empty with terminal-default colors and no attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    /// Character content.
    pub content: CellContent,
    /// Foreground color.
    pub fg: PackedRgba,
    /// Background color.
    pub bg: PackedRgba,
    /// Style flags.
    pub attrs: StyleFlags,
}

impl Cell {
    /// A continuation cell (placeholder for wide characters).
    pub const CONTINUATION: Self = Self {
        content: CellContent::Continuation,
        fg: PackedRgba::TRANSPARENT,
        bg: PackedRgba::TRANSPARENT,
        attrs: StyleFlags::empty(),
    };

    /// Create a cell from a single character with default colors.
    #[inline]
    pub const fn from_char(c: char) -> Self {
        Self {
            content: CellContent::Char(c),
            fg: PackedRgba::TRANSPARENT,
            bg: PackedRgba::TRANSPARENT,
            attrs: StyleFlags::empty(),
        }
    }

    /// Check if this is a continuation cell.
    #[inline]
    pub const fn is_continuation(&self) -> bool {
        matches!(self.content, CellContent::Continuation)
    }

    /// The character shown in this cell (`' '` for empty cells).
    #[inline]
    pub fn symbol(&self) -> Option<char> {
        self.content.as_char()
    }

    /// Set the background color.
    #[inline]
    pub const fn with_bg(mut self, bg: PackedRgba) -> Self {
        self.bg = bg;
        self
    }
}

/// Display width of a character in terminal columns.
///
/// Control characters report width 0 here; [`crate::buffer::Buffer::set`]
/// replaces them before they reach the grid.
#[inline]
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// A compact RGBA color.
///
/// - **Layout:** `0xRRGGBBAA` (R in bits 31..24, A in bits 7..0).
/// - **Alpha 0** means "terminal default": the presenter emits the default
///   color SGR instead of a true-color sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    /// Terminal default color (alpha = 0).
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque dark blue.
    pub const DARK_BLUE: Self = Self::rgb(0, 0, 139);

    /// Create an opaque RGB color (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create an RGBA color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Red channel.
    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Alpha channel.
    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Whether this is the terminal default color.
    #[inline]
    pub const fn is_default(self) -> bool {
        self.a() == 0
    }
}

bitflags::bitflags! {
    /// Cell text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Bold / increased intensity.
        const BOLD      = 0b01;
        /// Underlined text.
        const UNDERLINE = 0b10;
    }
}
