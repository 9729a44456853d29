#![forbid(unsafe_code)]

//! Frame = Buffer + cursor state.
//!
//! A fresh frame is created for every redraw, which gives each pass
//! clear-screen semantics; the presenter diffs it against the previous frame
//! so only changed cells reach the terminal.

use crate::buffer::Buffer;
use rtui_core::geometry::{Rect, Size};

/// Render target for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The cell grid for this render pass.
    pub buffer: Buffer,

    /// Cursor position (if a view wants the caret shown).
    ///
    /// Coordinates are relative to the buffer (0-indexed).
    pub cursor_position: Option<(u16, u16)>,
}

impl Frame {
    /// Create an empty frame of the given size with the cursor hidden.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            cursor_position: None,
        }
    }

    /// Frame dimensions.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.buffer.width(), self.buffer.height())
    }

    /// The full frame rectangle.
    #[inline]
    pub fn area(&self) -> Rect {
        self.buffer.area()
    }

    /// Show the cursor at (x, y).
    pub fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor_position = Some((x, y));
    }

    /// Hide the cursor.
    pub fn hide_cursor(&mut self) {
        self.cursor_position = None;
    }
}
