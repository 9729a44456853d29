#![forbid(unsafe_code)]

//! Presenter: state-tracked ANSI emission.
//!
//! The Presenter turns a [`BufferDiff`] into terminal output, tracking the
//! current style and cursor so it only emits sequences when something
//! changed.
//!
//! # Design Principles
//!
//! - **State tracking**: style and cursor position are cached between cells
//! - **Run grouping**: one cursor move per [`ChangeRun`](crate::diff::ChangeRun)
//! - **Single write**: output is buffered and flushed once per frame
//! - **Synchronized output**: DEC 2026 brackets prevent flicker where supported
//!
//! # Usage
//!
//! ```
//! use rtui_render::diff::BufferDiff;
//! use rtui_render::frame::Frame;
//! use rtui_render::presenter::Presenter;
//!
//! let mut presenter = Presenter::new(Vec::new());
//! let previous = Frame::new(20, 2);
//! let next = Frame::new(20, 2);
//! let diff = BufferDiff::compute(&previous.buffer, &next.buffer);
//! presenter.present(&next, &diff)?;
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, BufWriter, Write};

use crate::ansi;
use crate::cell::{Cell, PackedRgba, StyleFlags, char_width};
use crate::diff::BufferDiff;
use crate::frame::Frame;

/// Size of the internal write buffer (64KB).
const BUFFER_CAPACITY: usize = 64 * 1024;

/// Cached style state for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CellStyle {
    fg: PackedRgba,
    bg: PackedRgba,
    attrs: StyleFlags,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            attrs: cell.attrs,
        }
    }
}

/// State-tracked ANSI presenter.
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    /// Current style state (None = unknown/reset).
    current_style: Option<CellStyle>,
    /// Current cursor position (0-indexed). None = unknown.
    cursor: Option<(u16, u16)>,
}

impl<W: Write> Presenter<W> {
    /// Create a new presenter over the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            current_style: None,
            cursor: None,
        }
    }

    /// Present a frame.
    ///
    /// 1. Begins synchronized output and hides the cursor
    /// 2. Emits the changed runs from `diff`
    /// 3. Resets style
    /// 4. Places and shows the cursor if the frame asks for it
    /// 5. Ends synchronized output and flushes
    pub fn present(&mut self, frame: &Frame, diff: &BufferDiff) -> io::Result<()> {
        ansi::sync_begin(&mut self.writer)?;
        ansi::cursor_hide(&mut self.writer)?;

        for run in diff.runs() {
            self.move_cursor_to(run.x0, run.y)?;
            for x in run.x0..=run.x1 {
                if let Some(cell) = frame.buffer.get(x, run.y) {
                    self.emit_cell(cell)?;
                }
            }
        }

        ansi::sgr_reset(&mut self.writer)?;
        self.current_style = None;

        if let Some((x, y)) = frame.cursor_position {
            self.move_cursor_to(x, y)?;
            ansi::cursor_show(&mut self.writer)?;
        }

        ansi::sync_end(&mut self.writer)?;

        #[cfg(feature = "tracing")]
        tracing::trace!(changes = diff.len(), "frame presented");
        self.writer.flush()
    }

    fn emit_cell(&mut self, cell: &Cell) -> io::Result<()> {
        // The wide character that owns this cell already advanced the cursor.
        let Some(ch) = cell.symbol() else {
            return Ok(());
        };

        self.emit_style_changes(cell)?;

        let mut buf = [0u8; 4];
        self.writer.write_all(ch.encode_utf8(&mut buf).as_bytes())?;

        if let Some((x, y)) = self.cursor {
            let advance = u16::try_from(char_width(ch).max(1)).unwrap_or(1);
            self.cursor = Some((x.saturating_add(advance), y));
        }
        Ok(())
    }

    /// Reset + apply strategy: simpler and more robust than incremental SGR.
    fn emit_style_changes(&mut self, cell: &Cell) -> io::Result<()> {
        let new_style = CellStyle::from_cell(cell);
        if self.current_style == Some(new_style) {
            return Ok(());
        }

        ansi::sgr_reset(&mut self.writer)?;
        if !new_style.fg.is_default() {
            ansi::sgr_fg_packed(&mut self.writer, new_style.fg)?;
        }
        if !new_style.bg.is_default() {
            ansi::sgr_bg_packed(&mut self.writer, new_style.bg)?;
        }
        ansi::sgr_flags(&mut self.writer, new_style.attrs)?;

        self.current_style = Some(new_style);
        Ok(())
    }

    fn move_cursor_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        if self.cursor == Some((x, y)) {
            return Ok(());
        }
        ansi::cup(&mut self.writer, y, x)?;
        self.cursor = Some((x, y));
        Ok(())
    }

    /// Forget the tracked cursor and style, e.g. after the terminal resized.
    pub fn invalidate(&mut self) {
        self.current_style = None;
        self.cursor = None;
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}
