#![forbid(unsafe_code)]

//! Buffer grid storage.
//!
//! The `Buffer` is a 2D grid of [`Cell`]s representing the terminal display,
//! with a scissor (clipping) stack so a view can never paint outside the
//! rectangle it was given.
//!
//! # Layout
//!
//! Cells are stored in row-major order: `index = y * width + x`.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height`
//! 2. Width and height never change after creation
//! 3. Scissor stack intersection monotonically decreases on push
//! 4. The scissor stack always has at least one element
//! 5. A wide character is either written with all its continuation cells or
//!    not at all

use crate::cell::{Cell, CellContent, char_width};
use rtui_core::geometry::Rect;

/// A 2D grid of terminal cells.
///
/// # Example
///
/// ```
/// use rtui_render::buffer::Buffer;
/// use rtui_render::cell::Cell;
///
/// let mut buffer = Buffer::new(80, 24);
/// buffer.set(0, 0, Cell::from_char('H'));
/// buffer.set(1, 0, Cell::from_char('i'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    scissor_stack: Vec<Rect>,
}

impl Buffer {
    /// Create a new buffer with the given dimensions.
    ///
    /// All cells start as the default (empty) cell. A zero dimension yields
    /// an empty buffer on which every write is a no-op.
    pub fn new(width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::default(); len],
            scissor_stack: vec![Rect::from_size(width, height)],
        }
    }

    /// Buffer width in cells.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in cells.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The full buffer rectangle.
    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Get a reference to the cell at (x, y).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Set the cell at (x, y).
    ///
    /// This method:
    /// - Respects the current scissor region (skips if outside)
    /// - Does nothing if coordinates are out of bounds
    /// - Replaces control characters with a space and zero-width characters
    ///   with U+FFFD so the grid column count never drifts
    /// - Writes CONTINUATION cells for wide characters, and writes nothing if
    ///   the whole character does not fit
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let cell = sanitize(cell);
        let width = match cell.content {
            CellContent::Char(c) => char_width(c).max(1),
            _ => 1,
        };

        let scissor = self.current_scissor();
        for i in 0..width {
            let Ok(offset) = u16::try_from(i) else {
                return;
            };
            let cx = x.saturating_add(offset);
            if self.index(cx, y).is_none() || !scissor.contains(cx, y) {
                return;
            }
        }

        for i in 0..width {
            // Bounds were checked above.
            let cx = x + i as u16;
            self.cleanup_overlap(cx, y);
        }

        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = cell;
        }
        for i in 1..width {
            if let Some(idx) = self.index(x + i as u16, y) {
                self.cells[idx] = Cell::CONTINUATION;
            }
        }
    }

    /// Clear any wide character that overlaps (x, y) so no half glyph remains.
    fn cleanup_overlap(&mut self, x: u16, y: u16) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let existing = self.cells[idx];

        if existing.is_continuation() {
            // Walk left to the owning head and blank it with its tail.
            let mut hx = x;
            while hx > 0 {
                hx -= 1;
                let Some(h) = self.index(hx, y) else { break };
                if !self.cells[h].is_continuation() {
                    self.blank_wide(hx, y);
                    break;
                }
            }
        } else if let CellContent::Char(c) = existing.content
            && char_width(c) > 1
        {
            self.blank_wide(x, y);
        }
    }

    fn blank_wide(&mut self, x: u16, y: u16) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let width = match self.cells[idx].content {
            CellContent::Char(c) => char_width(c).max(1),
            _ => 1,
        };
        let template = Cell {
            content: CellContent::Empty,
            ..self.cells[idx]
        };
        for i in 0..width {
            let Ok(offset) = u16::try_from(i) else {
                return;
            };
            if let Some(t) = self.index(x.saturating_add(offset), y) {
                self.cells[t] = template;
            }
        }
    }

    /// Fill a rectangular region with the given cell.
    ///
    /// Respects the scissor region.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let clipped = self.current_scissor().intersection(&rect);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Push a scissor (clipping) region onto the stack.
    ///
    /// The effective scissor is the intersection of all pushed rects.
    pub fn push_scissor(&mut self, rect: Rect) {
        let current = self.current_scissor();
        self.scissor_stack.push(current.intersection(&rect));
    }

    /// Pop a scissor region from the stack.
    ///
    /// Does nothing if only the base scissor remains.
    pub fn pop_scissor(&mut self) {
        if self.scissor_stack.len() > 1 {
            self.scissor_stack.pop();
        }
    }

    /// Get the current effective scissor region.
    #[inline]
    pub fn current_scissor(&self) -> Rect {
        self.scissor_stack.last().copied().unwrap_or_default()
    }

    /// Get the scissor stack depth.
    #[inline]
    pub fn scissor_depth(&self) -> usize {
        self.scissor_stack.len()
    }

    /// The characters of row `y`, with continuation cells skipped.
    ///
    /// Mostly useful for assertions in tests.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = usize::from(y) * usize::from(self.width);
        self.cells[start..start + usize::from(self.width)]
            .iter()
            .filter_map(Cell::symbol)
            .collect()
    }
}

fn sanitize(cell: Cell) -> Cell {
    match cell.content {
        CellContent::Char(c) if c.is_control() => Cell {
            content: CellContent::Char(' '),
            ..cell
        },
        CellContent::Char(c) if char_width(c) == 0 => Cell {
            content: CellContent::Char('\u{FFFD}'),
            ..cell
        },
        _ => cell,
    }
}
