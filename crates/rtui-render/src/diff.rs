#![forbid(unsafe_code)]

//! Diff computation between buffers.
//!
//! `BufferDiff` records every cell that differs between the previously
//! presented frame and the new one, scanning row-major so changes come out
//! sorted by `(y, x)`. [`BufferDiff::runs`] then coalesces neighbours on the
//! same row so the presenter positions the cursor once per run.
//!
//! # Usage
//!
//! ```
//! use rtui_render::buffer::Buffer;
//! use rtui_render::cell::Cell;
//! use rtui_render::diff::BufferDiff;
//!
//! let old = Buffer::new(80, 24);
//! let mut new = Buffer::new(80, 24);
//! new.set(5, 5, Cell::from_char('X'));
//! new.set(6, 5, Cell::from_char('Y'));
//!
//! let diff = BufferDiff::compute(&old, &new);
//! assert_eq!(diff.len(), 2);
//! assert_eq!(diff.runs().len(), 1);
//! ```

use crate::buffer::Buffer;

/// A contiguous run of changed cells on a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRun {
    /// Row index.
    pub y: u16,
    /// Start column (inclusive).
    pub x0: u16,
    /// End column (inclusive).
    pub x1: u16,
}

impl ChangeRun {
    /// Create a new change run.
    #[inline]
    pub const fn new(y: u16, x0: u16, x1: u16) -> Self {
        Self { y, x0, x1 }
    }

    /// Number of cells in this run.
    #[inline]
    pub const fn len(&self) -> u16 {
        self.x1 - self.x0 + 1
    }
}

/// The diff between two buffers: positions `(x, y)` where cells differ.
#[derive(Debug, Clone, Default)]
pub struct BufferDiff {
    changes: Vec<(u16, u16)>,
}

impl BufferDiff {
    /// Compute the diff between two buffers.
    ///
    /// Buffers of different dimensions cannot be compared cell by cell, so
    /// that case degrades to [`BufferDiff::full`] of `new`.
    pub fn compute(old: &Buffer, new: &Buffer) -> Self {
        if old.width() != new.width() || old.height() != new.height() {
            return Self::full(new);
        }

        let mut changes = Vec::new();
        for (idx, (a, b)) in old.cells().iter().zip(new.cells()).enumerate() {
            if a != b {
                changes.push(position(idx, new.width()));
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(changes = changes.len(), "diff computed");

        Self { changes }
    }

    /// A diff that repaints every cell of `buffer`.
    pub fn full(buffer: &Buffer) -> Self {
        let changes = (0..buffer.cells().len())
            .map(|idx| position(idx, buffer.width()))
            .collect();
        Self { changes }
    }

    /// Number of changed cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if no cells changed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Get the list of changed positions.
    #[inline]
    pub fn changes(&self) -> &[(u16, u16)] {
        &self.changes
    }

    /// Convert point changes into contiguous runs.
    ///
    /// Consecutive x positions on the same row are coalesced into one run.
    pub fn runs(&self) -> Vec<ChangeRun> {
        let mut runs: Vec<ChangeRun> = Vec::new();
        for &(x, y) in &self.changes {
            match runs.last_mut() {
                Some(run) if run.y == y && run.x1.checked_add(1) == Some(x) => run.x1 = x,
                _ => runs.push(ChangeRun::new(y, x, x)),
            }
        }
        runs
    }
}

fn position(idx: usize, width: u16) -> (u16, u16) {
    let width = usize::from(width.max(1));
    // Buffer dimensions are u16, so both quotients fit.
    ((idx % width) as u16, (idx / width) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn identical_buffers_have_no_changes() {
        let a = Buffer::new(5, 5);
        let b = Buffer::new(5, 5);
        assert!(BufferDiff::compute(&a, &b).is_empty());
    }

    #[test]
    fn runs_split_on_gaps_and_rows() {
        let old = Buffer::new(10, 3);
        let mut new = Buffer::new(10, 3);
        new.set(1, 0, Cell::from_char('a'));
        new.set(2, 0, Cell::from_char('b'));
        new.set(5, 0, Cell::from_char('c'));
        new.set(9, 0, Cell::from_char('d'));
        new.set(0, 1, Cell::from_char('e'));

        let runs = BufferDiff::compute(&old, &new).runs();
        assert_eq!(
            runs,
            vec![
                ChangeRun::new(0, 1, 2),
                ChangeRun::new(0, 5, 5),
                ChangeRun::new(0, 9, 9),
                ChangeRun::new(1, 0, 0),
            ]
        );
        assert_eq!(runs[0].len(), 2);
    }

    #[test]
    fn size_mismatch_repaints_everything() {
        let old = Buffer::new(2, 2);
        let new = Buffer::new(3, 2);
        let diff = BufferDiff::compute(&old, &new);
        assert_eq!(diff.len(), 6);
        assert_eq!(diff.runs(), vec![ChangeRun::new(0, 0, 2), ChangeRun::new(1, 0, 2)]);
    }
}
