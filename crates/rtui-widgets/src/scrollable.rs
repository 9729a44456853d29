#![forbid(unsafe_code)]

//! Vertically scrollable content with change detection.
//!
//! A [`ScrollableView`] remembers a fingerprint of the lines it last drew.
//! Redraws with the same lines keep the scroll offset; new content resets
//! it to the top. Views with a cursor row pull it back into view with
//! [`ScrollableView::ensure_visible`]. Views embed one and call
//! [`ScrollableView::render`] from their `draw`.

use std::cell::Cell;

use rtui_render::style::Style;

use crate::context::DrawContext;

const FNV64_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV64_PRIME: u64 = 0x0000_0100_0000_01B3;
// Separates lines so ["ab", "c"] and ["a", "bc"] hash differently.
const LINE_SEPARATOR: u8 = 0xff;

/// One line of scrollable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollableLine {
    pub text: String,
    pub style: Style,
}

impl ScrollableLine {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Scroll state for a list of lines.
#[derive(Debug, Default)]
pub struct ScrollableView {
    from: Cell<usize>,
    fingerprint: Cell<Option<u64>>,
    content_height: Cell<usize>,
}

impl ScrollableView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the first visible line.
    pub fn offset(&self) -> usize {
        self.from.get()
    }

    /// Line count seen by the last render.
    pub fn content_height(&self) -> usize {
        self.content_height.get()
    }

    /// Draw the visible window of `lines` into `ctx`.
    ///
    /// Lines wider than the view are clipped; wrapping is up to the caller.
    pub fn render<S>(&self, lines: &[ScrollableLine], ctx: &mut DrawContext<'_, S>) {
        self.check_content(lines);

        let height = usize::from(ctx.size().height);
        let from = self.from.get();
        for (row, line) in lines.iter().skip(from).take(height).enumerate() {
            let y = i32::try_from(row).unwrap_or(i32::MAX);
            ctx.print(0, y, &line.text, line.style);
        }
    }

    /// Record `lines` as the current content.
    ///
    /// Returns `true` when the content changed, in which case the offset was
    /// reset to the top.
    pub fn check_content(&self, lines: &[ScrollableLine]) -> bool {
        self.content_height.set(lines.len());
        let sum = fingerprint(lines);
        if self.fingerprint.get() == Some(sum) {
            return false;
        }
        self.fingerprint.set(Some(sum));
        self.from.set(0);
        true
    }

    /// Move one line down, stopping at the last line.
    ///
    /// Returns whether the offset moved.
    pub fn scroll_down(&self) -> bool {
        let from = self.from.get();
        if from + 1 < self.content_height.get() {
            self.from.set(from + 1);
            true
        } else {
            false
        }
    }

    /// Scroll the least distance that puts `row` inside a window of `height`
    /// lines.
    ///
    /// Returns whether the offset moved.
    pub fn ensure_visible(&self, row: usize, height: usize) -> bool {
        let from = self.from.get();
        let target = if row < from {
            row
        } else if height > 0 && row >= from + height {
            row + 1 - height
        } else {
            from
        };
        self.from.set(target);
        target != from
    }

    /// Move one line up, stopping at the first line.
    pub fn scroll_up(&self) -> bool {
        let from = self.from.get();
        if from > 0 {
            self.from.set(from - 1);
            true
        } else {
            false
        }
    }
}

/// Order-sensitive FNV-1a hash over the text of `lines`.
pub fn fingerprint(lines: &[ScrollableLine]) -> u64 {
    lines.iter().fold(FNV64_OFFSET_BASIS, |hash, line| {
        let hash = fnv1a64_extend(hash, line.text.as_bytes());
        fnv1a64_extend(hash, &[LINE_SEPARATOR])
    })
}

fn fnv1a64_extend(mut hash: u64, bytes: &[u8]) -> u64 {
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV64_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtui_core::geometry::Rect;
    use rtui_render::frame::Frame;

    fn lines(texts: &[&str]) -> Vec<ScrollableLine> {
        texts
            .iter()
            .map(|text| ScrollableLine::new(*text, Style::new()))
            .collect()
    }

    #[test]
    fn renders_window_from_offset() {
        let view = ScrollableView::new();
        let content = lines(&["one", "two", "three", "four"]);
        let mut frame = Frame::new(5, 2);
        view.render(&content, &mut DrawContext::new(&mut frame, Rect::new(0, 0, 5, 2), &()));
        assert!(view.scroll_down());

        let mut frame = Frame::new(5, 2);
        view.render(&content, &mut DrawContext::new(&mut frame, Rect::new(0, 0, 5, 2), &()));
        assert_eq!(frame.buffer.row_text(0), "two  ");
        assert_eq!(frame.buffer.row_text(1), "three");
    }

    #[test]
    fn same_content_keeps_offset() {
        let view = ScrollableView::new();
        let content = lines(&["a", "b", "c"]);
        view.check_content(&content);
        view.scroll_down();
        assert!(!view.check_content(&content));
        assert_eq!(view.offset(), 1);
    }

    #[test]
    fn changed_content_resets_offset() {
        let view = ScrollableView::new();
        view.check_content(&lines(&["a", "b", "c"]));
        view.scroll_down();
        view.scroll_down();
        assert!(view.check_content(&lines(&["a", "b", "d"])));
        assert_eq!(view.offset(), 0);
    }

    #[test]
    fn scrolling_is_clamped() {
        let view = ScrollableView::new();
        assert!(!view.scroll_down());
        view.check_content(&lines(&["a", "b"]));
        assert!(view.scroll_down());
        assert!(!view.scroll_down());
        assert_eq!(view.offset(), 1);
        assert!(view.scroll_up());
        assert!(!view.scroll_up());
    }

    #[test]
    fn ensure_visible_moves_the_least_distance() {
        let view = ScrollableView::new();
        view.check_content(&lines(&["0", "1", "2", "3", "4", "5", "6"]));
        assert!(!view.ensure_visible(2, 3));
        assert!(view.ensure_visible(5, 3));
        assert_eq!(view.offset(), 3);
        assert!(!view.ensure_visible(3, 3));
        assert!(view.ensure_visible(1, 3));
        assert_eq!(view.offset(), 1);
    }

    #[test]
    fn fingerprint_respects_line_boundaries() {
        assert_ne!(fingerprint(&lines(&["ab", "c"])), fingerprint(&lines(&["a", "bc"])));
        assert_ne!(fingerprint(&lines(&["a", "b"])), fingerprint(&lines(&["b", "a"])));
    }
}
