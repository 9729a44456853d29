#![forbid(unsafe_code)]

//! Optional-field styles applied on top of cells.

use crate::cell::{Cell, PackedRgba, StyleFlags};

/// A partial style: unset fields leave the cell's existing value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Foreground color override.
    pub fg: Option<PackedRgba>,
    /// Background color override.
    pub bg: Option<PackedRgba>,
    /// Attribute flags added to the cell.
    pub attrs: Option<StyleFlags>,
}

impl Style {
    /// An empty style.
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: None,
        }
    }

    /// Set the foreground color.
    #[must_use]
    pub const fn fg(mut self, color: PackedRgba) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    #[must_use]
    pub const fn bg(mut self, color: PackedRgba) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add attribute flags.
    #[must_use]
    pub const fn attrs(mut self, flags: StyleFlags) -> Self {
        self.attrs = Some(match self.attrs {
            Some(current) => current.union(flags),
            None => flags,
        });
        self
    }

    /// Bold text.
    #[must_use]
    pub const fn bold(self) -> Self {
        self.attrs(StyleFlags::BOLD)
    }

    /// The same style with foreground and background swapped.
    ///
    /// An unset side becomes the terminal default on the other side, so a
    /// style with only a background still inverts visibly.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            fg: Some(self.bg.unwrap_or(PackedRgba::TRANSPARENT)),
            bg: Some(self.fg.unwrap_or(PackedRgba::TRANSPARENT)),
            attrs: self.attrs,
        }
    }

    /// Whether no field is set.
    pub const fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_none()
    }

    /// Apply the set fields to `cell`.
    pub fn apply_to(&self, cell: &mut Cell) {
        if let Some(fg) = self.fg {
            cell.fg = fg;
        }
        if let Some(bg) = self.bg {
            cell.bg = bg;
        }
        if let Some(attrs) = self.attrs {
            cell.attrs |= attrs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_only_touches_set_fields() {
        let mut cell = Cell::from_char('a').with_bg(PackedRgba::RED);
        Style::new().fg(PackedRgba::WHITE).apply_to(&mut cell);
        assert_eq!(cell.fg, PackedRgba::WHITE);
        assert_eq!(cell.bg, PackedRgba::RED);
    }

    #[test]
    fn reversed_swaps_colors() {
        let style = Style::new()
            .fg(PackedRgba::WHITE)
            .bg(PackedRgba::DARK_BLUE)
            .reversed();
        assert_eq!(style.fg, Some(PackedRgba::DARK_BLUE));
        assert_eq!(style.bg, Some(PackedRgba::WHITE));
    }

    #[test]
    fn attrs_accumulate() {
        let style = Style::new().bold().attrs(StyleFlags::UNDERLINE);
        assert_eq!(
            style.attrs,
            Some(StyleFlags::BOLD | StyleFlags::UNDERLINE)
        );
    }
}
