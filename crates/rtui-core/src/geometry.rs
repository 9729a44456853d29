#![forbid(unsafe_code)]

//! Geometric primitives.

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Size {
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Check if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The rectangle covering the whole size, anchored at the origin.
    #[inline]
    pub const fn to_rect(self) -> Rect {
        Rect::from_size(self.width, self.height)
    }
}

impl From<(u16, u16)> for Size {
    fn from((width, height): (u16, u16)) -> Self {
        Self::new(width, height)
    }
}

/// A rectangle for scissor regions, layout bounds, and hit testing.
///
/// Uses terminal coordinates (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Build a rectangle from signed layout arithmetic.
    ///
    /// Negative origins and sizes clamp to zero and values beyond `u16::MAX`
    /// saturate, so geometry formulas evaluated on a tiny terminal yield an
    /// empty rectangle instead of wrapping around.
    pub fn from_signed(x: i32, y: i32, width: i32, height: i32) -> Self {
        fn clamp(v: i32) -> u16 {
            u16::try_from(v.max(0)).unwrap_or(u16::MAX)
        }
        Self::new(clamp(x), clamp(y), clamp(width), clamp(height))
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size of the rectangle.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Compute the intersection with another rectangle.
    ///
    /// Returns an empty rectangle if the rectangles don't overlap.
    #[inline]
    pub fn intersection(&self, other: &Rect) -> Rect {
        self.intersection_opt(other).unwrap_or_default()
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[inline]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Shrink by `margin` cells on every side.
    pub fn inset(&self, margin: u16) -> Rect {
        let double = margin.saturating_mul(2);
        Rect {
            x: self.x.saturating_add(margin),
            y: self.y.saturating_add(margin),
            width: self.width.saturating_sub(double),
            height: self.height.saturating_sub(double),
        }
    }

    /// A rectangle of the given size centered inside `self`.
    ///
    /// The origin is `self.width / 2 - width / 2`, saturating at the
    /// top-left corner when the requested size is larger than `self`.
    pub fn centered(&self, width: u16, height: u16) -> Rect {
        let x = (self.width / 2).saturating_sub(width / 2);
        let y = (self.height / 2).saturating_sub(height / 2);
        Rect::new(self.x.saturating_add(x), self.y.saturating_add(y), width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::{Rect, Size};

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(rect.contains(2, 3));
        assert!(rect.contains(5, 7));
        assert!(!rect.contains(6, 3));
        assert!(!rect.contains(2, 8));
    }

    #[test]
    fn rect_intersection_overlaps() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(2, 2, 4, 4);
        assert_eq!(a.intersection(&b), Rect::new(2, 2, 2, 2));
    }

    #[test]
    fn rect_intersection_no_overlap_is_empty() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(3, 3, 2, 2);
        assert_eq!(a.intersection(&b), Rect::default());
    }

    #[test]
    fn from_signed_clamps_negatives() {
        assert_eq!(Rect::from_signed(-3, 2, 10, -1), Rect::new(0, 2, 10, 0));
        assert_eq!(
            Rect::from_signed(0, 0, 100_000, 5),
            Rect::new(0, 0, u16::MAX, 5)
        );
    }

    #[test]
    fn centered_matches_half_offsets() {
        let screen = Size::new(80, 24).to_rect();
        assert_eq!(screen.centered(50, 15), Rect::new(15, 5, 50, 15));
        assert_eq!(screen.centered(100, 40), Rect::new(0, 0, 100, 40));
    }

    #[test]
    fn inset_shrinks_each_side() {
        assert_eq!(Rect::new(2, 2, 10, 6).inset(1), Rect::new(3, 3, 8, 4));
        assert!(Rect::new(0, 0, 1, 1).inset(1).is_empty());
    }
}
