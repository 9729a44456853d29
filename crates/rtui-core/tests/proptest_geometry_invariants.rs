//! Property-based invariant tests for geometry primitives and the stack.
//!
//! 1. Intersection is commutative and fits within both inputs.
//! 2. `from_signed` never panics and never produces a rect wider than the input.
//! 3. `centered` keeps the requested size and never starts left of the parent.
//! 4. Stack push/pop is LIFO for any sequence.

use proptest::prelude::*;
use rtui_core::collections::Stack;
use rtui_core::geometry::{Rect, Size};

// ── Helpers ─────────────────────────────────────────────────────────────

fn small_rect_strategy() -> impl Strategy<Value = Rect> {
    (0u16..=500, 0u16..=500, 0u16..=500, 0u16..=500).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn size_strategy() -> impl Strategy<Value = Size> {
    (0u16..=400, 0u16..=200).prop_map(|(w, h)| Size::new(w, h))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Intersection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn intersection_commutative(a in small_rect_strategy(), b in small_rect_strategy()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }

    #[test]
    fn intersection_within_both(a in small_rect_strategy(), b in small_rect_strategy()) {
        let i = a.intersection(&b);
        if !i.is_empty() {
            prop_assert!(i.x >= a.x && i.right() <= a.right());
            prop_assert!(i.y >= b.y && i.bottom() <= b.bottom());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Signed construction
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn from_signed_clamps(x in any::<i32>(), y in any::<i32>(), w in any::<i32>(), h in any::<i32>()) {
        let rect = Rect::from_signed(x, y, w, h);
        if w <= 0 {
            prop_assert_eq!(rect.width, 0);
        }
        if (0..=i32::from(u16::MAX)).contains(&h) {
            prop_assert_eq!(i32::from(rect.height), h);
        }
        if x < 0 {
            prop_assert_eq!(rect.x, 0);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Centering
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn centered_keeps_size(screen in size_strategy(), w in 0u16..=120, h in 0u16..=60) {
        let area = screen.to_rect().centered(w, h);
        prop_assert_eq!(area.size(), Size::new(w, h));
        prop_assert!(area.x <= screen.width / 2);
        prop_assert!(area.y <= screen.height / 2);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Stack ordering
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn stack_pops_in_reverse(values in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut stack = Stack::new();
        for v in &values {
            stack.push(*v);
        }
        prop_assert_eq!(stack.len(), values.len());
        let mut popped = Vec::new();
        while let Some(v) = stack.pop() {
            popped.push(v);
        }
        popped.reverse();
        prop_assert_eq!(popped, values);
    }
}
