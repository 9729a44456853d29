#![forbid(unsafe_code)]

//! View registry, key routing and the draw pass.
//!
//! The [`Layout`] keeps views in registration order. Normal views take part
//! in border synthesis and tab cycling; overlays (popups) are drawn after
//! every normal view, in registration order, and are only focused through
//! explicit show/hide actions.
//!
//! Key routing looks at the global bindings first, then the focused view's
//! external bindings, then the view's own bindings, and stops at the first
//! match. The matched binding is cloned out of the registry before it runs,
//! so its handler may dispatch actions that reshape the layout.

use std::fmt;
use std::rc::Rc;

use rtui_core::collections::{any_matches, filter};
use rtui_core::event::KeyEvent;
use rtui_core::geometry::{Rect, Size};
use rtui_render::frame::Frame;

use crate::borders;
use crate::context::DrawContext;
use crate::keybinding::KeyBinding;
use crate::View;

/// How a view takes part in composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// A tiled pane with borders, reachable by tab cycling.
    Normal,
    /// A popup drawn above everything else.
    Overlay,
}

/// Computes a view's rectangle from the screen size.
pub type Geometry = Rc<dyn Fn(Size) -> Rect>;

/// A registered view and everything the layout knows about it.
pub struct ViewDescriptor<S, A> {
    pub view: Rc<dyn View<S, A>>,
    pub kind: ViewKind,
    pub geometry: Geometry,
    /// Position in the tab cycle; negative keeps the view out of it.
    pub focus_order: i32,
    /// Mirrors the top of the focus stack after [`Layout::sync_focus`].
    pub focused: bool,
    /// Bindings the owner attaches on top of the view's own.
    pub external_bindings: Vec<KeyBinding<S, A>>,
    /// Text written into the border above the view.
    pub title: Option<String>,
}

impl<S, A> fmt::Debug for ViewDescriptor<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewDescriptor")
            .field("name", &self.view.name())
            .field("kind", &self.kind)
            .field("focus_order", &self.focus_order)
            .field("focused", &self.focused)
            .field("external_bindings", &self.external_bindings.len())
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl<S, A> ViewDescriptor<S, A> {
    /// A tiled view placed by `geometry`.
    pub fn normal(
        view: Rc<dyn View<S, A>>,
        focus_order: i32,
        geometry: impl Fn(Size) -> Rect + 'static,
    ) -> Self {
        Self {
            view,
            kind: ViewKind::Normal,
            geometry: Rc::new(geometry),
            focus_order,
            focused: false,
            external_bindings: Vec::new(),
            title: None,
        }
    }

    /// A popup covering the whole screen; it positions itself inside.
    pub fn overlay(view: Rc<dyn View<S, A>>) -> Self {
        Self {
            view,
            kind: ViewKind::Overlay,
            geometry: Rc::new(Size::to_rect),
            focus_order: -1,
            focused: false,
            external_bindings: Vec::new(),
            title: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_external_bindings(mut self, bindings: Vec<KeyBinding<S, A>>) -> Self {
        self.external_bindings = bindings;
        self
    }

    pub fn name(&self) -> &str {
        self.view.name()
    }

    /// The view's rectangle on a screen of `screen` size, clipped to it.
    pub fn area(&self, screen: Size) -> Rect {
        (self.geometry)(screen).intersection(&screen.to_rect())
    }

    fn visible_bindings(&self) -> impl Iterator<Item = KeyBinding<S, A>> + '_ {
        self.external_bindings
            .iter()
            .cloned()
            .chain(self.view.key_bindings())
    }
}

/// The smallest order in `orders` greater than `current`, wrapping to the
/// smallest order overall. Negative orders never take part.
pub fn next_focus_order(orders: &[i32], current: i32) -> Option<i32> {
    let mut cycle: Vec<i32> = orders.iter().copied().filter(|order| *order >= 0).collect();
    cycle.sort_unstable();
    cycle.dedup();
    cycle
        .iter()
        .copied()
        .find(|order| *order > current)
        .or_else(|| cycle.first().copied())
}

/// Ordered view registry with global bindings.
pub struct Layout<S, A> {
    views: Vec<ViewDescriptor<S, A>>,
    global_bindings: Vec<KeyBinding<S, A>>,
    screen: Size,
}

impl<S, A> fmt::Debug for Layout<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("views", &self.views)
            .field("global_bindings", &self.global_bindings.len())
            .field("screen", &self.screen)
            .finish()
    }
}

impl<S, A> Layout<S, A> {
    pub fn new(screen: Size) -> Self {
        Self {
            views: Vec::new(),
            global_bindings: Vec::new(),
            screen,
        }
    }

    pub fn screen_size(&self) -> Size {
        self.screen
    }

    pub fn set_screen_size(&mut self, screen: Size) {
        if self.screen != screen {
            tracing::debug!(width = screen.width, height = screen.height, "screen resized");
        }
        self.screen = screen;
    }

    pub fn set_global_bindings(&mut self, bindings: Vec<KeyBinding<S, A>>) {
        self.global_bindings = bindings;
    }

    /// Register a view, replacing any view of the same name in place.
    pub fn insert(&mut self, descriptor: ViewDescriptor<S, A>) {
        match self.position(descriptor.name()) {
            Some(idx) => self.views[idx] = descriptor,
            None => {
                tracing::debug!(view = descriptor.name(), kind = ?descriptor.kind, "view registered");
                self.views.push(descriptor);
            }
        }
    }

    /// Unregister a view.
    pub fn remove(&mut self, name: &str) -> Option<ViewDescriptor<S, A>> {
        let idx = self.position(name)?;
        tracing::debug!(view = name, "view removed");
        Some(self.views.remove(idx))
    }

    /// Unregister every overlay, returning their names in registration
    /// order.
    pub fn remove_overlays(&mut self) -> Vec<String> {
        let mut removed = Vec::new();
        self.views.retain(|descriptor| {
            if descriptor.kind == ViewKind::Overlay {
                removed.push(descriptor.name().to_string());
                false
            } else {
                true
            }
        });
        if !removed.is_empty() {
            tracing::debug!(overlays = ?removed, "overlays removed");
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&ViewDescriptor<S, A>> {
        self.views.iter().find(|descriptor| descriptor.name() == name)
    }

    /// Mutable access for owners that adjust geometry or bindings in place.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ViewDescriptor<S, A>> {
        self.views.iter_mut().find(|descriptor| descriptor.name() == name)
    }

    /// Views in registration order.
    pub fn views(&self) -> impl Iterator<Item = &ViewDescriptor<S, A>> {
        self.views.iter()
    }

    pub fn has_overlay(&self) -> bool {
        any_matches(&self.views, |descriptor| descriptor.kind == ViewKind::Overlay)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.views.iter().position(|descriptor| descriptor.name() == name)
    }

    /// Mark `top` as the only focused view.
    pub fn sync_focus(&mut self, top: &str) {
        for descriptor in &mut self.views {
            descriptor.focused = descriptor.view.name() == top;
        }
    }

    /// The view flagged as focused.
    pub fn focused(&self) -> Option<&ViewDescriptor<S, A>> {
        self.views.iter().find(|descriptor| descriptor.focused)
    }

    /// Name of the normal view after `current` in the tab cycle.
    ///
    /// Overlays and views with a negative order are skipped. An unknown
    /// `current` starts the cycle from the beginning.
    pub fn focus_next(&self, current: &str) -> Option<String> {
        let cycle: Vec<&ViewDescriptor<S, A>> = self
            .views
            .iter()
            .filter(|descriptor| descriptor.kind == ViewKind::Normal && descriptor.focus_order >= 0)
            .collect();
        let orders: Vec<i32> = cycle.iter().map(|descriptor| descriptor.focus_order).collect();
        let current_order = cycle
            .iter()
            .find(|descriptor| descriptor.name() == current)
            .map_or(-1, |descriptor| descriptor.focus_order);
        let next = next_focus_order(&orders, current_order)?;
        cycle
            .iter()
            .find(|descriptor| descriptor.focus_order == next)
            .map(|descriptor| descriptor.name().to_string())
    }

    /// The first binding matching `event`, with the size of the view it
    /// belongs to.
    ///
    /// Global bindings report the screen size.
    pub fn find_binding(&self, event: &KeyEvent, focused: &str) -> Option<(KeyBinding<S, A>, Size)> {
        if let Some(binding) = self.global_bindings.iter().find(|binding| binding.matches(event)) {
            return Some((binding.clone(), self.screen));
        }

        let descriptor = self.get(focused)?;
        let size = descriptor.area(self.screen).size();
        descriptor
            .visible_bindings()
            .find(|binding| binding.matches(event))
            .map(|binding| (binding, size))
    }

    /// Labels of the bindings usable right now, for the hint bar.
    ///
    /// Hidden bindings are left out, and so are character bindings while
    /// typed characters go to a text field.
    pub fn action_hints(&self, focused: &str, input_mode: bool) -> Vec<String> {
        let usable = |binding: &KeyBinding<S, A>| {
            !binding.is_hidden() && !(input_mode && binding.is_char())
        };

        let mut hints: Vec<String> = filter(&self.global_bindings, usable)
            .into_iter()
            .map(|binding| binding.label().to_string())
            .collect();
        if let Some(descriptor) = self.get(focused) {
            hints.extend(
                descriptor
                    .visible_bindings()
                    .filter(|binding| usable(binding))
                    .map(|binding| binding.label().to_string()),
            );
        }
        hints
    }

    /// Draw every view into `frame`: borders and titles, normal views, then
    /// overlays.
    ///
    /// A view that fails to draw is logged and skipped.
    pub fn render(&self, state: &S, frame: &mut Frame) {
        let screen = frame.size();
        frame.hide_cursor();

        let normal = || {
            self.views
                .iter()
                .filter(|descriptor| descriptor.kind == ViewKind::Normal)
        };

        borders::draw_borders(
            &mut frame.buffer,
            normal().map(|descriptor| descriptor.area(screen)),
        );
        for descriptor in normal() {
            if let Some(title) = &descriptor.title {
                borders::draw_title(
                    &mut frame.buffer,
                    descriptor.area(screen),
                    title,
                    descriptor.focused,
                );
            }
        }

        for descriptor in normal() {
            draw_view(descriptor, state, frame, screen);
        }
        for descriptor in self
            .views
            .iter()
            .filter(|descriptor| descriptor.kind == ViewKind::Overlay)
        {
            draw_view(descriptor, state, frame, screen);
        }
    }
}

fn draw_view<S, A>(descriptor: &ViewDescriptor<S, A>, state: &S, frame: &mut Frame, screen: Size) {
    let area = descriptor.area(screen);
    let mut ctx = DrawContext::new(frame, area, state);
    if let Err(err) = descriptor.view.draw(&mut ctx) {
        tracing::error!(view = descriptor.name(), %err, "view failed to draw");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DrawError;
    use rtui_core::event::KeyCode;
    use rtui_render::style::Style;

    struct Label {
        name: &'static str,
        text: &'static str,
        bindings: Vec<(char, bool)>,
    }

    impl View<(), ()> for Label {
        fn draw(&self, ctx: &mut DrawContext<'_, ()>) -> Result<(), DrawError> {
            ctx.print(0, 0, self.text, Style::new());
            Ok(())
        }

        fn name(&self) -> &str {
            self.name
        }

        fn key_bindings(&self) -> Vec<KeyBinding<(), ()>> {
            self.bindings
                .iter()
                .map(|(c, hidden)| {
                    let binding = KeyBinding::char(*c, self.name, |_, _| {});
                    if *hidden { binding.hidden() } else { binding }
                })
                .collect()
        }
    }

    struct Broken;

    impl View<(), ()> for Broken {
        fn draw(&self, _ctx: &mut DrawContext<'_, ()>) -> Result<(), DrawError> {
            Err(DrawError::State("no data".into()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn label(name: &'static str, text: &'static str) -> Rc<dyn View<(), ()>> {
        Rc::new(Label {
            name,
            text,
            bindings: Vec::new(),
        })
    }

    fn three_panes() -> Layout<(), ()> {
        let mut layout = Layout::new(Size::new(20, 5));
        layout.insert(ViewDescriptor::normal(label("a", "A"), 1, |_| Rect::new(1, 1, 5, 3)));
        layout.insert(ViewDescriptor::normal(label("b", "B"), 2, |_| Rect::new(7, 1, 5, 3)));
        layout.insert(ViewDescriptor::normal(label("c", "C"), 3, |_| Rect::new(13, 1, 6, 3)));
        layout
    }

    #[test]
    fn next_order_wraps_and_skips_negative() {
        assert_eq!(next_focus_order(&[1, 2, 3], 2), Some(3));
        assert_eq!(next_focus_order(&[3, 1, 2], 3), Some(1));
        assert_eq!(next_focus_order(&[-1, 2], 2), Some(2));
        assert_eq!(next_focus_order(&[-1], 0), None);
    }

    #[test]
    fn focus_next_never_selects_overlay() {
        let mut layout = three_panes();
        layout.insert(ViewDescriptor::overlay(label("popup", "P")));
        assert_eq!(layout.focus_next("b").as_deref(), Some("c"));
        assert_eq!(layout.focus_next("c").as_deref(), Some("a"));
        assert_eq!(layout.focus_next("popup").as_deref(), Some("a"));
    }

    #[test]
    fn sync_focus_flags_exactly_one_view() {
        let mut layout = three_panes();
        layout.sync_focus("b");
        assert_eq!(layout.views().filter(|d| d.focused).count(), 1);
        assert_eq!(layout.focused().map(ViewDescriptor::name), Some("b"));
    }

    #[test]
    fn global_bindings_win() {
        let mut layout = three_panes();
        layout.insert(
            ViewDescriptor::normal(
                Rc::new(Label {
                    name: "d",
                    text: "",
                    bindings: vec![('x', false)],
                }),
                4,
                |_| Rect::new(0, 0, 1, 1),
            )
            .with_external_bindings(vec![KeyBinding::char('y', "external", |_, _| {})]),
        );
        layout.set_global_bindings(vec![KeyBinding::char('x', "global", |_, _| {})]);

        let (binding, size) = layout.find_binding(&KeyEvent::char('x'), "d").unwrap();
        assert_eq!(binding.label(), "[x]global");
        assert_eq!(size, Size::new(20, 5));

        let (binding, size) = layout.find_binding(&KeyEvent::char('y'), "d").unwrap();
        assert_eq!(binding.label(), "[y]external");
        assert_eq!(size, Size::new(1, 1));

        assert!(layout.find_binding(&KeyEvent::new(KeyCode::Enter), "d").is_none());
    }

    #[test]
    fn hints_skip_hidden_and_chars_in_input_mode() {
        let mut layout = Layout::new(Size::new(10, 3));
        layout.insert(ViewDescriptor::normal(
            Rc::new(Label {
                name: "v",
                text: "",
                bindings: vec![('a', false), ('b', true)],
            }),
            1,
            |_| Rect::new(1, 1, 3, 1),
        ));
        layout.set_global_bindings(vec![KeyBinding::key(KeyCode::Escape, "Exit", |_, _| {})]);

        assert_eq!(layout.action_hints("v", false), vec!["[Esc]Exit", "[a]v"]);
        assert_eq!(layout.action_hints("v", true), vec!["[Esc]Exit"]);
    }

    #[test]
    fn overlays_draw_over_normal_views() {
        let mut layout = three_panes();
        layout.insert(ViewDescriptor::normal(label("under", "under"), 5, |_| Rect::new(0, 0, 5, 1)));
        layout.insert(ViewDescriptor::overlay(label("over", "OV")));
        let mut frame = Frame::new(20, 5);
        layout.render(&(), &mut frame);
        assert!(frame.buffer.row_text(0).starts_with("OVder"));
        assert!(frame.buffer.row_text(1).contains('A'));
    }

    #[test]
    fn failing_view_does_not_stop_the_frame() {
        let mut layout = three_panes();
        layout.insert(ViewDescriptor::normal(Rc::new(Broken), 9, |_| Rect::new(0, 4, 1, 1)));
        let mut frame = Frame::new(20, 5);
        layout.render(&(), &mut frame);
        assert!(frame.buffer.row_text(1).contains('C'));
    }

    #[test]
    fn remove_overlays_returns_names() {
        let mut layout = three_panes();
        layout.insert(ViewDescriptor::overlay(label("p1", "")));
        layout.insert(ViewDescriptor::overlay(label("p2", "")));
        assert!(layout.has_overlay());
        assert_eq!(layout.remove_overlays(), vec!["p1", "p2"]);
        assert!(!layout.has_overlay());
        assert!(layout.contains("a"));
    }

    #[test]
    fn titles_mark_the_focused_view() {
        let mut layout = Layout::new(Size::new(12, 4));
        layout.insert(
            ViewDescriptor::normal(label("a", ""), 1, |s: Size| {
                Rect::new(1, 1, s.width - 2, s.height - 2)
            })
            .with_title("List"),
        );
        layout.sync_focus("a");
        let mut frame = Frame::new(12, 4);
        layout.render(&(), &mut frame);
        assert_eq!(frame.buffer.row_text(0), "╔╡List╞════╗");
        assert_eq!(frame.buffer.row_text(3), "╚══════════╝");
    }
}
