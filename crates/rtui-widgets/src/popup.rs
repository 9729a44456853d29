#![forbid(unsafe_code)]

//! Modal popups.
//!
//! A [`Popup`] is an ordinary [`View`] that centers a titled box on the
//! screen, lets a renderer fill the interior, and shows its controls
//! right-aligned in the bottom border. `Tab` cycles the selected control
//! and `Enter` runs it. The layout registers popups as overlays, which
//! keeps them out of border synthesis and tab cycling.
//!
//! ```ignore
//! let popup = PopupBuilder::new("confirm")
//!     .title("Really?")
//!     .size(30, 6)
//!     .content(|ctx, style| {
//!         ctx.print(0, 0, "Drop the message?", style);
//!         Ok(())
//!     })
//!     .control("Cancel", |store| store.dispatch(Action::HidePopup))
//!     .control("Drop", |store| store.dispatch(Action::Drop))
//!     .build();
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use rtui_core::event::KeyCode;
use rtui_core::geometry::Rect;
use rtui_render::cell::StyleFlags;
use rtui_render::drawing::BoxChars;
use rtui_render::style::Style;
use rtui_runtime::Store;

use crate::context::DrawContext;
use crate::keybinding::KeyBinding;
use crate::{DrawError, View};

/// Draws the interior of a popup. The context covers the interior only.
pub type ContentRenderer<S> = Rc<dyn Fn(&mut DrawContext<'_, S>, Style) -> Result<(), DrawError>>;

/// Runs when a control is activated.
pub type ControlHandler<S, A> = Rc<dyn Fn(&Store<S, A>)>;

struct Control<S, A> {
    label: String,
    handler: ControlHandler<S, A>,
}

impl<S, A> Clone for Control<S, A> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            handler: Rc::clone(&self.handler),
        }
    }
}

impl<S, A> Control<S, A> {
    fn width(&self) -> usize {
        self.label.chars().count()
    }
}

/// A centered modal box.
pub struct Popup<S, A> {
    name: String,
    title: String,
    width: u16,
    height: u16,
    style: Style,
    content: Option<ContentRenderer<S>>,
    controls: Rc<Vec<Control<S, A>>>,
    selected: Rc<Cell<Option<usize>>>,
}

impl<S, A> fmt::Debug for Popup<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Popup")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("controls", &self.controls.iter().map(|c| c.label.as_str()).collect::<Vec<_>>())
            .field("selected", &self.selected.get())
            .finish_non_exhaustive()
    }
}

impl<S, A> Popup<S, A> {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Index of the selected control, `None` until `Tab` is pressed.
    pub fn selected_control(&self) -> Option<usize> {
        self.selected.get()
    }

    /// The box this popup occupies inside `screen`.
    pub fn bounds(&self, screen: Rect) -> Rect {
        screen.centered(self.width, self.height)
    }

    fn draw_frame(&self, ctx: &mut DrawContext<'_, S>) {
        let (w, h) = (i32::from(self.width), i32::from(self.height));
        let style = self.style;

        ctx.draw_box(BoxChars::SQUARE, style);

        // The title starts at column 2 and keeps one line cell before the
        // corner.
        for (x, glyph) in (2..w - 2).zip(self.title.chars()) {
            ctx.set_cell(x, 0, style, glyph);
        }

        let total: usize = self.controls.iter().map(Control::width).sum();
        let mut x = w - 1 - i32::try_from(total).unwrap_or(i32::MAX);
        let selected = self.selected.get();
        for (idx, control) in self.controls.iter().enumerate() {
            let control_style = if selected == Some(idx) {
                style.reversed().attrs(StyleFlags::UNDERLINE)
            } else {
                style
            };
            for glyph in control.label.chars() {
                if x >= 1 {
                    ctx.set_cell(x, h - 1, control_style, glyph);
                }
                x += 1;
            }
        }
    }
}

impl<S: 'static, A: 'static> View<S, A> for Popup<S, A>
where
    S: Clone + fmt::Debug + Send,
    A: fmt::Debug,
{
    fn draw(&self, ctx: &mut DrawContext<'_, S>) -> Result<(), DrawError> {
        let size = ctx.size();
        let bounds = Rect::from_size(size.width, size.height).centered(self.width, self.height);
        ctx.nested(bounds, |ctx| {
            self.draw_frame(ctx);
            let interior = Rect::new(
                1,
                1,
                self.width.saturating_sub(2),
                self.height.saturating_sub(2),
            );
            match &self.content {
                Some(render) => ctx.nested(interior, |inner| render(inner, self.style)),
                None => Ok(()),
            }
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn key_bindings(&self) -> Vec<KeyBinding<S, A>> {
        if self.controls.is_empty() {
            return Vec::new();
        }

        let count = self.controls.len();
        let selected = Rc::clone(&self.selected);
        let choose = KeyBinding::key(KeyCode::Tab, "Choose btn", move |_, ctx| {
            let next = selected.get().map_or(0, |idx| (idx + 1) % count);
            selected.set(Some(next));
            ctx.store.refresh();
        });

        let selected = Rc::clone(&self.selected);
        let controls = Rc::clone(&self.controls);
        let click = KeyBinding::key(KeyCode::Enter, "Click btn", move |_, ctx| {
            let Some(control) = selected.get().and_then(|idx| controls.get(idx)) else {
                return;
            };
            tracing::debug!(control = %control.label, "popup control activated");
            (control.handler)(&ctx.store);
            ctx.store.refresh();
        });

        vec![choose, click]
    }
}

/// Accumulates popup settings; see the module docs.
pub struct PopupBuilder<S, A> {
    name: String,
    title: String,
    width: u16,
    height: u16,
    style: Style,
    content: Option<ContentRenderer<S>>,
    controls: Vec<Control<S, A>>,
}

impl<S, A> PopupBuilder<S, A> {
    /// Start a popup registered under `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            width: 0,
            height: 0,
            style: Style::new(),
            content: None,
            controls: Vec::new(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Outer size, border included.
    #[must_use]
    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn content(
        mut self,
        render: impl Fn(&mut DrawContext<'_, S>, Style) -> Result<(), DrawError> + 'static,
    ) -> Self {
        self.content = Some(Rc::new(render));
        self
    }

    /// Add a control shown as `[label]`.
    #[must_use]
    pub fn control(mut self, label: &str, handler: impl Fn(&Store<S, A>) + 'static) -> Self {
        self.controls.push(Control {
            label: format!("[{label}]"),
            handler: Rc::new(handler),
        });
        self
    }

    /// Finish; no control is selected yet.
    pub fn build(self) -> Popup<S, A> {
        Popup {
            name: self.name,
            title: self.title,
            width: self.width,
            height: self.height,
            style: self.style,
            content: self.content,
            controls: Rc::new(self.controls),
            selected: Rc::new(Cell::new(None)),
        }
    }
}
