#![forbid(unsafe_code)]

//! Views and composition for rtui.
//!
//! A [`View`] draws itself through a [`DrawContext`] clipped to its own
//! rectangle and advertises the [`KeyBinding`]s it reacts to. The
//! [`Layout`](layout::Layout) owns the registered views, synthesizes the
//! borders between them, routes keys, and tracks focus.

pub mod borders;
pub mod context;
pub mod focus;
pub mod keybinding;
pub mod layout;
pub mod popup;
pub mod scrollable;
pub mod text;

pub use context::DrawContext;
pub use focus::FocusStack;
pub use keybinding::{BindingContext, KeyBinding, Trigger};
pub use layout::{Layout, ViewDescriptor, ViewKind};
pub use popup::{Popup, PopupBuilder};
pub use scrollable::{ScrollableLine, ScrollableView};

/// Why a view failed to draw.
///
/// The layout logs these per view and keeps compositing the rest of the
/// frame.
#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    /// The view's area cannot hold anything meaningful.
    #[error("area {width}x{height} is too small")]
    TooSmall { width: u16, height: u16 },
    /// The state the view renders is inconsistent.
    #[error("inconsistent state: {0}")]
    State(String),
}

/// A renderable, focusable pane.
///
/// `S` is the store state the view renders and `A` the action type its
/// key bindings dispatch. Views take `&self` and keep view-local state
/// such as scroll offsets in cells.
pub trait View<S, A> {
    /// Draw into `ctx`, whose coordinates are relative to the view.
    fn draw(&self, ctx: &mut DrawContext<'_, S>) -> Result<(), DrawError>;

    /// Registry name of the view.
    fn name(&self) -> &str;

    /// Bindings active while this view has focus.
    fn key_bindings(&self) -> Vec<KeyBinding<S, A>> {
        Vec::new()
    }
}
