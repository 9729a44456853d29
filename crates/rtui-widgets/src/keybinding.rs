#![forbid(unsafe_code)]

//! Key bindings and the context their handlers run in.

use std::fmt;
use std::rc::Rc;

use rtui_core::event::{KeyCode, KeyEvent};
use rtui_core::geometry::Size;
use rtui_runtime::Store;

/// What a binding reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// A non-character key such as an arrow or Enter.
    Key(KeyCode),
    /// A specific typed character, without Ctrl/Alt/Super.
    Char(char),
    /// A character chorded with Ctrl.
    Ctrl(char),
}

impl Trigger {
    /// Whether `event` fires this trigger.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match *self {
            Trigger::Key(code) => event.code == code,
            Trigger::Char(c) => event.text_char() == Some(c),
            Trigger::Ctrl(c) => {
                event.ctrl()
                    && matches!(event.code, KeyCode::Char(ch) if ch.eq_ignore_ascii_case(&c))
            }
        }
    }

    fn glyph(&self) -> String {
        match self {
            Trigger::Key(code) => code.glyph(),
            Trigger::Char(c) => c.to_string(),
            Trigger::Ctrl(c) => format!("^{}", c.to_ascii_uppercase()),
        }
    }
}

/// What a handler gets to work with.
pub struct BindingContext<S, A> {
    /// The application store; handlers dispatch through it.
    pub store: Store<S, A>,
    /// Size of the view the binding belongs to.
    pub view_size: Size,
}

/// Handler invoked when a binding matches.
pub type Handler<S, A> = Rc<dyn Fn(&KeyEvent, &BindingContext<S, A>)>;

/// A key, a label for the hint bar, and the handler to run.
pub struct KeyBinding<S, A> {
    trigger: Trigger,
    label: String,
    hidden: bool,
    handler: Handler<S, A>,
}

impl<S, A> Clone for KeyBinding<S, A> {
    fn clone(&self) -> Self {
        Self {
            trigger: self.trigger,
            label: self.label.clone(),
            hidden: self.hidden,
            handler: Rc::clone(&self.handler),
        }
    }
}

impl<S, A> fmt::Debug for KeyBinding<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBinding")
            .field("trigger", &self.trigger)
            .field("label", &self.label)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

impl<S, A> KeyBinding<S, A> {
    /// Bind `trigger`; `name` becomes the hint label `"[glyph]name"`.
    pub fn new(
        trigger: Trigger,
        name: &str,
        handler: impl Fn(&KeyEvent, &BindingContext<S, A>) + 'static,
    ) -> Self {
        Self {
            trigger,
            label: format!("[{}]{name}", trigger.glyph()),
            hidden: false,
            handler: Rc::new(handler),
        }
    }

    /// Bind a non-character key.
    pub fn key(
        code: KeyCode,
        name: &str,
        handler: impl Fn(&KeyEvent, &BindingContext<S, A>) + 'static,
    ) -> Self {
        Self::new(Trigger::Key(code), name, handler)
    }

    /// Bind a typed character.
    pub fn char(
        c: char,
        name: &str,
        handler: impl Fn(&KeyEvent, &BindingContext<S, A>) + 'static,
    ) -> Self {
        Self::new(Trigger::Char(c), name, handler)
    }

    /// Bind Ctrl plus a character.
    pub fn ctrl(
        c: char,
        name: &str,
        handler: impl Fn(&KeyEvent, &BindingContext<S, A>) + 'static,
    ) -> Self {
        Self::new(Trigger::Ctrl(c), name, handler)
    }

    /// Keep the binding out of the hint bar.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// The same handler under another trigger, hidden from the hint bar.
    ///
    /// Used for aliases such as lower-case variants of a shortcut.
    #[must_use]
    pub fn alias(&self, trigger: Trigger) -> Self {
        Self {
            trigger,
            label: format!("[{}]", trigger.glyph()),
            hidden: true,
            handler: Rc::clone(&self.handler),
        }
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Hint bar label, e.g. `"[↓]Next"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether the binding is triggered by a plain typed character.
    pub fn is_char(&self) -> bool {
        matches!(self.trigger, Trigger::Char(_))
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.trigger.matches(event)
    }

    /// Run the handler.
    pub fn invoke(&self, event: &KeyEvent, ctx: &BindingContext<S, A>) {
        (self.handler)(event, ctx);
    }
}
