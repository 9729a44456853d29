#![forbid(unsafe_code)]

//! The DLQ message list.

use rtui_core::collections::map_indexed;
use rtui_core::event::KeyCode;
use rtui_widgets::text::truncate_with_ellipsis;
use rtui_widgets::{DrawContext, DrawError, KeyBinding, ScrollableLine, ScrollableView, Trigger, View};

use super::{Binding, SELECTED_STYLE, TEXT_STYLE};
use crate::action::Action;
use crate::state::State;

pub struct MessageListView {
    name: String,
    scroll: ScrollableView,
}

impl MessageListView {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scroll: ScrollableView::new(),
        }
    }

    /// First visible row.
    pub fn offset(&self) -> usize {
        self.scroll.offset()
    }

    fn lines(state: &State, width: usize) -> Vec<ScrollableLine> {
        map_indexed(&state.messages, |idx, message| {
            let text = format!("{idx}. {}", message.body);
            let style = if state.selected_message == Some(idx) {
                SELECTED_STYLE
            } else {
                TEXT_STYLE
            };
            ScrollableLine::new(truncate_with_ellipsis(&text, width.saturating_sub(1)), style)
        })
    }
}

impl View<State, Action> for MessageListView {
    fn draw(&self, ctx: &mut DrawContext<'_, State>) -> Result<(), DrawError> {
        let state = ctx.state();
        let size = ctx.size();
        let lines = Self::lines(state, usize::from(size.width));
        // New content resets the offset, so the selection is re-anchored on
        // every draw.
        self.scroll.check_content(&lines);
        if let Some(selected) = state.selected_message {
            self.scroll.ensure_visible(selected, usize::from(size.height));
        }
        self.scroll.render(&lines, ctx);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn key_bindings(&self) -> Vec<KeyBinding<State, Action>> {
        let next = Binding::key(KeyCode::Down, "Next msg", |_, ctx| ctx.store.dispatch(Action::NextMessage));
        let prev = Binding::key(KeyCode::Up, "Prev msg", |_, ctx| ctx.store.dispatch(Action::PrevMessage));

        let load = Binding::char('L', "Load", |_, ctx| ctx.store.dispatch(Action::LoadMessages));
        let drop = Binding::char('D', "Drop", |_, ctx| {
            if let Some(selected) = ctx.store.current().selected_message {
                ctx.store.dispatch(Action::DropMessage(selected));
            }
        });

        let load_lower = load.alias(Trigger::Char('l'));
        let drop_lower = drop.alias(Trigger::Char('d'));
        vec![next, prev, load, load_lower, drop, drop_lower]
    }
}
