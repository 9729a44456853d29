#![forbid(unsafe_code)]

//! The status line: action hints on the left, the latest notification on
//! the right.

use rtui_widgets::text::{pad_right, truncate_with_ellipsis};
use rtui_widgets::{DrawContext, DrawError, View};
use unicode_width::UnicodeWidthStr;

use super::SELECTED_STYLE;
use crate::action::Action;
use crate::state::State;

pub struct ControlsView {
    name: String,
}

impl ControlsView {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The status line text for `state` at `width` columns.
pub fn status_line(state: &State, width: usize) -> String {
    let hints: String = state.app_actions.iter().map(|hint| format!("{hint} ")).collect();
    let Some(note) = &state.notification else {
        return pad_right(&truncate_with_ellipsis(&hints, width), width);
    };

    let note = note.display();
    let note_width = note.width();
    if note_width + 1 > width {
        return pad_right(&truncate_with_ellipsis(&note, width), width);
    }
    let left = truncate_with_ellipsis(&hints, width - note_width - 1);
    format!("{} {note}", pad_right(&left, width - note_width - 1))
}

impl View<State, Action> for ControlsView {
    fn draw(&self, ctx: &mut DrawContext<'_, State>) -> Result<(), DrawError> {
        let line = status_line(ctx.state(), usize::from(ctx.size().width));
        ctx.print(0, 0, &line, SELECTED_STYLE);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
