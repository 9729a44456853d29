#![forbid(unsafe_code)]

//! The query picker and the parameter form.
//!
//! Both are [`Popup`]s built on demand by the layout reducer. Their
//! renderers read the picker and form state straight from the snapshot
//! being drawn.

use rtui_core::event::KeyCode;
use rtui_render::cell::PackedRgba;
use rtui_render::style::Style;
use rtui_widgets::text::{pad_left, split_by_length, truncate_with_ellipsis};
use rtui_widgets::{DrawContext, DrawError, KeyBinding, Popup, PopupBuilder};

use super::{Binding, PARAM_FORM_POPUP, QUERY_PICKER_POPUP, SELECTED_STYLE};
use crate::action::Action;
use crate::state::State;

pub const POPUP_STYLE: Style = Style::new().bg(PackedRgba::DARK_BLUE).fg(PackedRgba::WHITE);

/// Text field style inside the parameter form.
pub const INPUT_STYLE: Style = SELECTED_STYLE;

fn row(y: usize) -> i32 {
    i32::try_from(y).unwrap_or(i32::MAX)
}

/// Lists the configured queries, the selected one marked `[X]`.
pub fn render_query_picker(ctx: &mut DrawContext<'_, State>, style: Style) -> Result<(), DrawError> {
    let picker = &ctx.state().query_picker;
    let size = ctx.size();
    let (width, height) = (usize::from(size.width), usize::from(size.height));

    let text_lines = split_by_length(&picker.text, width, "");
    if text_lines.len() + picker.options.len() > height {
        tracing::warn!(
            height,
            required = text_lines.len() + picker.options.len(),
            "query picker cannot show every option"
        );
    }

    for (y, line) in text_lines.iter().enumerate().take(height) {
        ctx.print(0, row(y), line, style);
    }
    for (idx, option) in picker.options.iter().enumerate() {
        let y = text_lines.len() + idx;
        if y >= height {
            break;
        }
        let mark = if idx == picker.selected { 'X' } else { ' ' };
        let text = truncate_with_ellipsis(&format!("[{mark}] {}", option.text), width);
        ctx.print(0, row(y), &text, style);
    }
    Ok(())
}

/// Shows the query name, then one labelled text field per parameter, and
/// puts the cursor at the end of the selected field.
pub fn render_param_form(ctx: &mut DrawContext<'_, State>, style: Style) -> Result<(), DrawError> {
    let form = &ctx.state().param_form;
    let Some(query) = &form.query else {
        return Err(DrawError::State("parameter form has no query".into()));
    };
    let size = ctx.size();
    let (width, height) = (usize::from(size.width), usize::from(size.height));

    let name_lines = split_by_length(&query.name, width, "");
    if name_lines.len() + query.params.len() > height {
        tracing::warn!(
            height,
            required = name_lines.len() + query.params.len(),
            "parameter form cannot show every field"
        );
    }
    for (y, line) in name_lines.iter().enumerate().take(height) {
        ctx.print(0, row(y), line, style);
    }

    let label_width = query
        .params
        .iter()
        .map(|param| param.name.chars().count())
        .max()
        .unwrap_or(0)
        + 1;
    for (idx, param) in query.params.iter().enumerate() {
        let y = name_lines.len() + idx;
        if y >= height {
            break;
        }
        let label = pad_left(&format!("{}:", param.name), label_width);
        let end = ctx.print(0, row(y), &label, style);
        let field = " ".repeat(width.saturating_sub(usize::from(end)));
        ctx.print(i32::from(end), row(y), &field, INPUT_STYLE);
        ctx.print(i32::from(end), row(y), &param.value, INPUT_STYLE);
    }

    if let Some(param) = query.params.get(form.selected_param) {
        let x = label_width + param.value.chars().count();
        ctx.set_cursor(row(x), row(name_lines.len() + form.selected_param));
    }
    Ok(())
}

/// The picker popup: Cancel closes it, Proceed opens the form for the
/// selected query.
pub fn query_picker() -> Popup<State, Action> {
    PopupBuilder::new(QUERY_PICKER_POPUP)
        .title("Select a query to run")
        .size(50, 15)
        .style(POPUP_STYLE)
        .content(render_query_picker)
        .control("Cancel", |store| store.dispatch(Action::HidePopup))
        .control("Proceed", |store| store.dispatch(Action::ShowFillQueryParamsPopup))
        .build()
}

pub fn query_picker_bindings() -> Vec<KeyBinding<State, Action>> {
    vec![
        Binding::key(KeyCode::Down, "Next option", |_, ctx| {
            ctx.store.dispatch(Action::QueriesListNextOption);
        })
        .hidden(),
        Binding::key(KeyCode::Up, "Prev option", |_, ctx| {
            ctx.store.dispatch(Action::QueriesListPrevOption);
        })
        .hidden(),
    ]
}

/// The parameter form: Cancel closes it, Proceed closes it and runs the
/// query.
pub fn param_form() -> Popup<State, Action> {
    PopupBuilder::new(PARAM_FORM_POPUP)
        .title("Fill query params")
        .size(50, 20)
        .style(POPUP_STYLE)
        .content(render_param_form)
        .control("Cancel", |store| {
            store.dispatch(Action::StopInputMode);
            store.dispatch(Action::HidePopup);
        })
        .control("Proceed", |store| {
            store.dispatch(Action::StopInputMode);
            store.dispatch(Action::HidePopup);
            store.dispatch(Action::RunSqlQuery);
        })
        .build()
}

pub fn param_form_bindings() -> Vec<KeyBinding<State, Action>> {
    vec![
        Binding::key(KeyCode::Down, "Next param", |_, ctx| {
            ctx.store.dispatch(Action::FillQueryParamsNextField);
        })
        .hidden(),
        Binding::key(KeyCode::Up, "Prev param", |_, ctx| {
            ctx.store.dispatch(Action::FillQueryParamsPrevField);
        })
        .hidden(),
        Binding::key(KeyCode::Backspace, "Delete", |_, ctx| {
            ctx.store.dispatch(Action::InputBackspace);
        }),
    ]
}
