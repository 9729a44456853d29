#![forbid(unsafe_code)]

//! Query results as a scrollable text grid.

use rtui_core::event::KeyCode;
use rtui_widgets::text::pad_right;
use rtui_widgets::{DrawContext, DrawError, KeyBinding, Trigger, View};
use unicode_width::UnicodeWidthStr;

use super::{Binding, TEXT_STYLE};
use crate::action::Action;
use crate::database::QueryResults;
use crate::state::State;

const INDEX_HEADER: &str = "#";

/// Format `results` as table rows: a header row, then one row per result.
///
/// Every column is padded to its widest cell. The first column numbers the
/// rows.
///
/// ```text
/// | # | id | name  |
/// | 0 | 1  | alice |
/// ```
pub fn calculate_rows(results: &QueryResults) -> Vec<String> {
    let rows = results.rows();
    let index_width = rows
        .len()
        .saturating_sub(1)
        .to_string()
        .len()
        .max(INDEX_HEADER.len());

    let mut lines = vec![format!("| {} |", pad_right(INDEX_HEADER, index_width))];
    lines.extend(
        (0..rows.len()).map(|idx| format!("| {} |", pad_right(&idx.to_string(), index_width))),
    );

    for header in results.headers() {
        let cell = |row: &std::collections::BTreeMap<String, String>| {
            row.get(header).cloned().unwrap_or_default()
        };
        let width = rows
            .iter()
            .map(|row| cell(row).width())
            .chain(std::iter::once(header.width()))
            .max()
            .unwrap_or(0);
        lines[0].push_str(&format!(" {} |", pad_right(header, width)));
        for (line, row) in lines.iter_mut().skip(1).zip(rows) {
            line.push_str(&format!(" {} |", pad_right(&cell(row), width)));
        }
    }
    lines
}

/// Displays [`State::sql_results`].
pub struct SqlResultsView {
    name: String,
}

impl SqlResultsView {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl View<State, Action> for SqlResultsView {
    fn draw(&self, ctx: &mut DrawContext<'_, State>) -> Result<(), DrawError> {
        let Some(grid) = &ctx.state().sql_results else {
            return Ok(());
        };
        let size = ctx.size();
        let dx = grid.dx.min(grid.max_dx);
        let dy = grid.dy.min(grid.max_dy);
        for (y, row) in grid
            .rows
            .iter()
            .skip(dy)
            .take(usize::from(size.height))
            .enumerate()
        {
            let visible: String = row.chars().skip(dx).take(usize::from(size.width)).collect();
            ctx.print(0, i32::try_from(y).unwrap_or(i32::MAX), &visible, TEXT_STYLE);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn key_bindings(&self) -> Vec<KeyBinding<State, Action>> {
        let scroll = |code: KeyCode, name: &str, action: Action| {
            Binding::key(code, name, move |_, ctx| ctx.store.dispatch(action.clone()))
        };
        let hide = Binding::char('X', "Hide results", |_, ctx| {
            ctx.store.dispatch(Action::HideSqlResults);
        });
        let hide_lower = hide.alias(Trigger::Char('x'));
        vec![
            hide,
            hide_lower,
            scroll(KeyCode::Down, "Scrl Dn", Action::SqlViewScrollDown),
            scroll(KeyCode::Up, "Scrl Up", Action::SqlViewScrollUp),
            scroll(KeyCode::Left, "Scrl Lft", Action::SqlViewScrollLeft),
            scroll(KeyCode::Right, "Scrl Rgt", Action::SqlViewScrollRight),
        ]
    }
}
