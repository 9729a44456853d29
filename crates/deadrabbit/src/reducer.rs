#![forbid(unsafe_code)]

//! State transitions.
//!
//! Three reducers run for every action, in this order:
//!
//! 1. [`DomainReducer`] owns the broker and database connections and
//!    handles messages, query selection, SQL results and exit.
//! 2. [`input_reducer`] edits the active text field while
//!    [`State::input_target`] is set.
//! 3. [`LayoutReducer`] reshapes the view registry: focus changes, popups,
//!    the results panel. It runs last and recomputes the hint bar from the
//!    final focus and input mode.
//!
//! Broker and database calls run inline on the UI thread. Their failures
//! become a status line notification and never abort a dispatch.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rtui_runtime::WeakStore;
use rtui_widgets::{Layout, ViewDescriptor};

use crate::action::Action;
use crate::broker::Broker;
use crate::database::{DatabaseError, Repositories, format_param};
use crate::state::{Notification, ParamForm, SqlResultsGrid, State};
use crate::views::query_popups::{param_form, param_form_bindings, query_picker, query_picker_bindings};
use crate::views::sql_results::calculate_rows;
use crate::views::{
    self, MESSAGE_DETAILS, MESSAGES_LIST, PARAM_FORM_POPUP, QUERY_PICKER_POPUP, SQL_RESULTS,
    SqlResultsView, details_area, list_area,
};

fn notify(state: &mut State, text: String) {
    state.notification = Some(Notification::now(text));
}

// ═══════════════════════════════════════════════════════════════════════════
// Domain
// ═══════════════════════════════════════════════════════════════════════════

/// Messages, queries and exit.
pub struct DomainReducer {
    broker: Box<dyn Broker>,
    repositories: Repositories,
}

impl DomainReducer {
    pub fn new(broker: Box<dyn Broker>, repositories: Repositories) -> Self {
        Self {
            broker,
            repositories,
        }
    }

    pub fn reduce(&mut self, state: &mut State, action: &Action) {
        match action {
            Action::NextMessage => {
                let next = state.selected_message.map_or(0, |idx| idx + 1);
                if next < state.messages.len() {
                    state.selected_message = Some(next);
                }
            }
            Action::PrevMessage => {
                if let Some(idx) = state.selected_message
                    && idx > 0
                {
                    state.selected_message = Some(idx - 1);
                }
            }
            Action::LoadMessages => {
                if self.requeue(state) {
                    self.load(state);
                }
            }
            Action::RequeueMessages => {
                self.requeue(state);
            }
            Action::ToggleShowHeaders => state.show_headers = !state.show_headers,
            Action::DropMessage(idx) => drop_message(state, *idx),
            Action::ShowQueriesListPopup => {
                if !state.focus.contains(QUERY_PICKER_POPUP) {
                    state.query_picker.selected = 0;
                }
            }
            Action::QueriesListNextOption => {
                let picker = &mut state.query_picker;
                if picker.selected + 1 < picker.options.len() {
                    picker.selected += 1;
                }
            }
            Action::QueriesListPrevOption => {
                let picker = &mut state.query_picker;
                picker.selected = picker.selected.saturating_sub(1);
            }
            Action::ShowFillQueryParamsPopup => {
                if !state.focus.contains(PARAM_FORM_POPUP) {
                    pick_query(state);
                }
            }
            Action::FillQueryParamsNextField => {
                let count = state.param_form.query.as_ref().map_or(0, |query| query.params.len());
                if state.param_form.selected_param + 1 < count {
                    state.param_form.selected_param += 1;
                }
                follow_selected_param(state);
            }
            Action::FillQueryParamsPrevField => {
                state.param_form.selected_param = state.param_form.selected_param.saturating_sub(1);
                follow_selected_param(state);
            }
            Action::StartInputMode => {
                if state.param_form.query.is_some() {
                    state.start_param_input();
                }
            }
            Action::StopInputMode => state.input_target = None,
            Action::RunSqlQuery => self.run_query(state),
            Action::HideSqlResults => {
                state.database_outputs = None;
                state.sql_results = None;
            }
            Action::SqlViewScrollDown => {
                if let Some(grid) = &mut state.sql_results
                    && grid.dy < grid.max_dy
                {
                    grid.dy += 1;
                }
            }
            Action::SqlViewScrollUp => {
                if let Some(grid) = &mut state.sql_results {
                    grid.dy = grid.dy.saturating_sub(1);
                }
            }
            Action::SqlViewScrollRight => {
                if let Some(grid) = &mut state.sql_results
                    && grid.dx < grid.max_dx
                {
                    grid.dx += 1;
                }
            }
            Action::SqlViewScrollLeft => {
                if let Some(grid) = &mut state.sql_results {
                    grid.dx = grid.dx.saturating_sub(1);
                }
            }
            Action::Exit => {
                tracing::info!("exit requested");
                state.exit_requested = true;
            }
            Action::FocusView(_)
            | Action::FocusNextView
            | Action::HidePopup
            | Action::Input(_)
            | Action::InputBackspace => {}
        }
    }

    /// Publish held messages back to the DLQ.
    ///
    /// Returns `false` when they could not be published; the messages stay
    /// in the list so nothing is lost.
    fn requeue(&mut self, state: &mut State) -> bool {
        if state.messages.is_empty() {
            return true;
        }
        match self.broker.publish(&state.messages) {
            Ok(()) => {
                tracing::info!(count = state.messages.len(), "messages requeued");
                state.messages.clear();
                state.selected_message = None;
                true
            }
            Err(err) => {
                tracing::warn!(%err, "failed to requeue messages");
                notify(state, format!("Failed to requeue messages: {err}"));
                false
            }
        }
    }

    fn load(&mut self, state: &mut State) {
        match self.broker.load_messages() {
            Ok(messages) => {
                tracing::info!(count = messages.len(), "messages loaded");
                state.messages = messages;
                state.selected_message = None;
                state.notification = None;
            }
            Err(err) => {
                tracing::warn!(%err, "failed to load messages");
                notify(state, format!("Failed to load messages: {err}"));
            }
        }
    }

    fn run_query(&mut self, state: &mut State) {
        let Some(query) = state.param_form.query.clone() else {
            tracing::warn!("no query to run");
            return;
        };
        let params: HashMap<String, String> = query
            .params
            .iter()
            .map(|param| (param.name.clone(), format_param(&param.format, &param.value)))
            .collect();

        let outcome = match self.repositories.get_mut(&query.database) {
            Some(repository) => repository.query(&query.query, &params),
            None => Err(DatabaseError::UnknownDatabase(query.database.clone())),
        };
        match outcome {
            Ok(results) => {
                tracing::info!(query = %query.name, rows = results.rows().len(), "query finished");
                let rows = calculate_rows(&results);
                state.sql_results = Some(SqlResultsGrid {
                    dx: 0,
                    dy: 0,
                    max_dx: rows.first().map_or(0, |row| row.chars().count().saturating_sub(1)),
                    max_dy: rows.len().saturating_sub(1),
                    rows,
                });
                state.database_outputs = Some(results);
            }
            Err(err) => {
                tracing::error!(query = %query.name, %err, "query failed");
                notify(state, format!("Query {} failed: {err}", query.name));
            }
        }
    }
}

fn drop_message(state: &mut State, idx: usize) {
    if idx >= state.messages.len() {
        tracing::warn!(idx, len = state.messages.len(), "drop of a missing message ignored");
        return;
    }
    state.messages.remove(idx);
    let len = state.messages.len();
    if let Some(selected) = state.selected_message
        && selected >= len
    {
        state.selected_message = len.checked_sub(1);
    }
}

/// Load the picked query into the parameter form.
fn pick_query(state: &mut State) {
    let picked = state
        .query_picker
        .options
        .get(state.query_picker.selected)
        .map(|option| option.query.clone());
    if picked.is_none() {
        tracing::warn!("no query configured");
        notify(state, "No queries configured".to_string());
    }
    state.param_form = ParamForm {
        query: picked,
        selected_param: 0,
    };
}

fn follow_selected_param(state: &mut State) {
    let selected = state.param_form.selected_param;
    if let Some(target) = &mut state.input_target {
        target.field = selected;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Text input
// ═══════════════════════════════════════════════════════════════════════════

/// Edits the field named by [`State::input_target`]; without a target the
/// input actions do nothing.
pub fn input_reducer(state: &mut State, action: &Action) {
    match action {
        Action::Input(c) => match state.input_param_mut() {
            Some(param) => param.value.push(*c),
            None => tracing::trace!(ch = %c, "input without a target"),
        },
        Action::InputBackspace => {
            if let Some(param) = state.input_param_mut() {
                param.value.pop();
            }
        }
        _ => {}
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Layout
// ═══════════════════════════════════════════════════════════════════════════

/// Keeps the view registry and the focus stack in step with the state.
pub struct LayoutReducer {
    layout: Rc<RefCell<Layout<State, Action>>>,
    store: WeakStore<State, Action>,
    sql_results: Rc<SqlResultsView>,
}

impl LayoutReducer {
    pub fn new(layout: Rc<RefCell<Layout<State, Action>>>, store: WeakStore<State, Action>) -> Self {
        Self {
            layout,
            store,
            sql_results: Rc::new(SqlResultsView::new(SQL_RESULTS)),
        }
    }

    pub fn reduce(&mut self, state: &mut State, action: &Action) {
        let mut layout = self.layout.borrow_mut();
        match action {
            Action::FocusView(name) => {
                if layout.contains(name) {
                    state.focus.replace_top(name.as_str());
                } else {
                    tracing::warn!(view = %name, "focus on an unknown view ignored");
                }
            }
            // Popups are left through their controls, never by tabbing.
            Action::FocusNextView if !layout.has_overlay() => {
                match layout.focus_next(state.focus.top()) {
                    Some(next) => self.dispatch(Action::FocusView(next)),
                    None => tracing::warn!(current = state.focus.top(), "no view to focus next"),
                }
            }
            Action::ShowQueriesListPopup => {
                if layout.contains(QUERY_PICKER_POPUP) {
                    close_popups(&mut layout, state);
                } else {
                    close_popups(&mut layout, state);
                    layout.insert(
                        ViewDescriptor::overlay(Rc::new(query_picker()))
                            .with_external_bindings(query_picker_bindings()),
                    );
                    state.focus.push(QUERY_PICKER_POPUP);
                }
            }
            Action::ShowFillQueryParamsPopup => {
                let was_open = layout.contains(PARAM_FORM_POPUP);
                close_popups(&mut layout, state);
                if !was_open && state.param_form.query.is_some() {
                    layout.insert(
                        ViewDescriptor::overlay(Rc::new(param_form()))
                            .with_external_bindings(param_form_bindings()),
                    );
                    state.focus.push(PARAM_FORM_POPUP);
                    state.start_param_input();
                }
            }
            Action::HidePopup => close_popups(&mut layout, state),
            _ => {}
        }

        self.sync_results_panel(&mut layout, state.database_outputs.is_some());

        // A closed panel hands focus to the start of the tab cycle.
        let top = state.focus.top().to_string();
        if !layout.contains(&top)
            && let Some(next) = layout.focus_next(&top)
        {
            tracing::debug!(from = %top, to = %next, "focused view is gone");
            state.focus.replace_top(next);
        }
        if let Some(target) = &state.input_target
            && !layout.contains(&target.popup)
        {
            state.input_target = None;
        }

        layout.sync_focus(state.focus.top());
        state.app_actions = layout.action_hints(state.focus.top(), state.input_mode());
    }

    fn dispatch(&self, action: Action) {
        match self.store.upgrade() {
            Some(store) => store.dispatch(action),
            None => tracing::warn!(?action, "store is gone"),
        }
    }

    /// Show the results panel while results are held and size the upper
    /// panes to fit.
    fn sync_results_panel(&self, layout: &mut Layout<State, Action>, shown: bool) {
        match (shown, layout.contains(SQL_RESULTS)) {
            (true, false) => layout.insert(views::sql_results_descriptor(Rc::clone(&self.sql_results))),
            (false, true) => {
                layout.remove(SQL_RESULTS);
            }
            _ => {}
        }
        if let Some(list) = layout.get_mut(MESSAGES_LIST) {
            list.geometry = Rc::new(move |screen| list_area(screen, shown));
        }
        if let Some(details) = layout.get_mut(MESSAGE_DETAILS) {
            details.geometry = Rc::new(move |screen| details_area(screen, shown));
        }
    }
}

/// Remove every popup and pop each off the focus stack.
fn close_popups(layout: &mut Layout<State, Action>, state: &mut State) {
    for name in layout.remove_overlays() {
        if state.focus.top() == name {
            state.focus.pop();
        } else {
            tracing::warn!(popup = %name, top = state.focus.top(), "closed popup was not focused");
        }
    }
}
