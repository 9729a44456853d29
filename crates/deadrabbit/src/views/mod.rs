#![forbid(unsafe_code)]

//! The dashboard's views, their placement and the global key bindings.
//!
//! ```text
//! ╔╡DLQ List╞═══╦╡Message╞══════════════════╗
//! ║0. {"id":1}  ║0: {                       ║
//! ║1. {"id":2}  ║1:     "id": 1             ║
//! ║             ║2: }                       ║
//! ╠╡SQL Results╞╩═══════════════════════════╣
//! ║| # | id | name  |                        ║
//! ╚═════════════════════════════════════════╝
//! [Q]Exit [H]Show Headers [S]SQL [↓]Next msg
//! ```
//!
//! The results panel only exists while query results are held; without it
//! the list and the message take the full height.

pub mod controls;
pub mod message_details;
pub mod message_list;
pub mod query_popups;
pub mod sql_results;

use std::rc::Rc;

use rtui_core::event::KeyCode;
use rtui_core::geometry::{Rect, Size};
use rtui_render::cell::PackedRgba;
use rtui_render::style::Style;
use rtui_widgets::{KeyBinding, Trigger, ViewDescriptor};

pub use controls::ControlsView;
pub use message_details::MessageDetailsView;
pub use message_list::MessageListView;
pub use sql_results::SqlResultsView;

use crate::action::Action;
use crate::state::State;

pub const MESSAGES_LIST: &str = "messages-list";
pub const MESSAGE_DETAILS: &str = "message-details";
pub const SQL_RESULTS: &str = "sql-results";
pub const CONTROLS: &str = "controls";
pub const QUERY_PICKER_POPUP: &str = "query-list-popup";
pub const PARAM_FORM_POPUP: &str = "fill-query-params-popup";

/// Plain text.
pub const TEXT_STYLE: Style = Style::new().fg(PackedRgba::WHITE);
/// Selected rows, the status line and text fields.
pub const SELECTED_STYLE: Style = Style::new().fg(PackedRgba::BLACK).bg(PackedRgba::WHITE);

pub type Binding = KeyBinding<State, Action>;

fn dims(screen: Size) -> (i32, i32) {
    (i32::from(screen.width), i32::from(screen.height))
}

/// Height of the list and message panes.
fn upper_height(h: i32, results_shown: bool) -> i32 {
    if results_shown { (h - 4) / 3 * 2 } else { h - 3 }
}

pub fn list_area(screen: Size, results_shown: bool) -> Rect {
    let (w, h) = dims(screen);
    Rect::from_signed(1, 1, (w - 3) / 3, upper_height(h, results_shown))
}

pub fn details_area(screen: Size, results_shown: bool) -> Rect {
    let (w, h) = dims(screen);
    let list_width = (w - 3) / 3;
    Rect::from_signed(list_width + 2, 1, w - 3 - list_width, upper_height(h, results_shown))
}

pub fn sql_results_area(screen: Size) -> Rect {
    let (w, h) = dims(screen);
    let top = upper_height(h, true) + 2;
    Rect::from_signed(1, top, w - 2, h - top - 2)
}

pub fn controls_area(screen: Size) -> Rect {
    let (w, h) = dims(screen);
    Rect::from_signed(0, h - 1, w, 1)
}

/// `Tab` moves focus along the tab cycle.
pub fn switch_view_binding() -> Binding {
    Binding::key(KeyCode::Tab, "Switch view", |_, ctx| {
        ctx.store.dispatch(Action::FocusNextView);
    })
}

/// Requeue held messages, then ask the dashboard to stop.
fn exit(ctx: &rtui_widgets::BindingContext<State, Action>) {
    if !ctx.store.current().messages.is_empty() {
        ctx.store.dispatch(Action::RequeueMessages);
    }
    ctx.store.dispatch(Action::Exit);
}

/// Bindings active whatever has focus.
pub fn global_bindings() -> Vec<Binding> {
    let quit = Binding::char('Q', "Exit", |_, ctx| exit(ctx));
    let headers = Binding::char('H', "Show Headers", |_, ctx| {
        ctx.store.dispatch(Action::ToggleShowHeaders);
    });
    let sql = Binding::char('S', "SQL", |_, ctx| {
        ctx.store.dispatch(Action::ShowQueriesListPopup);
    });
    vec![
        quit.alias(Trigger::Char('q')),
        quit.alias(Trigger::Key(KeyCode::Escape)),
        quit.alias(Trigger::Ctrl('c')),
        headers.alias(Trigger::Char('h')),
        sql.alias(Trigger::Char('s')),
        quit,
        headers,
        sql,
    ]
}

pub fn list_descriptor(view: Rc<MessageListView>, results_shown: bool) -> ViewDescriptor<State, Action> {
    ViewDescriptor::normal(view, 1, move |screen| list_area(screen, results_shown))
        .with_title("DLQ List")
        .with_external_bindings(vec![switch_view_binding()])
}

pub fn details_descriptor(
    view: Rc<MessageDetailsView>,
    results_shown: bool,
) -> ViewDescriptor<State, Action> {
    ViewDescriptor::normal(view, 2, move |screen| details_area(screen, results_shown))
        .with_title("Message")
        .with_external_bindings(vec![switch_view_binding()])
}

pub fn sql_results_descriptor(view: Rc<SqlResultsView>) -> ViewDescriptor<State, Action> {
    ViewDescriptor::normal(view, 3, sql_results_area)
        .with_title("SQL Results")
        .with_external_bindings(vec![switch_view_binding()])
}

pub fn controls_descriptor(view: Rc<ControlsView>) -> ViewDescriptor<State, Action> {
    ViewDescriptor::normal(view, -1, controls_area)
}
