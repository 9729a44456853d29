#![forbid(unsafe_code)]

//! The dashboard state held by the store.
//!
//! Every field here is plain data: the store clones a snapshot for each
//! subscriber after every dispatch, and the views render from that
//! snapshot. Connections to the broker and databases live with the domain
//! reducer, never in the state.

use std::collections::BTreeMap;
use chrono::{DateTime, Local};
use rtui_widgets::FocusStack;

use crate::database::QueryResults;
use crate::views::{MESSAGES_LIST, PARAM_FORM_POPUP};

/// A dead-lettered message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Raw payload, expected to be JSON.
    pub body: String,
    /// AMQP headers, sorted by key.
    pub headers: BTreeMap<String, serde_json::Value>,
}

impl Message {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// A short message for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub at: DateTime<Local>,
}

impl Notification {
    pub fn now(text: impl Into<String>) -> Self {
        Self::at(text, Local::now())
    }

    pub fn at(text: impl Into<String>, at: DateTime<Local>) -> Self {
        Self { text: text.into(), at }
    }

    /// `"text (HH:MM:SS)"` in local time.
    pub fn display(&self) -> String {
        format!("{} ({})", self.text, self.at.format("%H:%M:%S"))
    }
}

/// One named query parameter and the text typed for it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
    /// printf-style template applied to `value` before the query runs.
    pub format: String,
}

/// A configured query ready to be parameterized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryContext {
    /// Name of the database the query runs against.
    pub database: String,
    pub name: String,
    /// SQL with `:name` placeholders.
    pub query: String,
    pub params: Vec<QueryParam>,
}

/// One entry of the query picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableOption {
    pub text: String,
    pub query: QueryContext,
}

/// Query picker state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPicker {
    pub text: String,
    pub options: Vec<SelectableOption>,
    pub selected: usize,
}

impl QueryPicker {
    pub fn new(options: Vec<SelectableOption>) -> Self {
        Self {
            text: "Choose a query to run".into(),
            options,
            selected: 0,
        }
    }
}

/// Parameter form state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamForm {
    pub query: Option<QueryContext>,
    pub selected_param: usize,
}

/// Scroll position over the formatted result grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SqlResultsGrid {
    pub dx: usize,
    pub dy: usize,
    pub max_dx: usize,
    pub max_dy: usize,
    pub rows: Vec<String>,
}

/// Where typed characters go while a text field is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputTarget {
    /// The popup owning the field.
    pub popup: String,
    pub field: usize,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone)]
pub struct State {
    pub debug: bool,
    /// `Some` while typed characters go to a text field.
    pub input_target: Option<InputTarget>,
    pub messages: Vec<Message>,
    pub selected_message: Option<usize>,
    pub notification: Option<Notification>,
    /// Hint bar labels for the focused view.
    pub app_actions: Vec<String>,
    pub show_headers: bool,
    pub focus: FocusStack,
    pub query_picker: QueryPicker,
    pub param_form: ParamForm,
    pub database_outputs: Option<QueryResults>,
    pub sql_results: Option<SqlResultsGrid>,
    pub exit_requested: bool,
}

impl State {
    /// Initial state with the message list focused.
    pub fn new(debug: bool, query_options: Vec<SelectableOption>) -> Self {
        Self {
            debug,
            input_target: None,
            messages: Vec::new(),
            selected_message: None,
            notification: None,
            app_actions: Vec::new(),
            show_headers: false,
            focus: FocusStack::new(MESSAGES_LIST),
            query_picker: QueryPicker::new(query_options),
            param_form: ParamForm::default(),
            database_outputs: None,
            sql_results: None,
            exit_requested: false,
        }
    }

    pub fn input_mode(&self) -> bool {
        self.input_target.is_some()
    }

    pub fn selected(&self) -> Option<&Message> {
        self.selected_message.and_then(|idx| self.messages.get(idx))
    }

    /// Route typed characters to the selected parameter field.
    pub fn start_param_input(&mut self) {
        self.input_target = Some(InputTarget {
            popup: PARAM_FORM_POPUP.to_string(),
            field: self.param_form.selected_param,
        });
    }

    /// The parameter typed characters currently edit.
    pub fn input_param_mut(&mut self) -> Option<&mut QueryParam> {
        let field = self.input_target.as_ref()?.field;
        self.param_form.query.as_mut()?.params.get_mut(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn initial_state_focuses_the_list() {
        let state = State::new(false, Vec::new());
        assert_eq!(state.focus.top(), MESSAGES_LIST);
        assert_eq!(state.selected_message, None);
        assert!(!state.input_mode());
    }

    #[test]
    fn notification_shows_local_wall_clock() {
        let at = Local.with_ymd_and_hms(2024, 5, 6, 13, 4, 5).single().unwrap();
        assert_eq!(Notification::at("oops", at).display(), "oops (13:04:05)");
    }

    #[test]
    fn fresh_notification_has_a_clock_suffix() {
        let shown = Notification::now("down").display();
        let clock = shown.strip_prefix("down (").and_then(|rest| rest.strip_suffix(')')).unwrap();
        assert_eq!(clock.len(), 8);
        assert!(chrono::NaiveTime::parse_from_str(clock, "%H:%M:%S").is_ok());
    }

    #[test]
    fn input_param_follows_target() {
        let mut state = State::new(false, Vec::new());
        state.param_form.query = Some(QueryContext {
            params: vec![QueryParam::default(), QueryParam::default()],
            ..QueryContext::default()
        });
        assert!(state.input_param_mut().is_none());
        state.param_form.selected_param = 1;
        state.start_param_input();
        if let Some(param) = state.input_param_mut() {
            param.value.push('x');
        }
        let params = &state.param_form.query.as_ref().unwrap().params;
        assert_eq!(params[1].value, "x");
        assert_eq!(params[0].value, "");
    }
}
