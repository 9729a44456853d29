//! End-to-end dashboard behavior.
//!
//! Each test builds a [`Dashboard`] over a headless backend, an in-memory
//! broker and a static repository, feeds it key events, and checks the
//! resulting state, focus and rendered screen.

use std::collections::BTreeMap;
use std::io::Write;

use deadrabbit::app::{Dashboard, Services};
use deadrabbit::broker::{DisabledBroker, InMemoryBroker};
use deadrabbit::config;
use deadrabbit::database::{QueryResults, Repositories, Repository, StaticRepository};
use deadrabbit::state::{Message, State};
use deadrabbit::views::{
    MESSAGE_DETAILS, MESSAGES_LIST, PARAM_FORM_POPUP, QUERY_PICKER_POPUP, SQL_RESULTS,
};
use proptest::prelude::*;
use rtui_core::event::{Event, KeyCode, KeyEvent, Modifiers};
use rtui_runtime::{Application, HeadlessBackend};

const CONFIG: &str = "\
rabbitmq:
  host: localhost
  port: 5672
  dlq: orders.dlq
databases:
  - name: shop
    host: localhost
    port: '3306'
    queries:
      - name: orders
        format: select * from orders where id = :id
        params:
          - name: id
            format: '%s'
";

// ── Helpers ─────────────────────────────────────────────────────────────

struct Harness {
    dashboard: Dashboard<HeadlessBackend>,
    broker: InMemoryBroker,
    repository: StaticRepository,
}

fn messages(n: usize) -> Vec<Message> {
    (0..n).map(|i| Message::new(format!("{{\"id\":{i}}}"))).collect()
}

fn harness(queued: Vec<Message>) -> Harness {
    let configuration = config::from_yaml(CONFIG).unwrap();
    let broker = InMemoryBroker::new(queued);
    let repository = StaticRepository::new(QueryResults::new(
        vec!["id".into(), "status".into()],
        vec![BTreeMap::from([
            ("id".to_string(), "42".to_string()),
            ("status".to_string(), "failed".to_string()),
        ])],
    ));
    let mut repositories = Repositories::new();
    repositories.insert("shop".into(), Box::new(repository.clone()) as Box<dyn Repository>);

    let services = Services {
        broker: Box::new(broker.clone()),
        repositories,
    };
    let initial = State::new(false, configuration.query_options());
    let mut dashboard = Dashboard::new(initial, services, HeadlessBackend::new(80, 24)).unwrap();
    dashboard.drain_updates();
    Harness {
        dashboard,
        broker,
        repository,
    }
}

impl Harness {
    fn key(&mut self, key: KeyEvent) {
        self.dashboard.handle_event(Event::Key(key));
        self.dashboard.drain_updates();
    }

    fn press(&mut self, code: KeyCode) {
        self.key(KeyEvent::new(code));
    }

    fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            self.key(KeyEvent::char(c));
        }
    }

    fn state(&self) -> State {
        self.dashboard.store().current()
    }

    fn screen(&self) -> String {
        self.dashboard.backend().screen_lines().join("\n")
    }

    fn focused_view(&self) -> Option<String> {
        self.dashboard
            .layout()
            .borrow()
            .focused()
            .map(|descriptor| descriptor.name().to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Messages
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn first_frame_shows_titles_and_hints() {
    let h = harness(Vec::new());
    let lines = h.dashboard.backend().screen_lines();
    assert_eq!(lines.len(), 24);
    assert!(lines[0].contains("DLQ List"));
    assert!(lines[0].contains("Message"));
    assert!(lines[23].starts_with("[Q]Exit [H]Show Headers [S]SQL [⭾]Switch view [↓]Next msg"));
    assert_eq!(h.focused_view().as_deref(), Some(MESSAGES_LIST));
}

#[test]
fn load_then_next_selects_first_message() {
    let mut h = harness(messages(3));
    h.type_str("L");
    let state = h.state();
    assert_eq!(state.messages.len(), 3);
    assert_eq!(state.selected_message, None);

    h.press(KeyCode::Down);
    assert_eq!(h.state().selected_message, Some(0));
    let lines = h.dashboard.backend().screen_lines();
    assert!(lines[1].starts_with("║0. {\"id\":0}"));
    assert!(lines[1].contains("║0: {"));
    assert!(lines[2].contains("1:     \"id\": 0"));
}

#[test]
fn drop_keeps_selection_valid() {
    let mut h = harness(messages(3));
    h.type_str("l");
    h.press(KeyCode::Down);
    h.press(KeyCode::Down);
    assert_eq!(h.state().selected_message, Some(1));

    h.type_str("D");
    let state = h.state();
    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.selected_message, Some(1));
    assert_eq!(state.messages[1].body, "{\"id\":2}");

    h.type_str("d");
    let state = h.state();
    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.selected_message, Some(0));
}

#[test]
fn headers_toggle_adds_and_removes_section() {
    let mut h = harness(vec![Message::new("{\"k\":1}").with_header("a", "1")]);
    h.type_str("L");
    h.press(KeyCode::Down);
    assert!(!h.screen().contains("a: 1"));

    h.type_str("H");
    let lines = h.dashboard.backend().screen_lines();
    assert!(lines[1].contains("║a: 1"));
    assert!(lines[2].contains("║0: {"));

    h.type_str("h");
    assert!(!h.screen().contains("a: 1"));
}

#[test]
fn exit_requeues_held_messages() {
    let mut h = harness(messages(3));
    h.type_str("L");
    h.type_str("D");
    assert!(h.broker.pending().is_empty());

    h.type_str("q");
    assert!(h.dashboard.should_quit());
    assert_eq!(h.broker.pending().len(), 3);
}

#[test]
fn ctrl_c_exits() {
    let mut h = harness(Vec::new());
    h.key(KeyEvent::char('c').with_modifiers(Modifiers::CTRL));
    assert!(h.dashboard.should_quit());
    assert!(h.broker.pending().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// Focus and popups
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn tab_cycles_between_panes() {
    let mut h = harness(Vec::new());
    h.press(KeyCode::Tab);
    assert_eq!(h.focused_view().as_deref(), Some(MESSAGE_DETAILS));
    h.press(KeyCode::Tab);
    assert_eq!(h.focused_view().as_deref(), Some(MESSAGES_LIST));
}

#[test]
fn query_picker_pushes_and_pops_focus() {
    let mut h = harness(Vec::new());
    h.press(KeyCode::Tab);

    h.type_str("S");
    let state = h.state();
    assert_eq!(state.focus.top(), QUERY_PICKER_POPUP);
    assert_eq!(state.focus.len(), 2);
    assert_eq!(h.focused_view().as_deref(), Some(QUERY_PICKER_POPUP));
    assert!(!state.app_actions.iter().any(|hint| hint == "[⭾]Switch view"));
    assert!(h.screen().contains("Select a query to run"));
    assert!(h.screen().contains("[X] shop: orders"));

    // Tab picks a popup control instead of switching panes.
    h.press(KeyCode::Tab);
    assert_eq!(h.state().focus.top(), QUERY_PICKER_POPUP);

    h.type_str("s");
    let state = h.state();
    assert_eq!(state.focus.top(), MESSAGE_DETAILS);
    assert_eq!(state.focus.len(), 1);
    assert_eq!(h.focused_view().as_deref(), Some(MESSAGE_DETAILS));
    assert!(state.app_actions.iter().any(|hint| hint == "[⭾]Switch view"));
    assert!(!h.screen().contains("Select a query to run"));
}

#[test]
fn cancel_closes_the_picker() {
    let mut h = harness(Vec::new());
    h.type_str("S");
    h.press(KeyCode::Tab);
    h.press(KeyCode::Enter);
    let state = h.state();
    assert_eq!(state.focus.top(), MESSAGES_LIST);
    assert!(!h.dashboard.layout().borrow().has_overlay());
}

// ═══════════════════════════════════════════════════════════════════════════
// SQL
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn query_runs_with_typed_params_and_shows_results() {
    let mut h = harness(Vec::new());
    h.type_str("S");
    h.press(KeyCode::Tab);
    h.press(KeyCode::Tab);
    h.press(KeyCode::Enter);

    let state = h.state();
    assert_eq!(state.focus.top(), PARAM_FORM_POPUP);
    assert!(state.input_mode());
    assert!(!state.app_actions.iter().any(|hint| hint == "[Q]Exit"));
    assert!(state.app_actions.iter().any(|hint| hint == "[⌫]Delete"));

    // Shortcut letters are text while the form is open.
    h.type_str("4q");
    h.press(KeyCode::Backspace);
    h.type_str("2");
    assert!(!h.dashboard.should_quit());
    assert!(h.screen().contains("id:42"));

    h.press(KeyCode::Tab);
    h.press(KeyCode::Tab);
    h.press(KeyCode::Enter);

    let recorded = h.repository.queries();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, "select * from orders where id = :id");
    assert_eq!(recorded[0].1.get("id").map(String::as_str), Some("42"));

    let state = h.state();
    assert!(!state.input_mode());
    assert_eq!(state.focus.top(), MESSAGES_LIST);
    assert!(h.dashboard.layout().borrow().contains(SQL_RESULTS));
    let lines = h.dashboard.backend().screen_lines();
    assert!(lines[13].contains("SQL Results"));
    assert!(lines[14].starts_with("║| # | id | status |"));
    assert!(lines[15].starts_with("║| 0 | 42 | failed |"));
}

#[test]
fn hiding_results_returns_focus_to_the_list() {
    let mut h = harness(Vec::new());
    h.type_str("S");
    h.press(KeyCode::Tab);
    h.press(KeyCode::Tab);
    h.press(KeyCode::Enter);
    h.type_str("1");
    h.press(KeyCode::Tab);
    h.press(KeyCode::Tab);
    h.press(KeyCode::Enter);

    h.press(KeyCode::Tab);
    h.press(KeyCode::Tab);
    assert_eq!(h.focused_view().as_deref(), Some(SQL_RESULTS));

    h.press(KeyCode::Right);
    assert_eq!(h.state().sql_results.map(|grid| grid.dx), Some(1));

    h.type_str("x");
    let state = h.state();
    assert!(state.sql_results.is_none());
    assert_eq!(state.focus.top(), MESSAGES_LIST);
    assert_eq!(h.focused_view().as_deref(), Some(MESSAGES_LIST));
    assert!(!h.dashboard.layout().borrow().contains(SQL_RESULTS));
    assert!(!h.screen().contains("SQL Results"));
}

// ═══════════════════════════════════════════════════════════════════════════
// Transport failures
// ═══════════════════════════════════════════════════════════════════════════

fn offline_dashboard() -> Dashboard<HeadlessBackend> {
    let configuration = config::from_yaml(CONFIG).unwrap();
    let services = Services {
        broker: Box::new(DisabledBroker::new("offline")),
        repositories: Repositories::new(),
    };
    let initial = State::new(false, configuration.query_options());
    let mut dashboard = Dashboard::new(initial, services, HeadlessBackend::new(80, 24)).unwrap();
    dashboard.drain_updates();
    dashboard
}

fn is_clock(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 8
        && bytes[2] == b':'
        && bytes[5] == b':'
        && [0, 1, 3, 4, 6, 7].iter().all(|&i| bytes[i].is_ascii_digit())
}

#[test]
fn load_without_broker_shows_timestamped_notification() {
    let mut dashboard = offline_dashboard();
    dashboard.handle_event(Event::Key(KeyEvent::char('L')));
    dashboard.drain_updates();

    let state = dashboard.store().current();
    assert!(state.messages.is_empty());
    let note = state.notification.expect("load failure is reported");
    assert_eq!(note.text, "Failed to load messages: broker unavailable: offline");

    let status = dashboard.backend().screen_lines()[23].clone();
    let prefix = "Failed to load messages: broker unavailable: offline (";
    let start = status.find(prefix).expect("notification on the status line");
    let tail = &status[start + prefix.len()..];
    assert!(tail.ends_with(')'), "{status:?}");
    assert!(is_clock(&tail[..tail.len() - 1]), "{status:?}");
    assert!(status.starts_with("[Q]Exit"));

    // The dashboard stays usable after the failure.
    dashboard.handle_event(Event::Key(KeyEvent::char('q')));
    dashboard.drain_updates();
    assert!(dashboard.should_quit());
}

#[test]
fn query_against_unconnected_database_is_reported() {
    let mut dashboard = offline_dashboard();
    for key in [
        KeyEvent::char('S'),
        KeyEvent::new(KeyCode::Tab),
        KeyEvent::new(KeyCode::Tab),
        KeyEvent::new(KeyCode::Enter),
        KeyEvent::new(KeyCode::Tab),
        KeyEvent::new(KeyCode::Tab),
        KeyEvent::new(KeyCode::Enter),
    ] {
        dashboard.handle_event(Event::Key(key));
        dashboard.drain_updates();
    }

    let state = dashboard.store().current();
    assert!(state.sql_results.is_none());
    let note = state.notification.expect("missing database is reported");
    assert!(note.text.contains("shop"), "{:?}", note.text);
    assert_eq!(state.focus.top(), MESSAGES_LIST);
}

// ═══════════════════════════════════════════════════════════════════════════
// Terminal and configuration
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn resize_relayouts_the_next_frame() {
    let mut h = harness(Vec::new());
    h.dashboard.handle_event(Event::Resize {
        width: 40,
        height: 12,
    });
    h.dashboard.drain_updates();
    let lines = h.dashboard.backend().screen_lines();
    assert_eq!(lines.len(), 12);
    assert_eq!(lines[0].chars().count(), 40);
}

#[test]
fn configuration_file_feeds_the_query_picker() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    let configuration = config::load(file.path()).unwrap();
    assert_eq!(configuration.rabbitmq.port, "5672");
    assert_eq!(configuration.databases[0].port, "3306");
    let options = configuration.query_options();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].text, "shop: orders");
    assert_eq!(options[0].query.params[0].format, "%s");
}

// ═══════════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════════

fn key_strategy() -> impl Strategy<Value = KeyEvent> {
    prop_oneof![
        Just(KeyEvent::new(KeyCode::Down)),
        Just(KeyEvent::new(KeyCode::Up)),
        Just(KeyEvent::new(KeyCode::Left)),
        Just(KeyEvent::new(KeyCode::Right)),
        Just(KeyEvent::new(KeyCode::Tab)),
        Just(KeyEvent::new(KeyCode::Enter)),
        Just(KeyEvent::new(KeyCode::Backspace)),
        Just(KeyEvent::char('L')),
        Just(KeyEvent::char('D')),
        Just(KeyEvent::char('H')),
        Just(KeyEvent::char('S')),
        Just(KeyEvent::char('x')),
        Just(KeyEvent::char('7')),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn focus_and_selection_stay_consistent(keys in proptest::collection::vec(key_strategy(), 1..40)) {
        let mut h = harness(messages(4));
        for key in keys {
            h.key(key);
            let state = h.state();
            prop_assert_eq!(h.focused_view(), Some(state.focus.top().to_string()));
            let focused = h
                .dashboard
                .layout()
                .borrow()
                .views()
                .filter(|descriptor| descriptor.focused)
                .count();
            prop_assert_eq!(focused, 1);
            if let Some(selected) = state.selected_message {
                prop_assert!(selected < state.messages.len());
            }
            prop_assert_eq!(state.messages.len() + h.broker.pending().len() <= 4, true);
        }
    }
}
