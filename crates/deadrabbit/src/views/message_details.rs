#![forbid(unsafe_code)]

//! Headers and pretty-printed body of the selected message.

use std::rc::Rc;

use rtui_core::collections::pairs;
use rtui_core::event::KeyCode;
use rtui_widgets::text::split_by_length;
use rtui_widgets::{DrawContext, DrawError, KeyBinding, ScrollableLine, ScrollableView, View};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::{Binding, TEXT_STYLE};
use crate::action::Action;
use crate::state::{Message, State};

pub struct MessageDetailsView {
    name: String,
    scroll: Rc<ScrollableView>,
}

impl MessageDetailsView {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scroll: Rc::new(ScrollableView::new()),
        }
    }

    pub fn offset(&self) -> usize {
        self.scroll.offset()
    }
}

/// The body re-indented with four spaces, or an inline error when it is
/// not JSON.
pub fn pretty_body(body: &str) -> String {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => return format!("Can't parse message; err: {err}"),
    };
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(err) => format!("Can't parse message; err: {err}"),
    }
}

fn header_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The lines shown for `message` at `width` columns.
///
/// With headers on, each header comes first as `key: value` with keys
/// right-aligned; wrapped values line up after the colon. Body lines are
/// numbered and wrapped under a two-space indent.
pub fn detail_lines(message: &Message, show_headers: bool, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    if show_headers && !message.headers.is_empty() {
        let longest = message
            .headers
            .keys()
            .map(|key| key.chars().count())
            .max()
            .unwrap_or(0);
        let prefix = " ".repeat(longest + 2);
        for header in pairs(&message.headers) {
            let line = format!("{:>longest$}: {}", header.first, header_value(&header.second));
            lines.extend(split_by_length(&line, width, &prefix));
        }
    }

    let body = pretty_body(&message.body);
    let body_lines: Vec<&str> = body.lines().collect();
    let number_width = body_lines.len().saturating_sub(1).to_string().len();
    for (idx, line) in body_lines.iter().enumerate() {
        let numbered = format!("{idx:>number_width$}: {line}");
        lines.extend(split_by_length(&numbered, width, "  "));
    }
    lines
}

impl View<State, Action> for MessageDetailsView {
    fn draw(&self, ctx: &mut DrawContext<'_, State>) -> Result<(), DrawError> {
        let state = ctx.state();
        let Some(message) = state.selected() else {
            return Ok(());
        };
        let lines: Vec<ScrollableLine> =
            detail_lines(message, state.show_headers, usize::from(ctx.size().width))
                .into_iter()
                .map(|line| ScrollableLine::new(line, TEXT_STYLE))
                .collect();
        self.scroll.render(&lines, ctx);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn key_bindings(&self) -> Vec<KeyBinding<State, Action>> {
        let scroll = Rc::clone(&self.scroll);
        let down = Binding::key(KeyCode::Down, "Scroll down", move |_, ctx| {
            if scroll.scroll_down() {
                ctx.store.refresh();
            }
        });
        let scroll = Rc::clone(&self.scroll);
        let up = Binding::key(KeyCode::Up, "Scroll up", move |_, ctx| {
            if scroll.scroll_up() {
                ctx.store.refresh();
            }
        });
        vec![down, up]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_reindented() {
        assert_eq!(pretty_body(r#"{"a":1}"#), "{\n    \"a\": 1\n}");
    }

    #[test]
    fn malformed_body_renders_error_text() {
        assert!(pretty_body("not json").starts_with("Can't parse message; err: "));
    }

    #[test]
    fn body_lines_are_numbered() {
        let lines = detail_lines(&Message::new(r#"{"a":1}"#), false, 40);
        assert_eq!(lines, vec!["0: {", "1:     \"a\": 1", "2: }"]);
    }

    #[test]
    fn number_width_follows_body_length() {
        let body = format!("[{}]", vec!["1"; 12].join(","));
        let lines = detail_lines(&Message::new(body), false, 40);
        assert_eq!(lines.len(), 14);
        assert_eq!(lines[0], " 0: [");
        assert_eq!(lines[13], "13: ]");
    }

    #[test]
    fn headers_come_first_and_align() {
        let message = Message::new("{}")
            .with_header("x-death", "rejected")
            .with_header("id", 7);
        let lines = detail_lines(&message, true, 40);
        assert_eq!(lines[0], "     id: 7");
        assert_eq!(lines[1], "x-death: rejected");
        assert_eq!(lines[2], "0: {}");

        let hidden = detail_lines(&message, false, 40);
        assert_eq!(hidden, vec!["0: {}"]);
    }

    #[test]
    fn long_lines_wrap_under_indent() {
        let lines = detail_lines(&Message::new(r#""abcdefghij""#), false, 8);
        assert_eq!(lines, vec!["0: \"abcd", "  efghij", "  \""]);
    }
}
