#![forbid(unsafe_code)]

//! Input events as the dashboard sees them.
//!
//! Only key presses and resizes reach the application. Everything else the
//! terminal reports (mouse, paste, focus, key releases, keys no binding
//! uses) is dropped in [`Event::from_crossterm`].

use bitflags::bitflags;
use crossterm::event as cte;

/// An input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press or auto-repeat.
    Key(KeyEvent),

    /// The terminal now has `width` columns and `height` rows.
    Resize { width: u16, height: u16 },
}

impl Event {
    /// Translate a crossterm event, or `None` when nothing consumes it.
    #[must_use]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) if key.kind != cte::KeyEventKind::Release => {
                let code = KeyCode::from_crossterm(key.code)?;
                Some(Event::Key(KeyEvent {
                    code,
                    modifiers: Modifiers::from_crossterm(key.modifiers),
                }))
            }
            cte::Event::Resize(width, height) => Some(Event::Resize { width, height }),
            _ => None,
        }
    }
}

/// A key and the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// An unmodified character key.
    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// The character this key types into a text field.
    ///
    /// Ctrl and Alt chords are commands, so they type nothing.
    #[must_use]
    pub fn text_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }
}

/// The keys the dashboard binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

impl KeyCode {
    fn from_crossterm(code: cte::KeyCode) -> Option<Self> {
        Some(match code {
            cte::KeyCode::Char(c) => KeyCode::Char(c),
            cte::KeyCode::Enter => KeyCode::Enter,
            cte::KeyCode::Esc => KeyCode::Escape,
            cte::KeyCode::Backspace => KeyCode::Backspace,
            cte::KeyCode::Tab => KeyCode::Tab,
            cte::KeyCode::Up => KeyCode::Up,
            cte::KeyCode::Down => KeyCode::Down,
            cte::KeyCode::Left => KeyCode::Left,
            cte::KeyCode::Right => KeyCode::Right,
            _ => return None,
        })
    }

    /// How the key is written in the hint bar.
    #[must_use]
    pub fn glyph(&self) -> String {
        let glyph = match self {
            KeyCode::Char(c) => return c.to_string(),
            KeyCode::Enter => "↵",
            KeyCode::Escape => "Esc",
            KeyCode::Backspace => "⌫",
            KeyCode::Tab => "⭾",
            KeyCode::Up => "↑",
            KeyCode::Down => "↓",
            KeyCode::Left => "←",
            KeyCode::Right => "→",
        };
        glyph.to_string()
    }
}

bitflags! {
    /// Modifiers that turn a character key into a command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE = 0;
        const ALT  = 0b01;
        const CTRL = 0b10;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl Modifiers {
    fn from_crossterm(modifiers: cte::KeyModifiers) -> Self {
        let mut mapped = Modifiers::NONE;
        if modifiers.contains(cte::KeyModifiers::CONTROL) {
            mapped |= Modifiers::CTRL;
        }
        if modifiers.intersects(cte::KeyModifiers::ALT | cte::KeyModifiers::META) {
            mapped |= Modifiers::ALT;
        }
        mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crossterm_key(code: cte::KeyCode, modifiers: cte::KeyModifiers) -> cte::Event {
        cte::Event::Key(cte::KeyEvent::new(code, modifiers))
    }

    #[test]
    fn text_char_ignores_chords() {
        assert_eq!(KeyEvent::char('a').text_char(), Some('a'));
        assert_eq!(KeyEvent::char('c').with_modifiers(Modifiers::CTRL).text_char(), None);
        assert_eq!(KeyEvent::char('x').with_modifiers(Modifiers::ALT).text_char(), None);
        assert_eq!(KeyEvent::new(KeyCode::Enter).text_char(), None);
    }

    #[test]
    fn ctrl_c_keeps_its_modifier() {
        let event = Event::from_crossterm(crossterm_key(
            cte::KeyCode::Char('c'),
            cte::KeyModifiers::CONTROL | cte::KeyModifiers::SHIFT,
        ));
        let Some(Event::Key(key)) = event else {
            panic!("expected a key event");
        };
        assert_eq!(key.code, KeyCode::Char('c'));
        assert!(key.ctrl());
    }

    #[test]
    fn escape_and_resize_map() {
        assert_eq!(
            Event::from_crossterm(crossterm_key(cte::KeyCode::Esc, cte::KeyModifiers::NONE)),
            Some(Event::Key(KeyEvent::new(KeyCode::Escape)))
        );
        assert_eq!(
            Event::from_crossterm(cte::Event::Resize(80, 24)),
            Some(Event::Resize { width: 80, height: 24 })
        );
    }

    #[test]
    fn releases_and_unbound_input_are_dropped() {
        let release = cte::KeyEvent::new_with_kind(
            cte::KeyCode::Char('a'),
            cte::KeyModifiers::NONE,
            cte::KeyEventKind::Release,
        );
        assert_eq!(Event::from_crossterm(cte::Event::Key(release)), None);
        assert_eq!(
            Event::from_crossterm(crossterm_key(cte::KeyCode::F(5), cte::KeyModifiers::NONE)),
            None
        );
        assert_eq!(Event::from_crossterm(cte::Event::FocusGained), None);
        assert_eq!(Event::from_crossterm(cte::Event::Paste("hi".into())), None);
    }

    #[test]
    fn hint_glyphs() {
        assert_eq!(KeyCode::Down.glyph(), "↓");
        assert_eq!(KeyCode::Tab.glyph(), "⭾");
        assert_eq!(KeyCode::Backspace.glyph(), "⌫");
        assert_eq!(KeyCode::Char('Q').glyph(), "Q");
    }
}
