#![forbid(unsafe_code)]

//! Focus history.

use rtui_core::collections::Stack;

/// Stack of focused view names with a root that cannot be popped.
///
/// The top is the focused view. Switching between ordinary views replaces
/// the top; opening a popup pushes and closing it pops, which restores
/// whichever view had focus before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusStack {
    root: String,
    above: Stack<String>,
}

impl FocusStack {
    /// A stack whose bottom entry is `root`.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            above: Stack::new(),
        }
    }

    /// The focused view.
    pub fn top(&self) -> &str {
        self.above.top().map_or(self.root.as_str(), String::as_str)
    }

    /// Focus `name`, remembering the current view.
    pub fn push(&mut self, name: impl Into<String>) {
        self.above.push(name.into());
    }

    /// Return focus to the previous view.
    ///
    /// The root stays; popping it returns `None` and changes nothing.
    pub fn pop(&mut self) -> Option<String> {
        self.above.pop()
    }

    /// Move focus to `name` without growing the history.
    pub fn replace_top(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.above.is_empty() {
            self.root = name;
        } else {
            self.above.replace_top(name);
        }
    }

    /// Whether `name` is anywhere in the history.
    pub fn contains(&self, name: &str) -> bool {
        self.root == name || self.above.iter().any(|entry| entry == name)
    }

    /// Number of entries, root included.
    pub fn len(&self) -> usize {
        self.above.len() + 1
    }

    /// Always false; the root is permanent.
    pub fn is_empty(&self) -> bool {
        false
    }
}
