#![forbid(unsafe_code)]

//! Small container utilities shared by the widget and application crates.

use std::collections::BTreeMap;

/// A LIFO stack.
///
/// `top` and `pop` return `Option` so callers decide what an empty stack
/// means for them; see `FocusStack` in the widgets crate for a stack that
/// can never become empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Stack<T> {
    /// Create an empty stack.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Push a value on top.
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Remove and return the top value.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// The top value, if any.
    pub fn top(&self) -> Option<&T> {
        self.items.last()
    }

    /// Replace the top value, pushing when the stack is empty.
    ///
    /// Returns the value that was replaced.
    pub fn replace_top(&mut self, value: T) -> Option<T> {
        match self.items.last_mut() {
            Some(top) => Some(std::mem::replace(top, value)),
            None => {
                self.items.push(value);
                None
            }
        }
    }

    /// Number of values on the stack.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the stack holds no values.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate from bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for Stack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// A named two-element tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pair<F, S> {
    /// First element.
    pub first: F,
    /// Second element.
    pub second: S,
}

impl<F, S> Pair<F, S> {
    /// Create a pair.
    pub const fn new(first: F, second: S) -> Self {
        Self { first, second }
    }
}

impl<F, S> From<(F, S)> for Pair<F, S> {
    fn from((first, second): (F, S)) -> Self {
        Self { first, second }
    }
}

impl<F, S> From<Pair<F, S>> for (F, S) {
    fn from(pair: Pair<F, S>) -> Self {
        (pair.first, pair.second)
    }
}

/// Items of `source` for which `predicate` holds, in order.
pub fn filter<'a, T>(source: &'a [T], mut predicate: impl FnMut(&T) -> bool) -> Vec<&'a T> {
    source.iter().filter(|item| predicate(item)).collect()
}

/// Whether any item of `source` satisfies `predicate`.
pub fn any_matches<T>(source: &[T], predicate: impl FnMut(&T) -> bool) -> bool {
    source.iter().any(predicate)
}

/// Map every item together with its index.
pub fn map_indexed<T, V>(source: &[T], mut mapper: impl FnMut(usize, &T) -> V) -> Vec<V> {
    source
        .iter()
        .enumerate()
        .map(|(idx, item)| mapper(idx, item))
        .collect()
}

/// Key/value pairs of a map in key order.
pub fn pairs<K: Ord + Clone, V: Clone>(map: &BTreeMap<K, V>) -> Vec<Pair<K, V>> {
    map.iter()
        .map(|(k, v)| Pair::new(k.clone(), v.clone()))
        .collect()
}
