//! Demo-local variable scope.
//!
//! Holds the names a script has assigned so far, in insertion order, along
//! with a dirty set naming everything assigned since the last flush.  The
//! scope panel uses the flush to star freshly-changed names, so the dirty
//! set survives exactly one frame.

use std::collections::HashSet;

use tracing::debug;

use crate::value::Value;

/// Ordered name/value store with change tracking.
#[derive(Debug, Default)]
pub struct Scope {
    entries: Vec<(String, Value)>,
    dirty: HashSet<String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) a name.  Every assignment marks the name dirty,
    /// even when the value is unchanged.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name.clone(), value));
        }
        self.dirty.insert(name);
    }

    /// Current value of a name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Drop every binding and forget pending dirty marks.
    pub fn clear(&mut self) {
        debug!(dropped = self.entries.len(), "clearing scope");
        self.entries.clear();
        self.dirty.clear();
    }

    /// Take the dirty set, leaving it empty.  Names come back in the
    /// scope's insertion order.
    pub fn flush_dirty(&mut self) -> Vec<String> {
        let names: Vec<String> = self
            .entries
            .iter()
            .map(|(n, _)| n.clone())
            .filter(|n| self.dirty.contains(n))
            .collect();
        self.dirty.clear();
        names
    }

    /// Iterate over all bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut scope = Scope::new();
        scope.set("x", Value::Int(1));
        assert_eq!(scope.get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut scope = Scope::new();
        scope.set("a", Value::Int(1));
        scope.set("b", Value::Int(2));
        scope.set("a", Value::Int(3));
        let order: Vec<&str> = scope.iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(scope.get("a"), Some(&Value::Int(3)));
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn flush_returns_dirty_once() {
        let mut scope = Scope::new();
        scope.set("x", Value::Int(1));
        scope.set("y", Value::Int(2));
        assert_eq!(scope.flush_dirty(), vec!["x".to_string(), "y".to_string()]);
        // Nothing assigned since the flush.
        assert!(scope.flush_dirty().is_empty());
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn reassignment_marks_dirty_again() {
        let mut scope = Scope::new();
        scope.set("x", Value::Int(1));
        scope.flush_dirty();
        scope.set("x", Value::Int(1));
        assert_eq!(scope.flush_dirty(), vec!["x".to_string()]);
    }

    #[test]
    fn flush_order_follows_insertion() {
        let mut scope = Scope::new();
        scope.set("b", Value::Int(1));
        scope.set("a", Value::Int(2));
        scope.flush_dirty();
        scope.set("a", Value::Int(3));
        scope.set("b", Value::Int(4));
        // Insertion order, not assignment order.
        assert_eq!(scope.flush_dirty(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn clear_empties_everything() {
        let mut scope = Scope::new();
        scope.set("x", Value::Int(1));
        scope.clear();
        assert!(scope.is_empty());
        assert!(scope.flush_dirty().is_empty());
        assert_eq!(scope.get("x"), None);
    }

    #[test]
    fn missing_returns_none() {
        let scope = Scope::new();
        assert_eq!(scope.get("nope"), None);
    }
}
