//! Counter store: named integers that live outside the macro scopes.
//!
//! Counters are visible from every scope of the invocation that created them
//! and are never released by a scope pop.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct CounterStore {
    counters: HashMap<String, i64>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.counters.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.counters.get(name).copied()
    }

    /// Declares a counter with value 0. Returns `false` if it already exists.
    pub fn create(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.counters.insert(name.to_string(), 0);
        true
    }

    /// Overwrites an existing counter. Returns `false` if it was never declared.
    pub fn set(&mut self, name: &str, value: i64) -> bool {
        let Some(slot) = self.counters.get_mut(name) else {
            return false;
        };
        *slot = value;
        true
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_starts_at_zero_and_refuses_duplicates() {
        let mut store = CounterStore::new();
        assert!(store.create("x"));
        assert_eq!(store.get("x"), Some(0));
        assert!(!store.create("x"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn set_requires_declaration() {
        let mut store = CounterStore::new();
        assert!(!store.set("y", 4));
        assert!(store.get("y").is_none());
        store.create("y");
        assert!(store.set("y", 4));
        assert_eq!(store.get("y"), Some(4));
    }

    #[test]
    fn names_are_exact() {
        let mut store = CounterStore::new();
        store.create("page");
        assert!(!store.contains(" page"));
    }
}
