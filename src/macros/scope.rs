//! Scopes and the scope stack.
//!
//! A `Scope` is a set of macros keyed by `(name, arity)`; inserting a macro
//! whose identity is already present is refused, never a silent overwrite.
//! The `ScopeStack` holds the global scope at index 0 and the current scope
//! on top. Lookup walks from the top down to the global scope, which gives
//! dynamic scoping: whatever an ancestor expansion defined stays visible to
//! every descendant.
//!
//! # Thread Safety
//! Not thread-safe. Each top-level expansion owns its own stack.

use std::collections::HashMap;

use super::{Macro, MacroKey};

/// One frame of macro definitions.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    macros: HashMap<MacroKey, Macro>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a macro; returns `false` if its identity is already present.
    pub fn insert(&mut self, macro_def: Macro) -> bool {
        let key = macro_def.key();
        if self.macros.contains_key(&key) {
            return false;
        }
        self.macros.insert(key, macro_def);
        true
    }

    pub fn get(&self, key: &MacroKey) -> Option<&Macro> {
        self.macros.get(key)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.macros.values()
    }
}

/// Ordered stack of scopes; index 0 is global.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
        log::trace!("pushed scope {}", self.scopes.len() - 1);
    }

    pub fn pop_scope(&mut self) -> Option<Scope> {
        let scope = self.scopes.pop();
        log::trace!("popped scope {}", self.scopes.len());
        scope
    }

    /// Number of frames on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Inserts into the current (top) scope. Returns `false` on an identity
    /// collision or when no scope is open.
    pub fn insert_current(&mut self, macro_def: Macro) -> bool {
        match self.scopes.last_mut() {
            Some(scope) => scope.insert(macro_def),
            None => false,
        }
    }

    /// Inserts into the global (bottom) scope, with the same collision policy.
    pub fn insert_global(&mut self, macro_def: Macro) -> bool {
        match self.scopes.first_mut() {
            Some(scope) => scope.insert(macro_def),
            None => false,
        }
    }

    /// Finds a macro by `(name, arity)`, innermost scope first.
    ///
    /// Returns the index of the scope it was found in along with the macro.
    pub fn find(&self, name: &str, arity: usize) -> Option<(usize, &Macro)> {
        let key = MacroKey {
            name: name.to_string(),
            arity,
        };
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, scope)| scope.get(&key).map(|found| (index, found)))
    }

    pub fn current(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    pub fn global(&self) -> Option<&Scope> {
        self.scopes.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(name: &str, arity: usize, body: &str) -> Macro {
        let params = (0..arity).map(|i| format!("p{}", i)).collect();
        Macro::new(name, params, body)
    }

    #[test]
    fn duplicate_identity_is_refused() {
        let mut scope = Scope::new();
        assert!(scope.insert(m("x", 1, "first")));
        assert!(!scope.insert(m("x", 1, "second")));
        assert_eq!(scope.len(), 1);
        let key = MacroKey {
            name: "x".into(),
            arity: 1,
        };
        assert_eq!(scope.get(&key).map(Macro::body), Some("first"));
    }

    #[test]
    fn same_name_different_arity_coexist() {
        let mut scope = Scope::new();
        assert!(scope.insert(m("x", 0, "")));
        assert!(scope.insert(m("x", 2, "")));
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn lookup_is_innermost_first() {
        let mut stack = ScopeStack::new();
        stack.push_scope();
        assert!(stack.insert_current(m("v", 0, "global")));
        stack.push_scope();
        stack.push_scope();
        assert!(stack.insert_current(m("v", 0, "inner")));

        let (index, found) = stack.find("v", 0).unwrap();
        assert_eq!((index, found.body()), (2, "inner"));

        stack.pop_scope();
        let (index, found) = stack.find("v", 0).unwrap();
        assert_eq!((index, found.body()), (0, "global"));
    }

    #[test]
    fn arity_mismatch_is_not_found() {
        let mut stack = ScopeStack::new();
        stack.push_scope();
        stack.insert_current(m("n", 2, ""));
        assert!(stack.find("n", 1).is_none());
        assert!(stack.find("n", 3).is_none());
        assert!(stack.find("n", 2).is_some());
    }

    #[test]
    fn global_insert_targets_bottom_scope() {
        let mut stack = ScopeStack::new();
        stack.push_scope();
        stack.push_scope();
        assert!(stack.insert_global(m("g", 0, "")));
        assert!(!stack.insert_global(m("g", 0, "again")));
        assert!(stack.current().unwrap().is_empty());
        assert_eq!(stack.global().unwrap().len(), 1);
    }

    #[test]
    fn inserting_without_scope_fails() {
        let mut stack = ScopeStack::new();
        assert!(!stack.insert_current(m("x", 0, "")));
        assert!(!stack.insert_global(m("x", 0, "")));
        assert!(stack.pop_scope().is_none());
    }
}
