//! # Adaptex Macro System
//!
//! Macros are plain text templates: a name, an ordered list of formal
//! parameter names and an unexpanded body. They live in scopes keyed by
//! `(name, arity)` and are resolved by the expander with dynamic scoping.
//!
//! ## Module Structure
//!
//! - **`scope`**: `Scope` and `ScopeStack`, the macro registry
//! - **`expander`**: the recognizer that scans text and resolves invocations
//!
//! ## Identity
//!
//! Two macros are the same macro when they share a name and a parameter count.
//! Body text and parameter mnemonics play no part in identity, so a scope
//! can never hold `\m(\a\)` and `\m(\b\)` at once.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

pub mod expander;
pub mod scope;

pub use expander::{Expander, Invocation};
pub use scope::{Scope, ScopeStack};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// A user-defined macro, or a parameter binding synthesized by the expander.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Macro {
    name: String,
    parameters: Vec<String>,
    body: String,
}

/// The identity of a macro within a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacroKey {
    pub name: String,
    pub arity: usize,
}

impl Macro {
    pub fn new(name: impl Into<String>, parameters: Vec<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters,
            body: body.into(),
        }
    }

    /// A zero-parameter macro, used to bind an expanded parameter value.
    pub fn constant(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formal parameter names in declaration order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn key(&self) -> MacroKey {
        MacroKey {
            name: self.name.clone(),
            arity: self.arity(),
        }
    }
}

impl PartialEq for Macro {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity() == other.arity()
    }
}

impl Eq for Macro {}

impl Hash for Macro {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.arity().hash(state);
    }
}

impl std::fmt::Display for Macro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.parameters.join(", "))
    }
}
