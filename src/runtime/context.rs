//! Per-invocation expansion state.
//!
//! An `ExpansionContext` owns everything one top-level `expand` call mutates:
//! the scope stack, the counters and the recursion guard. It borrows the two
//! capabilities from its owner. Nothing in here outlives the invocation.

use crate::engine::EngineConfig;
use crate::errors::{ErrorKind, ErrorReporting, ExpansionError, SourceContext};
use crate::macros::{Expander, Macro, ScopeStack};

use super::capabilities::{ContentRetriever, InteractivePrompt};
use super::counters::CounterStore;
use super::guard::RecursionGuard;

/// A container for all the state and services a primitive might need.
pub struct ExpansionContext<'a> {
    scopes: ScopeStack,
    counters: CounterStore,
    guard: RecursionGuard,
    config: &'a EngineConfig,
    prompt: &'a mut dyn InteractivePrompt,
    retriever: &'a dyn ContentRetriever,
}

impl<'a> ExpansionContext<'a> {
    pub fn new(
        config: &'a EngineConfig,
        prompt: &'a mut dyn InteractivePrompt,
        retriever: &'a dyn ContentRetriever,
    ) -> Self {
        Self {
            scopes: ScopeStack::new(),
            counters: CounterStore::new(),
            guard: RecursionGuard::new(config.max_depth),
            config,
            prompt,
            retriever,
        }
    }

    /// Expands `text` in a fresh scope holding `bindings`.
    ///
    /// Enters the recursion guard, pushes the scope, runs a new expander over
    /// the fragment, then pops the scope and exits the guard. The release
    /// happens on the error path too, so a failure leaves the stack and the
    /// depth exactly as they were before the call.
    pub fn expand_fragment(
        &mut self,
        text: &str,
        bindings: Vec<Macro>,
        origin: &str,
    ) -> Result<String, ExpansionError> {
        if let Err(exceeded) = self.guard.enter() {
            let fragment = Fragment { text, origin };
            return Err(fragment.report(
                ErrorKind::PotentialInfiniteRecursion {
                    limit: exceeded.limit,
                },
                (0..text.len()).into(),
            ));
        }
        self.scopes.push_scope();
        for binding in bindings {
            if !self.scopes.insert_current(binding) {
                log::warn!("binding shadowed by an earlier one in '{}'", origin);
            }
        }

        let result = Expander::new(text, origin).run(self);

        self.scopes.pop_scope();
        self.guard.exit();
        result
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeStack {
        &mut self.scopes
    }

    pub fn counters(&self) -> &CounterStore {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut CounterStore {
        &mut self.counters
    }

    pub fn depth(&self) -> usize {
        self.guard.depth()
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    pub fn prompt(&mut self) -> &mut dyn InteractivePrompt {
        &mut *self.prompt
    }

    pub fn retriever(&self) -> &dyn ContentRetriever {
        self.retriever
    }
}

/// Reports errors raised before a fragment's expander exists.
struct Fragment<'t> {
    text: &'t str,
    origin: &'t str,
}

impl ErrorReporting for Fragment<'_> {
    fn source_context(&self) -> SourceContext {
        SourceContext::from_fragment(self.origin, self.text)
    }
}
