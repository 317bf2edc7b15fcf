//! Runtime module for Adaptex
//!
//! State and services of a single expansion: the per-invocation context,
//! the counter store, the recursion guard and the external capabilities.

pub mod capabilities;
pub mod context;
pub mod counters;
pub mod guard;

pub use capabilities::{
    ContentRetriever, FileRetriever, HttpRetriever, InteractivePrompt, NullPrompt, PromptReply,
    RetrievalError, ScriptedPrompt, StaticRetriever, TerminalPrompt, UrlRetriever,
};
pub use context::ExpansionContext;
pub use counters::CounterStore;
pub use guard::{DepthExceeded, RecursionGuard, DEFAULT_MAX_DEPTH};
