//! # Adaptex
//!
//! A recursive text macro expander. Every macro invocation and every
//! parameter chooses its own delimiter, written right after a `\`:
//!
//! ```text
//! \|define(\%\|greet(\$who$\)|\=\#Hello, \|who|\!#\%\)|\
//! \|greet(\!world!\)|\
//! ```
//!
//! defines `greet` and then expands it to `Hello, world!`.
//!
//! [`expand`] runs one document with the default configuration. Use
//! [`MacroProcessor`] to change the configuration or to supply your own
//! prompt and content retriever.

pub use crate::engine::{expand_with, EngineConfig, MacroProcessor, EXPANSION_STACK_SIZE};
pub use crate::errors::{ErrorCategory, ErrorKind, ExpansionError};
pub use crate::runtime::{
    ContentRetriever, FileRetriever, HttpRetriever, InteractivePrompt, NullPrompt, PromptReply,
    RetrievalError, ScriptedPrompt, StaticRetriever, UrlRetriever,
};

pub mod atoms;
pub mod cli;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod macros;
pub mod repl;
pub mod runtime;
pub mod syntax;

/// Expands `text` with the default configuration, no prompting, and
/// `get url` fetching over HTTP or from the file system.
///
/// Expansion recurses once per nested fragment. Near the default depth
/// limit a debug build needs more than the 2 MiB of a default spawned
/// thread; run deep documents on a thread with `EXPANSION_STACK_SIZE`.
pub fn expand(text: &str) -> Result<String, ExpansionError> {
    MacroProcessor::default().expand(text)
}
