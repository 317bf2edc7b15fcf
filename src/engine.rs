//! Engine entry points: configuration and the macro processor.
//!
//! `MacroProcessor` is what callers hold. Each call to `expand` builds a new
//! `ExpansionContext`, so definitions, counters and depth never carry over
//! from one invocation to the next.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ExpansionError;
use crate::runtime::capabilities::{ContentRetriever, InteractivePrompt, NullPrompt, UrlRetriever};
use crate::runtime::guard::DEFAULT_MAX_DEPTH;
use crate::runtime::ExpansionContext;

// ============================================================================
// CONFIGURATION
// ============================================================================

pub const DEFAULT_PAGE_MARKER: &str = "<NEW PAGE BODY>";
pub const DEFAULT_SOURCE_NAME: &str = "input";

/// Thread stack that comfortably holds `DEFAULT_MAX_DEPTH` nested expansions
/// in a debug build. Raising `max_depth` needs a proportionally larger stack.
pub const EXPANSION_STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ceiling on nested expansions.
    pub max_depth: usize,
    /// Label of the top-level text in diagnostics.
    pub source_name: String,
    /// Output of `new page`.
    pub page_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            source_name: DEFAULT_SOURCE_NAME.to_string(),
            page_marker: DEFAULT_PAGE_MARKER.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file '{}': {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

impl EngineConfig {
    /// Loads a config file: YAML for `.yaml`/`.yml`, JSON otherwise.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |reason: String| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        };
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&text).map_err(|e| parse_error(e.to_string()))?
            }
            _ => serde_json::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
        };
        log::debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}

// ============================================================================
// MACRO PROCESSOR
// ============================================================================

/// Expands documents with a fixed configuration and a pair of capabilities.
///
/// # Stack usage
/// Each nested fragment is a recursive call. The recursion guard stops at
/// `max_depth`, but the thread must have room for that many levels: the
/// binary runs on an `EXPANSION_STACK_SIZE` thread, and embedders that
/// expand untrusted documents off the main thread should do the same.
pub struct MacroProcessor {
    config: EngineConfig,
    prompt: Box<dyn InteractivePrompt>,
    retriever: Box<dyn ContentRetriever>,
}

impl Default for MacroProcessor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl MacroProcessor {
    /// A processor that never prompts and fetches `get url` content over
    /// HTTP or from files.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            prompt: Box::new(NullPrompt),
            retriever: Box::new(UrlRetriever::new()),
        }
    }

    pub fn with_prompt(mut self, prompt: impl InteractivePrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn with_retriever(mut self, retriever: impl ContentRetriever + 'static) -> Self {
        self.retriever = Box::new(retriever);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Expands `text` as one independent top-level invocation.
    pub fn expand(&mut self, text: &str) -> Result<String, ExpansionError> {
        expand_with(&self.config, text, self.prompt.as_mut(), self.retriever.as_ref())
    }
}

/// Expands `text` with borrowed capabilities, for callers that need to
/// inspect them afterwards.
pub fn expand_with(
    config: &EngineConfig,
    text: &str,
    prompt: &mut dyn InteractivePrompt,
    retriever: &dyn ContentRetriever,
) -> Result<String, ExpansionError> {
    log::info!("expanding '{}' ({} bytes)", config.source_name, text.len());
    let mut context = ExpansionContext::new(config, prompt, retriever);
    let output = context.expand_fragment(text, Vec::new(), &config.source_name)?;
    log::info!("expanded '{}' into {} bytes", config.source_name, output.len());
    Ok(output)
}
