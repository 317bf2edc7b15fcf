//! Adaptex Error Handling - Unified Diagnostic API
//!
//! Every failure of an expansion is a single `ExpansionError`: what went wrong
//! (`ErrorKind`), where it happened (`SourceInfo`, the text fragment that was
//! being scanned plus a span into it) and how to help (`DiagnosticInfo`).
//!
//! Errors are never built by hand outside this module. Recognizers implement
//! `ErrorReporting` and use its convenience methods, so the fragment and the
//! diagnostic code are always filled in consistently.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// The text a recognizer was scanning when an error was raised.
///
/// Nested expansions scan fragments (a parameter, a macro body), so the name
/// records where the fragment came from rather than a file path.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context for a scanned fragment.
    pub fn from_fragment(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a fallback when no fragment is available
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "fallback".to_string(),
            content: context.to_string(),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("<no source>")
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// The single error type of the expander.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct ExpansionError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it happened
    pub source_info: SourceInfo,
    /// How to help
    pub diagnostic_info: DiagnosticInfo,
}

/// All failure classes of an expansion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // Syntax errors - raised by the recognizers
    #[error("malformed macro: {reason}")]
    MalformedMacro { reason: String },
    #[error("malformed argument: {reason}")]
    MalformedArgument { reason: String },
    #[error("malformed macro definition: {reason}")]
    MacroDefinition { reason: String },

    // Resolution errors - scopes and arity
    #[error("'{name}' expects {expected} parameter(s) but {found} were found: {parameters:?}")]
    ArgumentNumberMismatch {
        name: String,
        expected: String,
        found: usize,
        parameters: Vec<String>,
    },
    #[error("macro '{name}' with {arity} parameter(s) was not found in any scope")]
    MacroNotFound { name: String, arity: usize },
    #[error("macro '{name}' with {arity} parameter(s) is already defined in the {scope} scope")]
    DuplicateMacro {
        name: String,
        arity: usize,
        scope: String,
    },

    // Runtime errors - primitive semantics
    #[error("counter '{name}' already exists")]
    DuplicateCounter { name: String },
    #[error("counter '{name}' does not exist")]
    CounterNotFound { name: String },
    #[error("invalid repetition count {value}: it must be greater than zero")]
    InvalidIntegerRange { value: i64 },
    #[error("invalid condition value '{value}': expected 'true' or 'false'")]
    InvalidConditionValue { value: String },
    #[error("'{primitive}' expected an integer but found '{value}'")]
    NumberFormat { primitive: String, value: String },
    #[error("potential infinite recursion: more than {limit} nested expansions")]
    PotentialInfiniteRecursion { limit: usize },

    // External errors - capabilities
    #[error("could not retrieve '{locator}': {reason}")]
    Retrieval { locator: String, reason: String },
}

/// Context-specific source information
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Resolution,
    Runtime,
    External,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::Resolution => "resolution",
            ErrorCategory::Runtime => "runtime",
            ErrorCategory::External => "external",
        };
        f.write_str(name)
    }
}

impl ErrorKind {
    /// Get the error category for test assertions and diagnostic codes
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedMacro { .. }
            | Self::MalformedArgument { .. }
            | Self::MacroDefinition { .. } => ErrorCategory::Syntax,

            Self::ArgumentNumberMismatch { .. }
            | Self::MacroNotFound { .. }
            | Self::DuplicateMacro { .. } => ErrorCategory::Resolution,

            Self::DuplicateCounter { .. }
            | Self::CounterNotFound { .. }
            | Self::InvalidIntegerRange { .. }
            | Self::InvalidConditionValue { .. }
            | Self::NumberFormat { .. }
            | Self::PotentialInfiniteRecursion { .. } => ErrorCategory::Runtime,

            Self::Retrieval { .. } => ErrorCategory::External,
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::MalformedMacro { .. } => "malformed_macro",
            Self::MalformedArgument { .. } => "malformed_argument",
            Self::MacroDefinition { .. } => "macro_definition",
            Self::ArgumentNumberMismatch { .. } => "argument_number_mismatch",
            Self::MacroNotFound { .. } => "macro_not_found",
            Self::DuplicateMacro { .. } => "duplicate_macro",
            Self::DuplicateCounter { .. } => "duplicate_counter",
            Self::CounterNotFound { .. } => "counter_not_found",
            Self::InvalidIntegerRange { .. } => "invalid_integer_range",
            Self::InvalidConditionValue { .. } => "invalid_condition_value",
            Self::NumberFormat { .. } => "number_format",
            Self::PotentialInfiniteRecursion { .. } => "potential_infinite_recursion",
            Self::Retrieval { .. } => "retrieval",
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::MalformedMacro { .. } => "malformed macro",
            Self::MalformedArgument { .. } => "malformed argument",
            Self::MacroDefinition { .. } => "malformed definition",
            Self::ArgumentNumberMismatch { .. } => "wrong number of parameters",
            Self::MacroNotFound { .. } => "unknown macro",
            Self::DuplicateMacro { .. } => "duplicate definition",
            Self::DuplicateCounter { .. } => "counter declared twice",
            Self::CounterNotFound { .. } => "undeclared counter",
            Self::InvalidIntegerRange { .. } => "invalid count",
            Self::InvalidConditionValue { .. } => "invalid condition",
            Self::NumberFormat { .. } => "not an integer",
            Self::PotentialInfiniteRecursion { .. } => "recursion limit reached here",
            Self::Retrieval { .. } => "retrieval failed",
        }
    }

    fn default_help(&self) -> Option<String> {
        match self {
            Self::MalformedMacro { .. } => Some(
                "an invocation reads \\D name D\\ or \\D name(\\p\\, ...) D\\, where D is any character except '('"
                    .into(),
            ),
            Self::MalformedArgument { .. } => {
                Some("each parameter is its own delimited token, e.g. \\!text!\\".into())
            }
            Self::MacroDefinition { .. } => {
                Some("a definition reads \\|name(\\p\\, ...)|\\ = \\#body#\\".into())
            }
            Self::CounterNotFound { name } => {
                Some(format!("declare it first with \\|new counter(\\!{}!\\)|\\", name))
            }
            Self::PotentialInfiniteRecursion { .. } => {
                Some("check for a macro whose body invokes itself unconditionally".into())
            }
            _ => None,
        }
    }
}

impl ExpansionError {
    /// Returns the failure class of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Returns the origin label of the fragment in which the error was raised.
    pub fn fragment_name(&self) -> &str {
        self.source_info.source.name()
    }

    /// Returns the byte offset of the error within its fragment.
    pub fn offset(&self) -> usize {
        self.source_info.primary_span.offset()
    }
}

impl Diagnostic for ExpansionError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

// ============================================================================
// ERROR REPORTING - context-aware construction
// ============================================================================

/// Context-aware error creation - each recognizer knows its own fragment
pub trait ErrorReporting {
    /// The fragment the reporter is scanning.
    fn source_context(&self) -> SourceContext;

    /// Create an error with context-appropriate enhancements
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> ExpansionError {
        let error_code = format!("adaptex::{}::{}", kind.category(), kind.code_suffix());
        let help = kind.default_help();
        ExpansionError {
            kind,
            source_info: SourceInfo {
                source: self.source_context().to_named_source(),
                primary_span: span,
            },
            diagnostic_info: DiagnosticInfo { help, error_code },
        }
    }

    fn malformed_macro(&self, reason: impl Into<String>, span: SourceSpan) -> ExpansionError {
        self.report(
            ErrorKind::MalformedMacro {
                reason: reason.into(),
            },
            span,
        )
    }

    fn malformed_argument(&self, reason: impl Into<String>, span: SourceSpan) -> ExpansionError {
        self.report(
            ErrorKind::MalformedArgument {
                reason: reason.into(),
            },
            span,
        )
    }

    fn macro_definition(&self, reason: impl Into<String>, span: SourceSpan) -> ExpansionError {
        self.report(
            ErrorKind::MacroDefinition {
                reason: reason.into(),
            },
            span,
        )
    }

    fn arity_mismatch(
        &self,
        name: &str,
        expected: &str,
        parameters: &[String],
        span: SourceSpan,
    ) -> ExpansionError {
        self.report(
            ErrorKind::ArgumentNumberMismatch {
                name: name.into(),
                expected: expected.into(),
                found: parameters.len(),
                parameters: parameters.to_vec(),
            },
            span,
        )
    }

    fn number_format(&self, primitive: &str, value: &str, span: SourceSpan) -> ExpansionError {
        self.report(
            ErrorKind::NumberFormat {
                primitive: primitive.into(),
                value: value.into(),
            },
            span,
        )
    }
}

/// Creates a placeholder span for errors not tied to a location.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}

/// A span over the character at `offset` in `text`.
///
/// An offset at or past the end (the text ran out) is clamped to the last
/// character, so the label stays inside the source.
pub fn span_within(text: &str, offset: usize) -> SourceSpan {
    let Some((last, _)) = text.char_indices().next_back() else {
        return SourceSpan::from(0..0);
    };
    let offset = offset.min(last);
    let width = text[offset..].chars().next().map_or(1, char::len_utf8);
    SourceSpan::from(offset..offset + width)
}

/// A span covering `start..end`, never empty.
pub fn span_between(start: usize, end: usize) -> SourceSpan {
    SourceSpan::from(start..end.max(start + 1))
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints an ExpansionError with full miette diagnostics
pub fn print_error(error: ExpansionError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fragment(&'static str);

    impl ErrorReporting for Fragment {
        fn source_context(&self) -> SourceContext {
            SourceContext::from_fragment("test", self.0)
        }
    }

    #[test]
    fn report_fills_code_and_help() {
        let err =
            Fragment("\\|oops").malformed_macro("closing symbol expected", span_within("\\|oops", 2));
        assert_eq!(err.category(), ErrorCategory::Syntax);
        assert_eq!(err.diagnostic_info.error_code, "adaptex::syntax::malformed_macro");
        assert!(err.diagnostic_info.help.is_some());
        assert_eq!(err.offset(), 2);
        assert_eq!(err.fragment_name(), "test");
    }

    #[test]
    fn report_renders_through_miette() {
        let err = Fragment("\\|counter(\\!x!\\)|\\").report(
            ErrorKind::CounterNotFound { name: "x".into() },
            span_between(0, 18),
        );
        let output = format!("{:?}", miette::Report::new(err));
        assert!(output.contains("counter 'x' does not exist"));
        assert!(output.contains("new counter"));
    }

    #[test]
    fn span_within_clamps_to_the_last_character() {
        assert_eq!(span_within("\\|name", 6), SourceSpan::from(5..6));
        assert_eq!(span_within("\\|name", 2), SourceSpan::from(2..3));
        assert_eq!(span_within("ab\u{e9}", 9), SourceSpan::from(2..4));
        assert_eq!(span_within("", 0), SourceSpan::from(0..0));
    }

    #[test]
    fn arity_message_names_primitive_and_parameters() {
        let err = Fragment("").arity_mismatch("repeat", "2", &["3".to_string()], unspanned());
        let message = err.to_string();
        assert!(message.contains("'repeat' expects 2"));
        assert!(message.contains("\"3\""));
    }
}
