//! Syntax module for Adaptex
//!
//! The lexical layer shared by both recognizers: source spans, name
//! sanitizing, the delimited-token scanner and the definition recognizer.
//! There is no AST: the expander consumes text and produces text directly.

use serde::{Deserialize, Serialize};

pub mod definition;
pub mod scanner;

pub use definition::parse_definition;
pub use scanner::{NameEnd, ScanError, Scanner};

/// The character that opens every macro invocation and every delimited token.
pub const INTRODUCER: char = '\\';

/// Represents a span in scanned text, as byte offsets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A span covering the single character at `offset`.
    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset + 1,
        }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        crate::errors::span_between(span.start, span.end)
    }
}

/// Whitespace that may separate structural tokens.
pub fn is_ignorable(symbol: char) -> bool {
    matches!(symbol, ' ' | '\t' | '\n' | '\r')
}

/// Whitespace collapsed inside macro names: ASCII only, so a no-break
/// space or other Unicode spacing stays part of the name.
pub fn is_name_whitespace(symbol: char) -> bool {
    matches!(symbol, ' ' | '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r')
}

/// Collapses internal whitespace runs to single spaces and trims the result.
///
/// Returns `None` when nothing but whitespace remains.
pub fn sanitize_name(raw: &str) -> Option<String> {
    let name = raw
        .split(is_name_whitespace)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_and_trims() {
        assert_eq!(sanitize_name("  new \t\n line "), Some("new line".to_string()));
        assert_eq!(sanitize_name("x"), Some("x".to_string()));
    }

    #[test]
    fn sanitize_collapses_ascii_whitespace_only() {
        assert_eq!(sanitize_name("new\u{0B}\u{0C}line"), Some("new line".to_string()));
        assert_eq!(
            sanitize_name("new\u{A0}line"),
            Some("new\u{A0}line".to_string())
        );
        assert_eq!(sanitize_name("\u{2003}x"), Some("\u{2003}x".to_string()));
    }

    #[test]
    fn sanitize_rejects_blank_names() {
        assert_eq!(sanitize_name(""), None);
        assert_eq!(sanitize_name(" \r\n\t"), None);
    }

    #[test]
    fn ignorable_set_is_exact() {
        for symbol in [' ', '\t', '\n', '\r'] {
            assert!(is_ignorable(symbol));
        }
        assert!(!is_ignorable('x'));
        assert!(!is_ignorable('\u{0B}'));
    }
}
