//! # Expander
//!
//! Scans one text fragment, copies literal text to the output and replaces
//! every invocation with its expansion.
//!
//! ```text
//! \D name D\                       no parameters
//! \D name (\p1\, \p2\, ...) D\     parameters, each its own delimited token
//! ```
//!
//! A resolved invocation is either a primitive, dispatched to `atoms`, or a
//! user macro found by `(name, arity)` on the scope stack. For a user macro
//! every raw parameter is expanded in its own fragment, the results are bound
//! to the formal parameter names as zero-parameter macros, and the body is
//! expanded in one more fragment holding those bindings.
//!
//! Fragments never share an expander. Nesting goes through
//! `ExpansionContext::expand_fragment`, which owns the scope frame and the
//! recursion guard for the nested call.

use crate::atoms::{self, Primitive, PrimitiveCall};
use crate::errors::{span_within, ErrorKind, ErrorReporting, ExpansionError, SourceContext};
use crate::runtime::ExpansionContext;
use crate::syntax::{sanitize_name, NameEnd, ScanError, Scanner, Span, INTRODUCER};

use super::Macro;

/// A recognized invocation, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Sanitized name.
    pub name: String,
    /// Raw, unexpanded parameter texts.
    pub parameters: Vec<String>,
    /// From the introducer to the closing `\`.
    pub span: Span,
}

impl Invocation {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

pub struct Expander<'t> {
    text: &'t str,
    origin: &'t str,
}

impl ErrorReporting for Expander<'_> {
    fn source_context(&self) -> SourceContext {
        SourceContext::from_fragment(self.origin, self.text)
    }
}

impl<'t> Expander<'t> {
    /// `origin` labels the fragment in diagnostics.
    pub fn new(text: &'t str, origin: &'t str) -> Self {
        Self { text, origin }
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    pub fn origin(&self) -> &'t str {
        self.origin
    }

    /// Expands the whole fragment.
    pub fn run(&self, ctx: &mut ExpansionContext<'_>) -> Result<String, ExpansionError> {
        let mut scanner = Scanner::new(self.text);
        let mut output = String::with_capacity(self.text.len());

        while let Some((offset, symbol)) = scanner.next_char() {
            if symbol != INTRODUCER {
                output.push(symbol);
                continue;
            }
            let invocation = self.read_invocation(&mut scanner, offset)?;
            let expansion = self.resolve(&invocation, ctx)?;
            output.push_str(&expansion);
        }
        Ok(output)
    }

    /// Reads an invocation whose introducer sits at `start`.
    pub fn read_invocation(
        &self,
        scanner: &mut Scanner<'_>,
        start: usize,
    ) -> Result<Invocation, ExpansionError> {
        let (raw_name, parameters) =
            scan_invocation(scanner).map_err(|error| self.scan_error(error))?;
        let span = Span::new(start, scanner.offset());

        let Some(name) = sanitize_name(&raw_name) else {
            return Err(self.malformed_macro("the macro name is empty", span.into()));
        };
        log::debug!(
            "{}: invocation '{}' with {} parameter(s) at {}..{}",
            self.origin,
            name,
            parameters.len(),
            span.start,
            span.end
        );
        Ok(Invocation {
            name,
            parameters,
            span,
        })
    }

    fn scan_error(&self, error: ScanError) -> ExpansionError {
        let span = span_within(self.text, error.offset());
        match error {
            ScanError::MalformedParameter { .. } => {
                self.malformed_argument(error.to_string(), span)
            }
            ScanError::UnexpectedEnd { .. } => {
                self.malformed_macro("the text ended inside an unclosed macro", span)
            }
            _ => self.malformed_macro(error.to_string(), span),
        }
    }

    fn resolve(
        &self,
        invocation: &Invocation,
        ctx: &mut ExpansionContext<'_>,
    ) -> Result<String, ExpansionError> {
        if let Some(primitive) = Primitive::classify(&invocation.name) {
            log::debug!("'{}' is the primitive '{}'", invocation.name, primitive.name());
            let call = PrimitiveCall::new(primitive, invocation, self);
            return atoms::dispatch(&call, ctx);
        }

        let arity = invocation.arity();
        let Some((scope_index, found)) = ctx.scopes().find(&invocation.name, arity) else {
            return Err(self.report(
                ErrorKind::MacroNotFound {
                    name: invocation.name.clone(),
                    arity,
                },
                invocation.span.into(),
            ));
        };
        log::debug!("'{}' found in scope {}", invocation.name, scope_index);
        let found = found.clone();

        let mut bindings = Vec::with_capacity(arity);
        for (index, (formal, raw)) in found
            .parameters()
            .iter()
            .zip(&invocation.parameters)
            .enumerate()
        {
            let origin = format!("parameter {} of '{}'", index + 1, found.name());
            let value = ctx.expand_fragment(raw, Vec::new(), &origin)?;
            bindings.push(Macro::constant(formal.clone(), value));
        }

        let origin = format!("body of macro '{}'", found.name());
        ctx.expand_fragment(found.body(), bindings, &origin)
    }
}

/// Sense the delimiter, read the name and optional parameter list, close.
fn scan_invocation(scanner: &mut Scanner<'_>) -> Result<(String, Vec<String>), ScanError> {
    let delimiter = scanner.sense_delimiter(true)?;
    let (raw_name, end) = scanner.read_name(delimiter)?;
    let parameters = match end {
        NameEnd::Delimiter => Vec::new(),
        NameEnd::ParameterList => {
            let parameters = scanner.read_parameter_list()?;
            scanner.expect_symbol(delimiter)?;
            parameters
        }
    };
    scanner.expect_closer(delimiter)?;
    Ok((raw_name, parameters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::errors::ErrorCategory;
    use crate::runtime::{NullPrompt, StaticRetriever};

    fn expand(text: &str) -> Result<String, ExpansionError> {
        let config = EngineConfig::default();
        let mut prompt = NullPrompt;
        let retriever = StaticRetriever::new();
        let mut ctx = ExpansionContext::new(&config, &mut prompt, &retriever);
        ctx.expand_fragment(text, Vec::new(), "test")
    }

    fn read(text: &str) -> Result<Invocation, ExpansionError> {
        let expander = Expander::new(text, "test");
        let mut scanner = Scanner::new(text);
        let (start, _) = scanner.next_char().unwrap();
        expander.read_invocation(&mut scanner, start)
    }

    #[test]
    fn literal_text_is_copied() {
        assert_eq!(expand("plain text, (parens) | pipes").unwrap(), "plain text, (parens) | pipes");
    }

    #[test]
    fn invocation_with_mixed_parameter_delimiters() {
        let invocation = read("\\| pair ( \\!a!\\ , \\#b!#\\ ) |\\").unwrap();
        assert_eq!(invocation.name, "pair");
        assert_eq!(invocation.parameters, vec!["a".to_string(), "b!".to_string()]);
        assert_eq!(invocation.span, Span::new(0, 29));
    }

    #[test]
    fn multi_word_name_is_sanitized() {
        let invocation = read("\\|new \n  line|\\").unwrap();
        assert_eq!(invocation.name, "new line");
        assert!(invocation.parameters.is_empty());
    }

    #[test]
    fn paren_delimiter_is_malformed_macro() {
        let err = read("\\(x(\\").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedMacro { .. }));
        assert_eq!(err.offset(), 1);
    }

    #[test]
    fn missing_closer_is_malformed_macro() {
        let err = read("\\|x|y").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedMacro { .. }));
        assert_eq!(err.offset(), 4);
    }

    #[test]
    fn empty_parameter_list_is_malformed_argument() {
        let err = read("\\|x()|\\").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedArgument { .. }));
    }

    #[test]
    fn unterminated_invocation_is_malformed_macro() {
        for text in ["\\", "\\|name", "\\|name(\\!a!\\", "\\|name(\\!a"] {
            let err = expand(text).unwrap_err();
            assert!(
                matches!(err.kind, ErrorKind::MalformedMacro { .. }),
                "{:?} gave {:?}",
                text,
                err.kind
            );
        }
    }

    #[test]
    fn end_of_text_errors_point_inside_the_fragment() {
        for text in ["\\|name", "\\|name(\\!a!\\)", "x\\"] {
            let err = expand(text).unwrap_err();
            let span = err.source_info.primary_span;
            assert!(span.len() > 0, "{:?}", text);
            assert!(span.offset() + span.len() <= text.len(), "{:?}", text);
        }
        assert_eq!(expand("\\|name").unwrap_err().offset(), 5);
    }

    #[test]
    fn blank_name_is_malformed_macro() {
        let err = expand("\\| \t |\\").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedMacro { .. }));
        assert!(err.to_string().contains("name is empty"));
    }

    #[test]
    fn unknown_macro_reports_name_and_arity() {
        let err = expand("ab\\|hi(\\!x!\\)|\\").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::MacroNotFound {
                name: "hi".into(),
                arity: 1
            }
        );
        assert_eq!(err.category(), ErrorCategory::Resolution);
        assert_eq!(err.offset(), 2);
    }

    #[test]
    fn parameters_are_expanded_before_binding() {
        let text = "\\|define(\\!\\|wrap(\\$x$\\)|\\=\\#[\\|x|\\]#\\!\\)|\\\
                    \\|wrap(\\!\\|new line|\\!\\)|\\";
        assert_eq!(expand(text).unwrap(), "[\n]");
    }

    #[test]
    fn bindings_are_dynamically_scoped() {
        let text = "\\|define(\\!\\|inner|\\=\\#<\\|v|\\>#\\!\\)|\\\
                    \\|define(\\!\\|outer(\\$v$\\)|\\=\\#\\|inner|\\#\\!\\)|\\\
                    \\|outer(\\!seen!\\)|\\";
        assert_eq!(expand(text).unwrap(), "<seen>");
    }

    #[test]
    fn errors_inside_bodies_name_the_fragment() {
        let text = "\\|define(\\!\\|broken|\\=\\#\\|nope|\\#\\!\\)|\\\\|broken|\\";
        let err = expand(text).unwrap_err();
        assert_eq!(err.fragment_name(), "body of macro 'broken'");
    }
}
