//! Definition recognizer.
//!
//! Parses the single parameter of `define` / `global define`:
//!
//! ```text
//! \D NAME D\ = \E BODY E\
//! \D NAME (\p1\, \p2\, ...) D\ = \E BODY E\
//! ```
//!
//! Name, formal parameters and body are all delimited tokens read by the
//! shared `Scanner`. Whitespace is ignorable between the structural tokens
//! only. Any failure is a `MacroDefinition` error. The result is a `Macro`
//! value; inserting it into a scope is the caller's job.

use std::collections::HashSet;

use crate::errors::{span_between, span_within, ErrorReporting, ExpansionError, SourceContext};
use crate::macros::Macro;

use super::{sanitize_name, NameEnd, ScanError, Scanner, INTRODUCER};

/// Error reporter over the text of one definition.
struct DefinitionSource<'a> {
    text: &'a str,
    origin: &'a str,
}

impl ErrorReporting for DefinitionSource<'_> {
    fn source_context(&self) -> SourceContext {
        SourceContext::from_fragment(self.origin, self.text)
    }
}

impl DefinitionSource<'_> {
    fn scan_error(&self, error: ScanError) -> ExpansionError {
        self.macro_definition(error.to_string(), span_within(self.text, error.offset()))
    }

    fn whole(&self, reason: String) -> ExpansionError {
        self.macro_definition(reason, span_between(0, self.text.len()))
    }
}

/// Parses a macro definition. `origin` labels the text in diagnostics.
pub fn parse_definition(text: &str, origin: &str) -> Result<Macro, ExpansionError> {
    let source = DefinitionSource { text, origin };
    let (raw_name, parameters, body) =
        scan_definition(&mut Scanner::new(text)).map_err(|e| source.scan_error(e))?;

    let Some(name) = sanitize_name(&raw_name) else {
        return Err(source.whole("the macro name is empty".to_string()));
    };
    check_no_duplicate_params(&parameters).map_err(|param| {
        source.whole(format!(
            "parameter '{}' is declared twice in macro '{}'",
            param, name
        ))
    })?;

    log::debug!(
        "defined macro '{}' with parameters {:?} ({} byte body)",
        name,
        parameters,
        body.len()
    );
    Ok(Macro::new(name, parameters, body))
}

fn scan_definition(scanner: &mut Scanner<'_>) -> Result<(String, Vec<String>, String), ScanError> {
    scanner.expect_symbol(INTRODUCER)?;
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

    scanner.expect_symbol('=')?;
    let body = scanner.read_delimited_token()?;
    scanner.expect_only_ignorable()?;
    Ok((raw_name, parameters, body))
}

/// Returns the first repeated parameter name, if any.
fn check_no_duplicate_params(parameters: &[String]) -> Result<(), &str> {
    let mut seen = HashSet::new();
    for param in parameters {
        if !seen.insert(param.as_str()) {
            return Err(param);
        }
    }
    Ok(())
}
