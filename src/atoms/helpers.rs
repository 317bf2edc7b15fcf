//! # Primitive Helper Infrastructure
//!
//! `PrimitiveCall` is the view a handler gets of its invocation: the raw
//! parameter texts, the span for error reporting and a few operations every
//! primitive needs (expanding a parameter in its own fragment, reading an
//! integer, reporting an error at the invocation).

use crate::errors::{ErrorKind, ErrorReporting, ExpansionError};
use crate::macros::{Expander, Invocation};
use crate::runtime::ExpansionContext;

use super::Primitive;

// ============================================================================
// PRIMITIVE CALL
// ============================================================================

pub struct PrimitiveCall<'c> {
    primitive: Primitive,
    invocation: &'c Invocation,
    reporter: &'c Expander<'c>,
}

impl<'c> PrimitiveCall<'c> {
    pub fn new(primitive: Primitive, invocation: &'c Invocation, reporter: &'c Expander<'c>) -> Self {
        Self {
            primitive,
            invocation,
            reporter,
        }
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    /// Canonical name of the primitive.
    pub fn name(&self) -> &'static str {
        self.primitive.name()
    }

    pub fn parameters(&self) -> &'c [String] {
        &self.invocation.parameters
    }

    /// Raw text of parameter `index` (zero-based).
    pub fn raw(&self, index: usize) -> &'c str {
        &self.invocation.parameters[index]
    }

    pub fn check_arity(&self) -> Result<(), ExpansionError> {
        let arity = self.primitive.arity();
        if arity.accepts(self.invocation.arity()) {
            return Ok(());
        }
        Err(self.reporter.arity_mismatch(
            self.name(),
            &arity.to_string(),
            self.parameters(),
            self.invocation.span.into(),
        ))
    }

    /// Reports `kind` at the invocation.
    pub fn error(&self, kind: ErrorKind) -> ExpansionError {
        self.reporter.report(kind, self.invocation.span.into())
    }

    // ========================================================================
    // PARAMETER EXPANSION
    // ========================================================================

    /// Origin label of parameter `index` in diagnostics.
    pub fn parameter_origin(&self, index: usize) -> String {
        format!("parameter {} of '{}'", index + 1, self.name())
    }

    /// Expands parameter `index` in a fresh fragment.
    pub fn expand(
        &self,
        ctx: &mut ExpansionContext<'_>,
        index: usize,
    ) -> Result<String, ExpansionError> {
        ctx.expand_fragment(self.raw(index), Vec::new(), &self.parameter_origin(index))
    }

    /// Expands parameter `index` and reads it as an integer.
    pub fn expand_integer(
        &self,
        ctx: &mut ExpansionContext<'_>,
        index: usize,
    ) -> Result<i64, ExpansionError> {
        let text = self.expand(ctx, index)?;
        self.parse_integer(&text)
    }

    pub fn parse_integer(&self, text: &str) -> Result<i64, ExpansionError> {
        parse_integer(text).ok_or_else(|| {
            self.reporter
                .number_format(self.name(), text, self.invocation.span.into())
        })
    }

    /// Applies checked arithmetic; overflow is a number format error on `operand`.
    pub fn checked(&self, result: Option<i64>, operand: i64) -> Result<i64, ExpansionError> {
        result.ok_or_else(|| {
            self.reporter.number_format(
                self.name(),
                &operand.to_string(),
                self.invocation.span.into(),
            )
        })
    }
}

// ============================================================================
// VALUE CONVERSION
// ============================================================================

/// Trimmed decimal text with an optional sign.
pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

pub fn render_bool(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}
