//! # Adaptex Primitive System
//!
//! Primitives are the built-in macros. Their names are fixed phrases that
//! cannot be redefined or shadowed: the expander classifies a sanitized name
//! against this table before it ever consults the scope stack.
//!
//! ## Module Structure
//!
//! - **`helpers`**: `PrimitiveCall`, parameter expansion and integer parsing
//! - **`text`**: definitions, comments and fixed text (`define`, `new line`, ...)
//! - **`logic`**: control flow and integer tests (`repeat`, `check condition`, ...)
//! - **`counters`**: the counter store and integer arithmetic
//! - **`external`**: primitives backed by capabilities (`input text`, `get url`, ...)
//!
//! Every primitive has a fixed arity, checked here before its handler runs.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::errors::ExpansionError;
use crate::runtime::ExpansionContext;

pub mod counters;
pub mod external;
pub mod helpers;
pub mod logic;
pub mod text;

pub use helpers::PrimitiveCall;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Handler signature shared by all primitives.
pub type PrimitiveFn =
    fn(call: &PrimitiveCall<'_>, ctx: &mut ExpansionContext<'_>) -> Result<String, ExpansionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Comment,
    Define,
    GlobalDefine,
    NewLine,
    NewPage,
    NoExpand,
    Repeat,
    ForEach,
    InputText,
    SendMessage,
    NewCounter,
    SetCounter,
    Counter,
    Increment,
    Decrement,
    IncrementCounter,
    DecrementCounter,
    CheckCondition,
    IsZero,
    IsGreaterThan,
    IsLessThan,
    IsEqual,
    GetUrl,
}

// ============================================================================
// PRIMITIVE TABLE
// ============================================================================

impl Primitive {
    pub const ALL: [Primitive; 23] = [
        Primitive::Comment,
        Primitive::Define,
        Primitive::GlobalDefine,
        Primitive::NewLine,
        Primitive::NewPage,
        Primitive::NoExpand,
        Primitive::Repeat,
        Primitive::ForEach,
        Primitive::InputText,
        Primitive::SendMessage,
        Primitive::NewCounter,
        Primitive::SetCounter,
        Primitive::Counter,
        Primitive::Increment,
        Primitive::Decrement,
        Primitive::IncrementCounter,
        Primitive::DecrementCounter,
        Primitive::CheckCondition,
        Primitive::IsZero,
        Primitive::IsGreaterThan,
        Primitive::IsLessThan,
        Primitive::IsEqual,
        Primitive::GetUrl,
    ];

    /// Canonical phrase, as written in documents.
    pub const fn name(self) -> &'static str {
        match self {
            Primitive::Comment => "comment",
            Primitive::Define => "define",
            Primitive::GlobalDefine => "global define",
            Primitive::NewLine => "new line",
            Primitive::NewPage => "new page",
            Primitive::NoExpand => "no expand",
            Primitive::Repeat => "repeat",
            Primitive::ForEach => "for each",
            Primitive::InputText => "input text",
            Primitive::SendMessage => "send message",
            Primitive::NewCounter => "new counter",
            Primitive::SetCounter => "set counter",
            Primitive::Counter => "counter",
            Primitive::Increment => "increment",
            Primitive::Decrement => "decrement",
            Primitive::IncrementCounter => "increment counter",
            Primitive::DecrementCounter => "decrement counter",
            Primitive::CheckCondition => "check condition",
            Primitive::IsZero => "is zero",
            Primitive::IsGreaterThan => "is greater than",
            Primitive::IsLessThan => "is less than",
            Primitive::IsEqual => "is equal",
            Primitive::GetUrl => "get url",
        }
    }

    pub const fn arity(self) -> Arity {
        match self {
            Primitive::NewLine | Primitive::NewPage => Arity::Exactly(0),
            Primitive::Comment
            | Primitive::Define
            | Primitive::GlobalDefine
            | Primitive::NoExpand
            | Primitive::NewCounter
            | Primitive::Counter
            | Primitive::Increment
            | Primitive::Decrement
            | Primitive::IncrementCounter
            | Primitive::DecrementCounter
            | Primitive::IsZero
            | Primitive::GetUrl => Arity::Exactly(1),
            Primitive::Repeat
            | Primitive::InputText
            | Primitive::SendMessage
            | Primitive::SetCounter
            | Primitive::IsGreaterThan
            | Primitive::IsLessThan
            | Primitive::IsEqual => Arity::Exactly(2),
            Primitive::CheckCondition => Arity::Exactly(3),
            Primitive::ForEach => Arity::AtLeast(2),
        }
    }

    /// One-line description for `adaptex primitives`.
    pub const fn summary(self) -> &'static str {
        match self {
            Primitive::Comment => "discards its parameter without expanding it",
            Primitive::Define => "defines a macro in the current scope",
            Primitive::GlobalDefine => "defines a macro in the global scope",
            Primitive::NewLine => "a line break",
            Primitive::NewPage => "the page break marker",
            Primitive::NoExpand => "its parameter, verbatim",
            Primitive::Repeat => "expands the second parameter n times",
            Primitive::ForEach => "expands the last parameter once per item, with `it` bound",
            Primitive::InputText => "asks the user to edit a text",
            Primitive::SendMessage => "shows a message to the user",
            Primitive::NewCounter => "declares a counter starting at 0",
            Primitive::SetCounter => "overwrites a counter",
            Primitive::Counter => "the value of a counter",
            Primitive::Increment => "an integer plus one",
            Primitive::Decrement => "an integer minus one",
            Primitive::IncrementCounter => "adds one to a counter",
            Primitive::DecrementCounter => "subtracts one from a counter",
            Primitive::CheckCondition => "the second or third parameter, by a true/false test",
            Primitive::IsZero => "whether an integer is zero",
            Primitive::IsGreaterThan => "whether the first integer is greater",
            Primitive::IsLessThan => "whether the first integer is smaller",
            Primitive::IsEqual => "whether two integers are equal",
            Primitive::GetUrl => "the text stored at a location",
        }
    }

    fn handler(self) -> PrimitiveFn {
        match self {
            Primitive::Comment => text::comment,
            Primitive::Define => text::define,
            Primitive::GlobalDefine => text::global_define,
            Primitive::NewLine => text::new_line,
            Primitive::NewPage => text::new_page,
            Primitive::NoExpand => text::no_expand,
            Primitive::Repeat => logic::repeat,
            Primitive::ForEach => logic::for_each,
            Primitive::CheckCondition => logic::check_condition,
            Primitive::IsZero => logic::is_zero,
            Primitive::IsGreaterThan => logic::is_greater_than,
            Primitive::IsLessThan => logic::is_less_than,
            Primitive::IsEqual => logic::is_equal,
            Primitive::NewCounter => counters::new_counter,
            Primitive::SetCounter => counters::set_counter,
            Primitive::Counter => counters::counter,
            Primitive::Increment => counters::increment,
            Primitive::Decrement => counters::decrement,
            Primitive::IncrementCounter => counters::increment_counter,
            Primitive::DecrementCounter => counters::decrement_counter,
            Primitive::InputText => external::input_text,
            Primitive::SendMessage => external::send_message,
            Primitive::GetUrl => external::get_url,
        }
    }

    /// Looks up a sanitized name. Both Drive phrases resolve to `get url`.
    pub fn classify(name: &str) -> Option<Primitive> {
        PRIMITIVE_NAMES.get(name).copied()
    }
}

static PRIMITIVE_NAMES: Lazy<HashMap<&'static str, Primitive>> = Lazy::new(|| {
    let mut names: HashMap<&'static str, Primitive> = Primitive::ALL
        .iter()
        .map(|primitive| (primitive.name(), *primitive))
        .collect();
    names.insert("get from google drive", Primitive::GetUrl);
    names.insert("upload to google drive", Primitive::GetUrl);
    names
});

// ============================================================================
// DISPATCH
// ============================================================================

/// Checks the arity of a primitive call and runs its handler.
pub fn dispatch(
    call: &PrimitiveCall<'_>,
    ctx: &mut ExpansionContext<'_>,
) -> Result<String, ExpansionError> {
    call.check_arity()?;
    (call.primitive().handler())(call, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_primitive_classifies_to_itself() {
        for primitive in Primitive::ALL {
            assert_eq!(Primitive::classify(primitive.name()), Some(primitive));
        }
    }

    #[test]
    fn drive_phrases_collapse_to_get_url() {
        assert_eq!(Primitive::classify("get from google drive"), Some(Primitive::GetUrl));
        assert_eq!(Primitive::classify("upload to google drive"), Some(Primitive::GetUrl));
    }

    #[test]
    fn classification_is_exact_on_sanitized_names() {
        assert_eq!(Primitive::classify("newline"), None);
        assert_eq!(Primitive::classify("Repeat"), None);
        assert_eq!(Primitive::classify("counters"), None);
    }

    #[test]
    fn arity_display_and_acceptance() {
        assert_eq!(Arity::Exactly(2).to_string(), "2");
        assert_eq!(Arity::AtLeast(2).to_string(), "at least 2");
        assert!(Arity::AtLeast(2).accepts(5));
        assert!(!Arity::Exactly(1).accepts(0));
    }
}
