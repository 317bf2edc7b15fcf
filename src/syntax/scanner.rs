//! Delimited token scanner.
//!
//! A delimited token is written `\` D content D `\`. The character right after
//! the introducer becomes the token's delimiter D; content is read literally,
//! with no escape processing, until D reappears, and that occurrence must be
//! followed immediately by a second `\`.
//!
//! Both recognizers drive the same `Scanner`: the expander for invocation names
//! and parameter lists, the definition recognizer for names, formal parameters
//! and bodies. Errors are reported as `ScanError`s with byte offsets and each
//! recognizer maps them to its own error kind.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use super::{is_ignorable, INTRODUCER};

/// A lexical failure, located by byte offset in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("the text ended while a token was still open")]
    UnexpectedEnd { offset: usize },
    #[error("'(' cannot be a delimiter here because it opens a parameter list")]
    ParenDelimiter { offset: usize },
    #[error("delimiter '{delimiter}' must be followed by '\\', found '{found}'")]
    MissingCloser {
        offset: usize,
        delimiter: char,
        found: char,
    },
    #[error("expected {expected}, found '{found}'")]
    UnexpectedSymbol {
        offset: usize,
        expected: String,
        found: char,
    },
    #[error("parameter {index} is malformed: {reason}")]
    MalformedParameter {
        offset: usize,
        index: usize,
        reason: String,
    },
}

impl ScanError {
    pub fn offset(&self) -> usize {
        match self {
            ScanError::UnexpectedEnd { offset }
            | ScanError::ParenDelimiter { offset }
            | ScanError::MissingCloser { offset, .. }
            | ScanError::UnexpectedSymbol { offset, .. }
            | ScanError::MalformedParameter { offset, .. } => *offset,
        }
    }
}

/// How a macro name was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameEnd {
    /// The name's own delimiter: the macro takes no parameters.
    Delimiter,
    /// `(`: a parameter list follows.
    ParameterList,
}

/// Character cursor over a text fragment.
pub struct Scanner<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset of the next unread character (the text length at the end).
    pub fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.text.len(), |(offset, _)| *offset)
    }

    pub fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    pub fn next_char(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn require(&mut self) -> Result<(usize, char), ScanError> {
        let end = self.text.len();
        self.chars
            .next()
            .ok_or(ScanError::UnexpectedEnd { offset: end })
    }

    /// Skips whitespace between structural tokens.
    pub fn skip_ignorable(&mut self) {
        while let Some((_, symbol)) = self.chars.peek() {
            if !is_ignorable(*symbol) {
                break;
            }
            self.chars.next();
        }
    }

    /// Consumes `expected`, skipping ignorable whitespace before it.
    ///
    /// `expected` is tested before the whitespace rule, so a whitespace
    /// delimiter still closes its token.
    pub fn expect_symbol(&mut self, expected: char) -> Result<usize, ScanError> {
        loop {
            let (offset, symbol) = self.require()?;
            if symbol == expected {
                return Ok(offset);
            }
            if !is_ignorable(symbol) {
                return Err(ScanError::UnexpectedSymbol {
                    offset,
                    expected: format!("'{}'", expected),
                    found: symbol,
                });
            }
        }
    }

    /// Reads the character right after an introducer as the token delimiter.
    pub fn sense_delimiter(&mut self, paren_opens_list: bool) -> Result<char, ScanError> {
        let (offset, symbol) = self.require()?;
        if paren_opens_list && symbol == '(' {
            return Err(ScanError::ParenDelimiter { offset });
        }
        Ok(symbol)
    }

    /// Requires the `\` that must follow a closing delimiter.
    pub fn expect_closer(&mut self, delimiter: char) -> Result<(), ScanError> {
        let (offset, symbol) = self.require()?;
        if symbol != INTRODUCER {
            return Err(ScanError::MissingCloser {
                offset,
                delimiter,
                found: symbol,
            });
        }
        Ok(())
    }

    /// Reads token content up to `delimiter` and consumes the `D\` closer.
    pub fn read_token_content(&mut self, delimiter: char) -> Result<String, ScanError> {
        let mut content = String::new();
        loop {
            let (_, symbol) = self.require()?;
            if symbol == delimiter {
                self.expect_closer(delimiter)?;
                return Ok(content);
            }
            content.push(symbol);
        }
    }

    /// Reads a complete delimited token: introducer, delimiter, content, closer.
    pub fn read_delimited_token(&mut self) -> Result<String, ScanError> {
        self.expect_symbol(INTRODUCER)?;
        let delimiter = self.sense_delimiter(false)?;
        self.read_token_content(delimiter)
    }

    /// Reads a macro name up to its delimiter or an opening parenthesis.
    pub fn read_name(&mut self, delimiter: char) -> Result<(String, NameEnd), ScanError> {
        let mut name = String::new();
        loop {
            let (_, symbol) = self.require()?;
            if symbol == delimiter {
                return Ok((name, NameEnd::Delimiter));
            }
            if symbol == '(' {
                return Ok((name, NameEnd::ParameterList));
            }
            name.push(symbol);
        }
    }

    /// Reads `\p1\, \p2\, ... )` once the opening parenthesis is consumed.
    ///
    /// Each parameter chooses its own delimiter; whitespace is ignorable around
    /// the tokens and separators. At least one parameter is required.
    pub fn read_parameter_list(&mut self) -> Result<Vec<String>, ScanError> {
        let mut parameters = Vec::new();
        loop {
            let index = parameters.len() + 1;
            let parameter = self
                .read_delimited_token()
                .map_err(|error| into_parameter_error(error, index))?;
            parameters.push(parameter);

            loop {
                let (offset, symbol) = self.require()?;
                match symbol {
                    ',' => break,
                    ')' => return Ok(parameters),
                    _ if is_ignorable(symbol) => continue,
                    _ => {
                        return Err(ScanError::UnexpectedSymbol {
                            offset,
                            expected: "',' or ')'".to_string(),
                            found: symbol,
                        })
                    }
                }
            }
        }
    }

    /// Consumes the rest of the text, which may only be whitespace.
    pub fn expect_only_ignorable(&mut self) -> Result<(), ScanError> {
        for (offset, symbol) in self.chars.by_ref() {
            if !is_ignorable(symbol) {
                return Err(ScanError::UnexpectedSymbol {
                    offset,
                    expected: "nothing but whitespace".to_string(),
                    found: symbol,
                });
            }
        }
        Ok(())
    }
}

/// Wraps a token failure as a parameter failure; running out of text stays as is.
fn into_parameter_error(error: ScanError, index: usize) -> ScanError {
    match error {
        ScanError::UnexpectedEnd { .. } => error,
        other => ScanError::MalformedParameter {
            offset: other.offset(),
            index,
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_token_uses_sensed_delimiter() {
        let mut scanner = Scanner::new("  \\!a | b!\\rest");
        assert_eq!(scanner.read_delimited_token().unwrap(), "a | b");
        assert_eq!(scanner.offset(), 11);
    }

    #[test]
    fn delimited_token_content_is_literal() {
        let mut scanner = Scanner::new("\\#\\|x|\\#\\");
        assert_eq!(scanner.read_delimited_token().unwrap(), "\\|x|\\");
        assert!(scanner.is_at_end());
    }

    #[test]
    fn delimiter_without_closer_is_malformed() {
        let mut scanner = Scanner::new("\\!abc!x");
        assert_eq!(
            scanner.read_delimited_token(),
            Err(ScanError::MissingCloser {
                offset: 6,
                delimiter: '!',
                found: 'x'
            })
        );
    }

    #[test]
    fn unterminated_token_reports_end() {
        let mut scanner = Scanner::new("\\!abc");
        assert_eq!(
            scanner.read_delimited_token(),
            Err(ScanError::UnexpectedEnd { offset: 5 })
        );
    }

    #[test]
    fn stray_symbol_instead_of_introducer() {
        let mut scanner = Scanner::new("  x\\!a!\\");
        assert!(matches!(
            scanner.read_delimited_token(),
            Err(ScanError::UnexpectedSymbol { offset: 2, found: 'x', .. })
        ));
    }

    #[test]
    fn paren_delimiter_rejected_only_when_it_opens_a_list() {
        assert_eq!(
            Scanner::new("(").sense_delimiter(true),
            Err(ScanError::ParenDelimiter { offset: 0 })
        );
        assert_eq!(Scanner::new("(").sense_delimiter(false), Ok('('));
    }

    #[test]
    fn name_stops_at_delimiter_or_paren() {
        let mut scanner = Scanner::new("new line|\\");
        assert_eq!(
            scanner.read_name('|').unwrap(),
            ("new line".to_string(), NameEnd::Delimiter)
        );
        let mut scanner = Scanner::new("repeat(\\!3!\\)");
        assert_eq!(
            scanner.read_name('|').unwrap(),
            ("repeat".to_string(), NameEnd::ParameterList)
        );
    }

    #[test]
    fn parameter_list_with_independent_delimiters() {
        let mut scanner = Scanner::new(" \\!a!\\ ,\n\\#b,c#\\ ) tail");
        assert_eq!(
            scanner.read_parameter_list().unwrap(),
            vec!["a".to_string(), "b,c".to_string()]
        );
        assert_eq!(scanner.offset(), 18);
    }

    #[test]
    fn empty_parameter_list_is_a_parameter_error() {
        let mut scanner = Scanner::new(")");
        assert!(matches!(
            scanner.read_parameter_list(),
            Err(ScanError::MalformedParameter { index: 1, .. })
        ));
    }

    #[test]
    fn bad_separator_is_reported() {
        let mut scanner = Scanner::new("\\!a!\\;");
        assert!(matches!(
            scanner.read_parameter_list(),
            Err(ScanError::UnexpectedSymbol { found: ';', .. })
        ));
    }

    #[test]
    fn whitespace_delimiter_is_checked_before_skipping() {
        let mut scanner = Scanner::new(" x");
        assert_eq!(scanner.expect_symbol(' '), Ok(0));
    }

    #[test]
    fn trailing_text_must_be_ignorable() {
        assert!(Scanner::new(" \n\t").expect_only_ignorable().is_ok());
        assert!(Scanner::new(" x").expect_only_ignorable().is_err());
    }
}
