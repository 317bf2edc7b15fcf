//! # Adaptex Test Helpers
//!
//! Builders for invocations and definitions. Each token picks a delimiter
//! that does not occur in its content, so tests can nest freely without
//! hand-picking delimiters.

#![allow(dead_code)]

use adaptex::{ErrorKind, ExpansionError};

const DELIMITERS: &[char] = &['!', '#', '$', '%', '&', '@', '~', '^', '|', '*', '+', ';', '?'];

fn free_delimiter(content: &str) -> char {
    DELIMITERS
        .iter()
        .copied()
        .find(|d| !content.contains(*d))
        .expect("no free delimiter for test content")
}

/// A delimited token holding `content`.
pub fn token(content: &str) -> String {
    let d = free_delimiter(content);
    format!("\\{d}{content}{d}\\")
}

/// An invocation of `name` with raw parameter texts.
pub fn call(name: &str, parameters: &[&str]) -> String {
    let d = free_delimiter(name);
    if parameters.is_empty() {
        return format!("\\{d}{name}{d}\\");
    }
    let list: Vec<String> = parameters.iter().map(|p| token(p)).collect();
    format!("\\{d}{name}({}){d}\\", list.join(","))
}

/// The parameter text of `define`: `\D name(\p\, ...) D\=\E body E\`.
pub fn definition(name: &str, parameters: &[&str], body: &str) -> String {
    format!("{}={}", call(name, parameters), token(body))
}

pub fn define(name: &str, parameters: &[&str], body: &str) -> String {
    call("define", &[&definition(name, parameters, body)])
}

pub fn global_define(name: &str, parameters: &[&str], body: &str) -> String {
    call("global define", &[&definition(name, parameters, body)])
}

pub fn expand_ok(text: &str) -> String {
    adaptex::logging::init_test();
    adaptex::expand(text).unwrap_or_else(|e| panic!("{:?}", miette::Report::new(e)))
}

pub fn expand_err(text: &str) -> ExpansionError {
    adaptex::logging::init_test();
    match adaptex::expand(text) {
        Ok(output) => panic!("expected an error, got {:?}", output),
        Err(error) => error,
    }
}

pub fn error_kind(text: &str) -> ErrorKind {
    expand_err(text).kind
}

/// Runs `f` on a thread with a large stack, for deeply nested expansions.
pub fn on_big_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(adaptex::EXPANSION_STACK_SIZE)
        .spawn(f)
        .expect("spawn test thread")
        .join()
        .expect("test thread panicked")
}
