//! Parser diagnostics.
//!
//! Every parse failure carries position, what was expected, what was
//! found, and — where the expected/found pair matches a known confusion
//! from the hint table — a one-line suggestion.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("expected {expected}, got {found} at line {line}, column {col}{}", self.hint_suffix())]
pub struct ParseError {
    pub line: u32,
    pub col: u32,
    pub expected: String,
    pub found: String,
    pub hint: Option<String>,
}

impl ParseError {
    pub fn new(line: u32, col: u32, expected: impl Into<String>, found: impl Into<String>) -> Self {
        let expected = expected.into();
        let found = found.into();
        let hint = lookup_hint(&expected, &found);
        Self { line, col, expected, found, hint }
    }

    fn hint_suffix(&self) -> String {
        match &self.hint {
            Some(h) => format!(" ({h})"),
            None => String::new(),
        }
    }
}

/// The distilled grammar's table of (expected, actual) pairs known to be a
/// common slip, each mapped to a one-line fix suggestion. Only exact
/// matches on both sides fire; anything else gets no hint.
fn lookup_hint(expected: &str, found: &str) -> Option<String> {
    let table: &[(&str, &str, &str)] = &[
        ("PERIOD", "*", "forgot to end the statement with a period"),
        ("TO", "BE", "meant 'to be' instead of just 'be'"),
        ("BE", "TO", "have 'to' but missing 'be'"),
        ("THATS", "*", "forgot to end the block with 'thats it.'"),
        ("IT", "PERIOD", "meant 'thats it.'"),
        ("IDENTIFIER", "NUMBER", "variable name expected, not literal"),
        ("IDENTIFIER", "STRING", "variable name expected, not literal"),
    ];
    table
        .iter()
        .find(|(e, f, _)| *e == expected && (*f == found || *f == "*"))
        .map(|(_, _, hint)| hint.to_string())
}
