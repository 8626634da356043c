//! Source positions and spans shared by every pipeline stage.

/// A single position in source text: 1-based line, 1-based column (in bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub const START: Pos = Pos { line: 1, col: 1 };

    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// A half-open byte range into the source plus its starting position.
///
/// Spans are carried on every token and every AST node so diagnostics can
/// point back at source text; the evaluator never mutates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const DUMMY: Span = Span {
        start: Pos { line: 0, col: 0 },
        end: Pos { line: 0, col: 0 },
    };

    pub fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end)
    }
}
