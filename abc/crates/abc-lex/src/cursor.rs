//! Character cursor over the source text.
//!
//! Tracks byte position, line, and column, and supports taking a snapshot
//! to restore to later — the one piece of lexer state the multi-word
//! comparison-operator scan (`crate::lexer`) needs to backtrack.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    position: usize,
    line: u32,
    col: u32,
}

pub struct Cursor<'a> {
    source: &'a str,
    position: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Current character, or `'\0'` at end of input.
    pub fn current(&self) -> char {
        self.source[self.position..].chars().next().unwrap_or('\0')
    }

    /// Character `offset` positions ahead, or `'\0'` past the end.
    pub fn peek_at(&self, offset: usize) -> char {
        self.source[self.position..].chars().nth(offset).unwrap_or('\0')
    }

    pub fn advance(&mut self) -> char {
        let c = self.current();
        if c != '\0' {
            self.position += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
        c
    }

    pub fn matches(&mut self, expected: char) -> bool {
        if self.current() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// The remaining, unconsumed source text.
    pub fn rest(&self) -> &'a str {
        &self.source[self.position..]
    }

    /// Slice of already-traversed source between two byte offsets.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    pub fn save(&self) -> CursorState {
        CursorState {
            position: self.position,
            line: self.line,
            col: self.col,
        }
    }

    pub fn restore(&mut self, state: CursorState) {
        self.position = state.position;
        self.line = state.line;
        self.col = state.col;
    }
}
