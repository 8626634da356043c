//! The lexer: source text to token stream.
//!
//! Dispatch is direct-coded (one function per token family) rather than
//! table-driven, the same tradeoff the rest of this pipeline makes
//! elsewhere: slower than a generated table, far easier to keep correct
//! for a grammar this irregular.

use abc_util::{Diagnostic, Handler, Span, Symbol};

use crate::cursor::{Cursor, CursorState};
use crate::token::{CompareOp, Keyword, Token, TokenKind};

/// The six phrases the lexer fuses into a single [`CompareOp`] token. Order
/// matters only in that every entry must be tried; matching is driven by
/// exact phrase equality, not position in this list.
const COMPARE_PHRASES: &[(&str, CompareOp)] = &[
    ("is equal to", CompareOp::Eq),
    ("is not equal to", CompareOp::Ne),
    ("is less than or equal to", CompareOp::Le),
    ("is greater than or equal to", CompareOp::Ge),
    ("is less than", CompareOp::Lt),
    ("is greater than", CompareOp::Gt),
];

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    handler: &'a mut Handler,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, handler: &'a mut Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
        }
    }

    /// Lex the entire source into a token vector, ending in `Token::Eof`.
    /// Never panics: unrecognized bytes become `TokenKind::Error` tokens
    /// and lexing continues.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok.is_eof();
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start_line = self.cursor.line();
        let start_col = self.cursor.col();

        if self.cursor.is_at_end() {
            return Token::new(TokenKind::Eof, "", start_line, start_col);
        }

        let c = self.cursor.current();
        match c {
            '.' => self.single(TokenKind::Period, start_line, start_col),
            ',' => self.single(TokenKind::Comma, start_line, start_col),
            ':' => self.single(TokenKind::Colon, start_line, start_col),
            '(' => self.single(TokenKind::LParen, start_line, start_col),
            ')' => self.single(TokenKind::RParen, start_line, start_col),
            '[' => self.single(TokenKind::LBracket, start_line, start_col),
            ']' => self.single(TokenKind::RBracket, start_line, start_col),
            '+' => self.single(TokenKind::Plus, start_line, start_col),
            '-' => self.single(TokenKind::Minus, start_line, start_col),
            '*' => self.single(TokenKind::Star, start_line, start_col),
            '/' => self.single(TokenKind::Slash, start_line, start_col),
            '"' | '\'' => self.lex_string(c, start_line, start_col),
            c if c.is_ascii_digit() => self.lex_number(start_line, start_col),
            c if is_ident_start(c) => self.lex_identifier_or_compare(start_line, start_col),
            other => {
                self.cursor.advance();
                let span = Span::new(
                    abc_util::Pos::new(start_line, start_col),
                    abc_util::Pos::new(self.cursor.line(), self.cursor.col()),
                );
                self.handler
                    .emit(Diagnostic::error(format!("unrecognized character '{other}'"), span));
                Token::new(TokenKind::Error(other.to_string()), other.to_string(), start_line, start_col)
            }
        }
    }

    fn single(&mut self, kind: TokenKind, line: u32, col: u32) -> Token {
        let c = self.cursor.advance();
        Token::new(kind, c.to_string(), line, col)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '#' => {
                    while !self.cursor.is_at_end() && self.cursor.current() != '\n' {
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_number(&mut self, line: u32, col: u32) -> Token {
        let start = self.cursor.position();
        while self.cursor.current().is_ascii_digit() {
            self.cursor.advance();
        }
        // The decimal point is only consumed if followed by a digit.
        if self.cursor.current() == '.' && self.cursor.peek_at(1).is_ascii_digit() {
            self.cursor.advance();
            while self.cursor.current().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        let text = self.cursor.slice(start, self.cursor.position());
        let value: f64 = text.parse().unwrap_or(0.0);
        Token::new(TokenKind::Number(value), text, line, col)
    }

    fn lex_string(&mut self, quote: char, line: u32, col: u32) -> Token {
        self.cursor.advance(); // opening quote
        let start = self.cursor.position();
        while !self.cursor.is_at_end() && self.cursor.current() != quote {
            self.cursor.advance();
        }
        let text = self.cursor.slice(start, self.cursor.position()).to_string();
        if self.cursor.current() == quote {
            self.cursor.advance();
        } else {
            let span = Span::new(abc_util::Pos::new(line, col), abc_util::Pos::new(self.cursor.line(), self.cursor.col()));
            self.handler
                .emit(Diagnostic::error("unterminated string literal", span));
        }
        Token::new(TokenKind::String(Symbol::intern(&text)), text, line, col)
    }

    /// Reads a bare identifier word (letters, digits, underscore), plus an
    /// optional trailing possessive `'s`, without any keyword lookup.
    fn read_word(&mut self) -> String {
        let start = self.cursor.position();
        while is_ident_continue(self.cursor.current()) {
            self.cursor.advance();
        }
        if self.cursor.current() == '\'' && self.cursor.peek_at(1) == 's' {
            self.cursor.advance();
            self.cursor.advance();
        }
        self.cursor.slice(start, self.cursor.position()).to_string()
    }

    fn lex_identifier_or_compare(&mut self, line: u32, col: u32) -> Token {
        let before_word = self.cursor.save();
        let word = self.read_word();

        if word.eq_ignore_ascii_case("is") {
            if let Some(tok) = self.try_compare_phrase(line, col) {
                return tok;
            }
            // No multi-word match: roll all the way back and re-lex as a
            // plain keyword/identifier (never re-enters this branch, since
            // `lex_plain_word` does no speculative scanning).
            self.cursor.restore(before_word);
            return self.lex_plain_word(line, col);
        }

        self.keyword_or_ident(&word, line, col)
    }

    /// Having already consumed the leading "is", greedily scans further
    /// whitespace-separated words looking for the longest phrase in
    /// [`COMPARE_PHRASES`]. Returns `None` (with cursor left wherever
    /// scanning stopped) if nothing ever matched; the caller is
    /// responsible for rolling back in that case.
    fn try_compare_phrase(&mut self, line: u32, col: u32) -> Option<Token> {
        let mut phrase = String::from("is");
        let mut best: Option<(CursorState, CompareOp)> = None;

        loop {
            // Skip inter-word whitespace without crossing a comment.
            while matches!(self.cursor.current(), ' ' | '\t' | '\r' | '\n') {
                self.cursor.advance();
            }
            match self.cursor.current() {
                ',' | ':' | '\0' => break,
                c if !c.is_ascii_alphabetic() => break,
                _ => {}
            }
            let word_start = self.cursor.position();
            while self.cursor.current().is_ascii_alphabetic() {
                self.cursor.advance();
            }
            let word = self.cursor.slice(word_start, self.cursor.position()).to_lowercase();
            phrase.push(' ');
            phrase.push_str(&word);

            if let Some(&(_, op)) = COMPARE_PHRASES.iter().find(|(p, _)| *p == phrase) {
                best = Some((self.cursor.save(), op));
            }
        }

        let (state, op) = best?;
        self.cursor.restore(state);
        let text = self.matched_phrase_text(op);
        Some(Token::new(TokenKind::Compare(op), text, line, col))
    }

    fn matched_phrase_text(&self, op: CompareOp) -> &'static str {
        COMPARE_PHRASES.iter().find(|(_, o)| *o == op).unwrap().0
    }

    /// Re-lex a word with no speculative "is ..." scanning: normal
    /// keyword-or-identifier classification.
    fn lex_plain_word(&mut self, line: u32, col: u32) -> Token {
        let word = self.read_word();
        self.keyword_or_ident(&word, line, col)
    }

    fn keyword_or_ident(&mut self, word: &str, line: u32, col: u32) -> Token {
        if let Some(kw) = Keyword::lookup(word) {
            Token::new(TokenKind::Keyword(kw), word, line, col)
        } else {
            Token::new(TokenKind::Ident(Symbol::intern(word)), word, line, col)
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
