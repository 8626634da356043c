//! Recursive-descent parser: token stream to [`abc_ast::Program`].
//!
//! One-token lookahead maintained as a `(current, next)` pair, advanced by
//! a single operation, mirroring the lexer's own cursor discipline. Every
//! failure returns a [`ParseError`] carrying position and (where it
//! matches a known confusion) a hint, rather than aborting with a bare
//! panic — parsing itself still stops at the first error, it just leaves
//! behind a structured reason why.

mod decl;
mod error;
mod expr;
mod stmt;
#[cfg(test)]
mod tests;

pub use error::ParseError;

use abc_ast::Program;
use abc_lex::{Keyword, Token, TokenKind};
use abc_util::{Pos, Span};

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, position: 0 }
    }

    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while !self.at_eof() {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    // -- token stream access -------------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn peek_next(&self) -> &Token {
        let idx = (self.position + 1).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn at_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !matches!(tok.kind, TokenKind::Eof) {
            self.position += 1;
        }
        tok
    }

    fn pos_here(&self) -> Pos {
        let tok = self.current();
        Pos::new(tok.line, tok.col)
    }

    fn span_from(&self, start: Pos) -> Span {
        Span::new(start, self.pos_here())
    }

    fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self.current().kind, TokenKind::Keyword(k) if k == kw)
    }

    fn peek_is_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek_next().kind, TokenKind::Keyword(k) if k == kw)
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.is_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, kw: Keyword, name: &str) -> ParseResult<()> {
        if self.eat_keyword(kw) {
            Ok(())
        } else {
            Err(self.error_expected(name))
        }
    }

    fn eat_period(&mut self) -> bool {
        if matches!(self.current().kind, TokenKind::Period) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_period(&mut self) -> ParseResult<()> {
        if self.eat_period() {
            Ok(())
        } else {
            Err(self.error_expected("PERIOD"))
        }
    }

    fn expect_colon(&mut self) -> ParseResult<()> {
        if matches!(self.current().kind, TokenKind::Colon) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_expected("COLON"))
        }
    }

    fn eat_comma(&mut self) -> bool {
        if matches!(self.current().kind, TokenKind::Comma) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes `thats it.`; callers decide whether the terminator is
    /// mandatory or optional for their construct.
    fn eat_thats_it(&mut self) -> ParseResult<bool> {
        if !self.is_keyword(Keyword::Thats) {
            return Ok(false);
        }
        self.advance();
        self.expect_keyword(Keyword::It, "IT")?;
        self.expect_period()?;
        Ok(true)
    }

    fn expect_thats_it(&mut self) -> ParseResult<()> {
        if self.eat_thats_it()? {
            Ok(())
        } else {
            Err(self.error_expected("THATS"))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<abc_util::Symbol> {
        match self.current().kind.clone() {
            TokenKind::Ident(sym) => {
                self.advance();
                Ok(sym)
            }
            _ => Err(self.error_expected("IDENTIFIER")),
        }
    }

    /// Reads an identifier's surface text even when it carries a trailing
    /// possessive marker (`dog's`); used to detect `object's method` call
    /// syntax, which the lexer preserves in `Token::text` but not in the
    /// interned `Symbol` (interning is of the whole surface word).
    fn current_ident_text(&self) -> Option<&str> {
        match self.current().kind {
            TokenKind::Ident(_) => Some(self.current().text.as_str()),
            _ => None,
        }
    }

    fn found_description(&self) -> String {
        describe_kind(&self.current().kind)
    }

    fn error_expected(&self, expected: &str) -> ParseError {
        let tok = self.current();
        ParseError::new(tok.line, tok.col, expected, self.found_description())
    }
}

fn describe_kind(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(_) => "NUMBER".to_string(),
        TokenKind::String(_) => "STRING".to_string(),
        TokenKind::Ident(_) => "IDENTIFIER".to_string(),
        TokenKind::Keyword(kw) => format!("{kw:?}").to_uppercase(),
        TokenKind::Compare(_) => "COMPARISON".to_string(),
        TokenKind::Period => "PERIOD".to_string(),
        TokenKind::Comma => "COMMA".to_string(),
        TokenKind::Colon => "COLON".to_string(),
        TokenKind::LParen => "LPAREN".to_string(),
        TokenKind::RParen => "RPAREN".to_string(),
        TokenKind::LBracket => "LBRACKET".to_string(),
        TokenKind::RBracket => "RBRACKET".to_string(),
        TokenKind::Plus => "PLUS".to_string(),
        TokenKind::Minus => "MINUS".to_string(),
        TokenKind::Star => "STAR".to_string(),
        TokenKind::Slash => "SLASH".to_string(),
        TokenKind::Error(_) => "UNRECOGNIZED".to_string(),
        TokenKind::Eof => "EOF".to_string(),
    }
}

/// Convenience entry point: lex and parse source text in one call.
pub fn parse_source(source: &str) -> ParseResult<Program> {
    let mut handler = abc_util::Handler::new();
    let tokens = abc_lex::Lexer::new(source, &mut handler).tokenize();
    Parser::new(tokens).parse_program()
}
