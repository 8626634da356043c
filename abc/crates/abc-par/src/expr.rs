//! Expression parsing.
//!
//! Precedence (low to high): additive `+ -`, multiplicative `* /`, unary
//! `-`, primary. Comparison operators never mix with arithmetic — they
//! only appear in [`Parser::parse_comparison`], used by `if` and `while`.

use abc_ast::{BinOp, Expr, ExprKind, UnOp};
use abc_lex::{CompareOp, Keyword, TokenKind};
use abc_util::Symbol;

use crate::{ParseResult, Parser};

impl Parser {
    /// A bare comparison, e.g. `n is less than or equal to 1`. Not a
    /// general expression — only valid where `if`/`while` expect it.
    pub fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let start = self.pos_here();
        let left = self.parse_expr()?;
        let op = match self.current().kind {
            TokenKind::Compare(op) => op,
            _ => return Err(self.error_expected("COMPARISON")),
        };
        self.advance();
        let right = self.parse_expr()?;
        let op = match op {
            CompareOp::Eq => BinOp::Eq,
            CompareOp::Ne => BinOp::Ne,
            CompareOp::Lt => BinOp::Lt,
            CompareOp::Gt => BinOp::Gt,
            CompareOp::Le => BinOp::Le,
            CompareOp::Ge => BinOp::Ge,
        };
        let span = self.span_from(start);
        Ok(Expr::new(
            ExprKind::BinaryExpr { left: Box::new(left), op, right: Box::new(right) },
            span,
        ))
    }

    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let start = self.pos_here();
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let span = self.span_from(start);
            left = Expr::new(
                ExprKind::BinaryExpr { left: Box::new(left), op, right: Box::new(right) },
                span,
            );
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let start = self.pos_here();
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = self.span_from(start);
            left = Expr::new(
                ExprKind::BinaryExpr { left: Box::new(left), op, right: Box::new(right) },
                span,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let start = self.pos_here();
        if matches!(self.current().kind, TokenKind::Minus) {
            self.advance();
            let right = self.parse_unary()?;
            let span = self.span_from(start);
            return Ok(Expr::new(ExprKind::UnaryExpr { op: UnOp::Neg, right: Box::new(right) }, span));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let start = self.pos_here();
        match self.current().kind.clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::new(ExprKind::NumberLit(n), self.span_from(start)))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expr::new(ExprKind::StringLit(s), self.span_from(start)))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::new(ExprKind::BooleanLit(true), self.span_from(start)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::new(ExprKind::BooleanLit(false), self.span_from(start)))
            }
            TokenKind::LBracket => self.parse_list_lit(start),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            TokenKind::Keyword(Keyword::The) => self.parse_the_expr(start),
            TokenKind::Keyword(Keyword::A) | TokenKind::Keyword(Keyword::An) => self.parse_article_expr(start),
            TokenKind::Keyword(Keyword::Item) => {
                // "item" used bare is an identifier named "item".
                self.advance();
                Ok(Expr::new(ExprKind::Identifier(Symbol::intern("item")), self.span_from(start)))
            }
            TokenKind::Ident(_) => self.parse_ident_led_expr(start),
            _ => Err(self.error_expected("EXPRESSION")),
        }
    }

    fn expect_rparen(&mut self) -> ParseResult<()> {
        if matches!(self.current().kind, TokenKind::RParen) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_expected("RPAREN"))
        }
    }

    fn expect_rbracket(&mut self) -> ParseResult<()> {
        if matches!(self.current().kind, TokenKind::RBracket) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_expected("RBRACKET"))
        }
    }

    fn parse_list_lit(&mut self, start: abc_util::Pos) -> ParseResult<Expr> {
        self.advance(); // [
        let mut elements = Vec::new();
        if !matches!(self.current().kind, TokenKind::RBracket) {
            elements.push(self.parse_expr()?);
            while self.eat_comma() {
                elements.push(self.parse_expr()?);
            }
        }
        self.expect_rbracket()?;
        Ok(Expr::new(ExprKind::ListLit(elements), self.span_from(start)))
    }

    /// `the item at position E in L`, `the length of E`, `the remainder of
    /// E (divided by | /) E`, `the location of ident`, `the type of E`, or
    /// `the <field> of <object>` (field access).
    fn parse_the_expr(&mut self, start: abc_util::Pos) -> ParseResult<Expr> {
        self.advance(); // the

        if self.eat_keyword(Keyword::Item) {
            self.expect_keyword(Keyword::At, "AT")?;
            self.expect_keyword(Keyword::Position, "POSITION")?;
            let index = self.parse_expr()?;
            self.expect_keyword(Keyword::In, "IN")?;
            let list = self.parse_expr()?;
            return Ok(Expr::new(
                ExprKind::IndexExpr { list: Box::new(list), index: Box::new(index) },
                self.span_from(start),
            ));
        }

        if self.eat_keyword(Keyword::Length) {
            self.expect_keyword(Keyword::Of, "OF")?;
            let value = self.parse_expr()?;
            return Ok(Expr::new(ExprKind::LengthExpr { value: Box::new(value) }, self.span_from(start)));
        }

        if self.eat_keyword(Keyword::Remainder) {
            self.expect_keyword(Keyword::Of, "OF")?;
            let left = self.parse_expr()?;
            if !self.eat_keyword(Keyword::Divided) {
                // bare "/" spelling is also accepted
                if !matches!(self.current().kind, TokenKind::Slash) {
                    return Err(self.error_expected("DIVIDED"));
                }
                self.advance();
            } else {
                self.expect_keyword(Keyword::By, "BY")?;
            }
            let right = self.parse_expr()?;
            return Ok(Expr::new(
                ExprKind::BinaryExpr { left: Box::new(left), op: BinOp::Mod, right: Box::new(right) },
                self.span_from(start),
            ));
        }

        if self.eat_keyword(Keyword::Location) {
            self.expect_keyword(Keyword::Of, "OF")?;
            let name = self.expect_ident()?;
            return Ok(Expr::new(ExprKind::LocationExpr { name }, self.span_from(start)));
        }

        if self.eat_keyword(Keyword::Type) {
            self.expect_keyword(Keyword::Of, "OF")?;
            let value = self.parse_expr()?;
            return Ok(Expr::new(ExprKind::TypeExpr { value: Box::new(value) }, self.span_from(start)));
        }

        // Field access: "the <field> of <object>".
        let field = self.expect_ident()?;
        self.expect_keyword(Keyword::Of, "OF")?;
        let object = self.parse_expr()?;
        Ok(Expr::new(
            ExprKind::FieldAccess { object: Box::new(object), field },
            self.span_from(start),
        ))
    }

    /// `a new instance of Name`, `a reference to ident`, `a copy of E`
    /// (also written with the article `an`).
    fn parse_article_expr(&mut self, start: abc_util::Pos) -> ParseResult<Expr> {
        self.advance(); // a | an

        if self.eat_keyword(Keyword::New) {
            self.expect_keyword(Keyword::Instance, "INSTANCE")?;
            self.expect_keyword(Keyword::Of, "OF")?;
            let struct_name = self.expect_ident()?;
            let mut field_values = Vec::new();
            if self.eat_keyword(Keyword::With) {
                field_values.push(self.parse_expr()?);
                while self.eat_keyword(Keyword::And) {
                    field_values.push(self.parse_expr()?);
                }
            }
            return Ok(Expr::new(
                ExprKind::StructInstantiation { struct_name, field_values },
                self.span_from(start),
            ));
        }

        if self.eat_keyword(Keyword::Reference) {
            self.expect_keyword(Keyword::To, "TO")?;
            let name = self.expect_ident()?;
            return Ok(Expr::new(ExprKind::ReferenceExpr { name }, self.span_from(start)));
        }

        if self.eat_keyword(Keyword::Copy) {
            self.expect_keyword(Keyword::Of, "OF")?;
            let value = self.parse_expr()?;
            return Ok(Expr::new(ExprKind::CopyExpr { value: Box::new(value) }, self.span_from(start)));
        }

        Err(self.error_expected("NEW, REFERENCE, or COPY"))
    }

    /// An identifier-led primary: a bare identifier, a function call
    /// `name(...)`, or an index `name[...]`.
    fn parse_ident_led_expr(&mut self, start: abc_util::Pos) -> ParseResult<Expr> {
        let name = self.expect_ident()?;
        match self.current().kind {
            TokenKind::LParen => {
                self.advance();
                let args = self.parse_call_args_parenthesized()?;
                Ok(Expr::new(ExprKind::FunctionCall { name, args }, self.span_from(start)))
            }
            TokenKind::LBracket => {
                self.advance();
                let index = self.parse_expr()?;
                self.expect_rbracket()?;
                let list = Expr::new(ExprKind::Identifier(name), self.span_from(start));
                Ok(Expr::new(
                    ExprKind::IndexExpr { list: Box::new(list), index: Box::new(index) },
                    self.span_from(start),
                ))
            }
            _ => Ok(Expr::new(ExprKind::Identifier(name), self.span_from(start))),
        }
    }

    fn parse_call_args_parenthesized(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !matches!(self.current().kind, TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.eat_comma() {
                args.push(self.parse_expr()?);
            }
        }
        self.expect_rparen()?;
        Ok(args)
    }

    /// `with arg (and arg)*`, used by `Call`/"result of calling" syntax.
    /// Returns an empty vector when no `with` clause is present.
    pub(crate) fn parse_with_args(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat_keyword(Keyword::With) {
            args.push(self.parse_expr()?);
            while self.eat_keyword(Keyword::And) {
                args.push(self.parse_expr()?);
            }
        }
        Ok(args)
    }
}
