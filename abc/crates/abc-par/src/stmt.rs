//! Every statement form except `declare`/`let`, which live in [`crate::decl`].

use abc_ast::{ElseIf, Expr, ExprKind, Stmt, StmtKind};
use abc_lex::{Keyword, TokenKind};
use abc_util::Symbol;

use crate::{ParseResult, Parser};

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.current().kind {
            TokenKind::Keyword(Keyword::Declare) => self.parse_declare(),
            TokenKind::Keyword(Keyword::Let) => self.parse_let(),
            TokenKind::Keyword(Keyword::Set) => self.parse_assignment(),
            TokenKind::Keyword(Keyword::Call) => self.parse_call_stmt(),
            TokenKind::Keyword(Keyword::If) => self.parse_if_stmt(),
            TokenKind::Keyword(Keyword::Repeat) => self.parse_repeat_stmt(),
            TokenKind::Keyword(Keyword::For) => self.parse_foreach_stmt(),
            TokenKind::Keyword(Keyword::Print) | TokenKind::Keyword(Keyword::Write) => self.parse_output_stmt(),
            TokenKind::Keyword(Keyword::Return) => self.parse_return_stmt(),
            TokenKind::Keyword(Keyword::Break) => self.parse_break_stmt(),
            TokenKind::Keyword(Keyword::Toggle) => self.parse_toggle_stmt(),
            TokenKind::Keyword(Keyword::Try) => self.parse_try_stmt(),
            TokenKind::Keyword(Keyword::Raise) => self.parse_raise_stmt(),
            TokenKind::Keyword(Keyword::Swap) => self.parse_swap_stmt(),
            TokenKind::Keyword(Keyword::Import) => self.parse_import_stmt(),
            _ => Err(self.error_expected("STATEMENT")),
        }
    }

    /// `"set" (index_assignment | field_assignment | ident "to" "be"? call_result_or_expr ".")`
    fn parse_assignment(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // set

        if self.is_keyword(Keyword::The) {
            return self.parse_the_assignment(start);
        }

        let name = self.expect_ident()?;
        self.expect_keyword(Keyword::To, "TO")?;
        self.eat_keyword(Keyword::Be);
        let value = self.parse_call_result_or_expr()?;
        self.expect_period()?;
        Ok(Stmt::new(StmtKind::Assignment { name, value }, self.span_from(start)))
    }

    /// `"the" "item" "at" "position" E "in" L "to" "be"? V "."` (index) or
    /// `"the" field "of" object "to" "be"? V "."` (field).
    fn parse_the_assignment(&mut self, start: abc_util::Pos) -> ParseResult<Stmt> {
        self.advance(); // the

        if self.eat_keyword(Keyword::Item) {
            self.expect_keyword(Keyword::At, "AT")?;
            self.expect_keyword(Keyword::Position, "POSITION")?;
            let index = self.parse_expr()?;
            self.expect_keyword(Keyword::In, "IN")?;
            let list_name = self.expect_ident()?;
            self.expect_keyword(Keyword::To, "TO")?;
            self.eat_keyword(Keyword::Be);
            let value = self.parse_call_result_or_expr()?;
            self.expect_period()?;
            return Ok(Stmt::new(
                StmtKind::IndexAssignment { list_name, index, value },
                self.span_from(start),
            ));
        }

        let field = self.expect_ident()?;
        self.expect_keyword(Keyword::Of, "OF")?;
        let object_name = self.expect_ident()?;
        self.expect_keyword(Keyword::To, "TO")?;
        self.eat_keyword(Keyword::Be);
        let value = self.parse_call_result_or_expr()?;
        self.expect_period()?;
        Ok(Stmt::new(
            StmtKind::FieldAssignment { object_name, field, value },
            self.span_from(start),
        ))
    }

    /// `"the" "result" "of" "calling" ident call_args | expr`
    pub(crate) fn parse_call_result_or_expr(&mut self) -> ParseResult<Expr> {
        if self.is_keyword(Keyword::The) && self.peek_is_keyword(Keyword::Result) {
            let start = self.pos_here();
            self.advance(); // the
            self.advance(); // result
            self.expect_keyword(Keyword::Of, "OF")?;
            self.expect_keyword(Keyword::Calling, "CALLING")?;
            let name = self.expect_ident()?;
            let args = self.parse_with_args()?;
            return Ok(Expr::new(ExprKind::FunctionCall { name, args }, self.span_from(start)));
        }
        self.parse_expr()
    }

    /// `"call" (name "." | name "with" args "." | method ("from"|"on") object "with" args "." | object's method "with" args ".")`
    fn parse_call_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // call

        // Possessive form: "call object's method with args."
        if let Some(text) = self.current_ident_text() {
            if let Some(object_text) = text.strip_suffix("'s") {
                let object = Symbol::intern(object_text);
                self.advance();
                let method = self.expect_ident()?;
                let args = self.parse_with_args()?;
                self.expect_period()?;
                let object_expr = Expr::new(ExprKind::Identifier(object), self.span_from(start));
                let call = Expr::new(
                    ExprKind::MethodCall { object: Box::new(object_expr), method, args },
                    self.span_from(start),
                );
                return Ok(Stmt::new(StmtKind::CallStatement { call }, self.span_from(start)));
            }
        }

        let name = self.expect_ident()?;

        if self.eat_keyword(Keyword::From) || self.eat_keyword(Keyword::On) {
            let object = self.expect_ident()?;
            let args = self.parse_with_args()?;
            self.expect_period()?;
            let object_expr = Expr::new(ExprKind::Identifier(object), self.span_from(start));
            let call = Expr::new(
                ExprKind::MethodCall { object: Box::new(object_expr), method: name, args },
                self.span_from(start),
            );
            return Ok(Stmt::new(StmtKind::CallStatement { call }, self.span_from(start)));
        }

        let args = self.parse_with_args()?;
        self.expect_period()?;
        let call = Expr::new(ExprKind::FunctionCall { name, args }, self.span_from(start));
        Ok(Stmt::new(StmtKind::CallStatement { call }, self.span_from(start)))
    }

    /// `"if" comparison "," "then" block ("otherwise" ("if" comparison "," "then" block | block))* ("thats" "it" ".")?`
    fn parse_if_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // if
        let condition = self.parse_comparison()?;
        if !self.eat_comma() {
            return Err(self.error_expected("COMMA"));
        }
        self.expect_keyword(Keyword::Then, "THEN")?;
        let then_branch = self.parse_block()?;

        let mut elseif_parts = Vec::new();
        let mut else_branch = None;

        while self.eat_keyword(Keyword::Otherwise) {
            if self.eat_keyword(Keyword::If) {
                let elseif_cond = self.parse_comparison()?;
                if !self.eat_comma() {
                    return Err(self.error_expected("COMMA"));
                }
                self.expect_keyword(Keyword::Then, "THEN")?;
                let body = self.parse_block()?;
                elseif_parts.push(ElseIf { condition: elseif_cond, then_branch: body });
            } else {
                else_branch = Some(self.parse_block()?);
                break;
            }
        }

        self.eat_thats_it()?;

        Ok(Stmt::new(
            StmtKind::IfStatement { condition, then_branch, elseif_parts, else_branch },
            self.span_from(start),
        ))
    }

    /// `"repeat" ("forever" ":" block | "the" "following" ("while" comparison | expr "times") ":" block) ("thats" "it" ".")?`
    fn parse_repeat_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // repeat

        if self.eat_keyword(Keyword::Forever) {
            self.expect_colon()?;
            let body = self.parse_block()?;
            self.eat_thats_it()?;
            let always_true = Expr::new(ExprKind::BooleanLit(true), abc_util::Span::new(start, start));
            return Ok(Stmt::new(
                StmtKind::WhileLoop { condition: always_true, body },
                self.span_from(start),
            ));
        }

        self.expect_keyword(Keyword::The, "THE")?;
        self.expect_keyword(Keyword::Following, "FOLLOWING")?;

        if self.eat_keyword(Keyword::While) {
            let condition = self.parse_comparison()?;
            self.expect_colon()?;
            let body = self.parse_block()?;
            self.eat_thats_it()?;
            return Ok(Stmt::new(StmtKind::WhileLoop { condition, body }, self.span_from(start)));
        }

        let count = self.parse_expr()?;
        self.expect_keyword(Keyword::Times, "TIMES")?;
        self.expect_colon()?;
        let body = self.parse_block()?;
        self.eat_thats_it()?;
        Ok(Stmt::new(StmtKind::ForLoop { count, body }, self.span_from(start)))
    }

    /// `"for" "each" ident "in" expr "," "do" "the" "following" ":" block ("thats" "it" ".")?`
    fn parse_foreach_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // for
        self.expect_keyword(Keyword::Each, "EACH")?;
        let item_name = self.expect_ident()?;
        self.expect_keyword(Keyword::In, "IN")?;
        let list = self.parse_expr()?;
        if !self.eat_comma() {
            return Err(self.error_expected("COMMA"));
        }
        self.expect_keyword(Keyword::Do, "DO")?;
        self.expect_keyword(Keyword::The, "THE")?;
        self.expect_keyword(Keyword::Following, "FOLLOWING")?;
        self.expect_colon()?;
        let body = self.parse_block()?;
        self.eat_thats_it()?;
        Ok(Stmt::new(
            StmtKind::ForEachLoop { item_name, list, body },
            self.span_from(start),
        ))
    }

    /// `("print" | "write") expr ("," expr)* "."`
    fn parse_output_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        let trailing_newline = self.is_keyword(Keyword::Print);
        self.advance(); // print | write
        let mut values = vec![self.parse_call_result_or_expr()?];
        while self.eat_comma() {
            values.push(self.parse_call_result_or_expr()?);
        }
        self.expect_period()?;
        Ok(Stmt::new(
            StmtKind::OutputStatement { values, trailing_newline },
            self.span_from(start),
        ))
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // return
        let value = self.parse_call_result_or_expr()?;
        self.expect_period()?;
        Ok(Stmt::new(StmtKind::ReturnStatement { value }, self.span_from(start)))
    }

    fn parse_break_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // break
        self.eat_keyword(Keyword::Out);
        self.expect_period()?;
        Ok(Stmt::new(StmtKind::BreakStatement, self.span_from(start)))
    }

    fn parse_toggle_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // toggle
        let name = self.expect_ident()?;
        self.expect_period()?;
        Ok(Stmt::new(StmtKind::ToggleStatement { name }, self.span_from(start)))
    }

    fn parse_swap_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // swap
        let name1 = self.expect_ident()?;
        self.expect_keyword(Keyword::And, "AND")?;
        let name2 = self.expect_ident()?;
        self.expect_period()?;
        Ok(Stmt::new(StmtKind::SwapStatement { name1, name2 }, self.span_from(start)))
    }

    fn parse_import_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // import
        let path = match self.current().kind.clone() {
            TokenKind::String(s) => {
                self.advance();
                s
            }
            _ => return Err(self.error_expected("STRING")),
        };
        self.expect_period()?;
        Ok(Stmt::new(StmtKind::ImportStatement { path }, self.span_from(start)))
    }

    /// `as <Name>` is optional; an undeclared raise defaults to `RuntimeError`.
    fn parse_raise_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // raise
        let message = self.parse_expr()?;
        let error_type = if self.eat_keyword(Keyword::As) {
            self.expect_ident()?
        } else {
            Symbol::intern("RuntimeError")
        };
        self.expect_period()?;
        Ok(Stmt::new(
            StmtKind::RaiseStatement { message, error_type },
            self.span_from(start),
        ))
    }

    /// `"try" "doing" "the" "following" ":" body ("on" "error" ":" body | "onerror" ":" body)? ("but" "finally" ":" body)? "thats" "it" "."`
    fn parse_try_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // try
        self.expect_keyword(Keyword::Doing, "DOING")?;
        self.expect_keyword(Keyword::The, "THE")?;
        self.expect_keyword(Keyword::Following, "FOLLOWING")?;
        self.expect_colon()?;
        let try_body = self.parse_block()?;

        let error_body = if self.eat_keyword(Keyword::OnError) {
            self.expect_colon()?;
            Some(self.parse_block()?)
        } else if self.is_keyword(Keyword::On) {
            self.advance();
            // "error" is not a keyword: it lexes as a plain identifier.
            match self.current_ident_text() {
                Some(t) if t.eq_ignore_ascii_case("error") => {
                    self.advance();
                }
                _ => return Err(self.error_expected("ERROR")),
            }
            self.expect_colon()?;
            Some(self.parse_block()?)
        } else {
            None
        };

        let finally_body = if self.eat_keyword(Keyword::But) {
            self.expect_keyword(Keyword::Finally, "FINALLY")?;
            self.expect_colon()?;
            Some(self.parse_block()?)
        } else {
            None
        };

        self.expect_thats_it()?;

        Ok(Stmt::new(
            StmtKind::TryStatement { try_body, error_body, finally_body },
            self.span_from(start),
        ))
    }
}
