//! `declare` and `let` declarations: variables, functions, and structs.

use abc_ast::{FieldDecl, MethodDecl, Stmt, StmtKind};
use abc_lex::{Keyword, TokenKind};

use crate::{ParseResult, Parser};

impl Parser {
    /// `declare` (function_decl | struct_decl | variable_decl)
    pub(crate) fn parse_declare(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // declare

        if self.is_keyword(Keyword::Function) {
            return self.parse_function_decl(start);
        }

        // struct_decl begins "ident as ...".
        if matches!(self.current().kind, TokenKind::Ident(_)) && self.peek_is_keyword(Keyword::As) {
            return self.parse_struct_decl(start);
        }

        self.parse_variable_decl(start)
    }

    /// `ident "to" ("always" "be" | "be" ("always")?) expr "."`
    fn parse_variable_decl(&mut self, start: abc_util::Pos) -> ParseResult<Stmt> {
        let name = self.expect_ident()?;
        self.expect_keyword(Keyword::To, "TO")?;

        let is_constant = if self.eat_keyword(Keyword::Always) {
            self.expect_keyword(Keyword::Be, "BE")?;
            true
        } else {
            self.expect_keyword(Keyword::Be, "BE")?;
            self.eat_keyword(Keyword::Always)
        };

        let value = self.parse_call_result_or_expr()?;
        self.expect_period()?;
        Ok(Stmt::new(
            StmtKind::VariableDecl { name, is_constant, value },
            self.span_from(start),
        ))
    }

    /// `"let" ident (("be" | "=" | "equal") ("always"? | "equal" "to" | ) expr | "always" "be" expr) "."`
    ///
    /// "=" is dropped: the lexer has no `=` token, only the wordforms
    /// ("be", "equal", "equal to") the surface syntax actually reaches.
    pub(crate) fn parse_let(&mut self) -> ParseResult<Stmt> {
        let start = self.pos_here();
        self.advance(); // let
        let name = self.expect_ident()?;

        let is_constant = self.eat_keyword(Keyword::Always);

        if self.eat_keyword(Keyword::Be) {
            let is_constant = is_constant || self.eat_keyword(Keyword::Always);
            let is_constant = if self.eat_keyword(Keyword::Equal) {
                self.eat_keyword(Keyword::To);
                is_constant
            } else {
                is_constant
            };
            let value = self.parse_call_result_or_expr()?;
            self.expect_period()?;
            return Ok(Stmt::new(
                StmtKind::VariableDecl { name, is_constant, value },
                self.span_from(start),
            ));
        }

        if self.eat_keyword(Keyword::Equal) {
            self.eat_keyword(Keyword::To);
            let value = self.parse_call_result_or_expr()?;
            self.expect_period()?;
            return Ok(Stmt::new(
                StmtKind::VariableDecl { name, is_constant, value },
                self.span_from(start),
            ));
        }

        Err(self.error_expected("BE or EQUAL"))
    }

    /// `"declare" "function" ident ("that" "takes" ident ("and" ident)*)? "and"? "does" "the"? "following" ":" block "thats" "it" "."`
    fn parse_function_decl(&mut self, start: abc_util::Pos) -> ParseResult<Stmt> {
        self.advance(); // function
        let name = self.expect_ident()?;
        let params = self.parse_optional_params()?;
        self.eat_keyword(Keyword::And);
        self.expect_keyword(Keyword::Does, "DOES")?;
        self.eat_keyword(Keyword::The);
        self.expect_keyword(Keyword::Following, "FOLLOWING")?;
        self.expect_colon()?;
        let body = self.parse_block()?;
        self.expect_thats_it()?;
        Ok(Stmt::new(
            StmtKind::FunctionDecl { name, params, body },
            self.span_from(start),
        ))
    }

    /// `("that" "takes" ident ("and" ident)*)?`
    ///
    /// Only consumes "and" when an identifier follows it — otherwise it's
    /// the "and does the following" that closes the parameter list, not
    /// another parameter.
    fn parse_optional_params(&mut self) -> ParseResult<Vec<abc_util::Symbol>> {
        let mut params = Vec::new();
        if self.eat_keyword(Keyword::That) {
            self.expect_keyword(Keyword::Takes, "TAKES")?;
            params.push(self.expect_ident()?);
            while self.is_keyword(Keyword::And) && matches!(self.peek_next().kind, TokenKind::Ident(_)) {
                self.advance();
                params.push(self.expect_ident()?);
            }
        }
        Ok(params)
    }

    /// `ident "as" ("a"|"an")? ("structure"|"struct") "with" "the"? "following" ("fields"|"field") ":" (field | method)* "thats" "it" "."`
    fn parse_struct_decl(&mut self, start: abc_util::Pos) -> ParseResult<Stmt> {
        let name = self.expect_ident()?;
        self.expect_keyword(Keyword::As, "AS")?;
        if !self.eat_keyword(Keyword::A) {
            self.eat_keyword(Keyword::An);
        }
        if !self.eat_keyword(Keyword::Structure) {
            self.expect_keyword(Keyword::Struct, "STRUCT")?;
        }
        self.expect_keyword(Keyword::With, "WITH")?;
        self.eat_keyword(Keyword::The);
        self.expect_keyword(Keyword::Following, "FOLLOWING")?;
        if !self.eat_keyword(Keyword::Fields) {
            self.expect_keyword(Keyword::Field, "FIELD")?;
        }
        self.expect_colon()?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        while !self.is_keyword(Keyword::Thats) {
            if self.is_keyword(Keyword::Let) {
                methods.push(self.parse_method_decl()?);
            } else {
                fields.push(self.parse_field_decl()?);
            }
        }
        self.expect_thats_it()?;

        Ok(Stmt::new(
            StmtKind::StructDecl { name, fields, methods },
            self.span_from(start),
        ))
    }

    /// `ident "is" ("a"|"an")? "unsigned"? type_name ("with" expr "being" "the" "default")? "."`
    fn parse_field_decl(&mut self) -> ParseResult<FieldDecl> {
        let name = self.expect_ident()?;
        self.expect_keyword(Keyword::Is, "IS")?;
        if !self.eat_keyword(Keyword::A) {
            self.eat_keyword(Keyword::An);
        }
        let unsigned = self.eat_keyword(Keyword::Unsigned);
        let type_name = self.expect_ident()?;

        let default = if self.eat_keyword(Keyword::With) {
            let value = self.parse_expr()?;
            self.expect_keyword(Keyword::Being, "BEING")?;
            self.eat_keyword(Keyword::The);
            self.expect_keyword(Keyword::Default, "DEFAULT")?;
            Some(value)
        } else {
            None
        };

        self.expect_period()?;
        Ok(FieldDecl { name, type_name, unsigned, default })
    }

    /// `"let" ident ("to"? "be" "a"? "function") ("that" "takes" ident ("and" ident)*)? "and"? ("that")? "does" "the"? "following" ":" block`
    fn parse_method_decl(&mut self) -> ParseResult<MethodDecl> {
        let start = self.pos_here();
        self.advance(); // let
        let name = self.expect_ident()?;
        self.eat_keyword(Keyword::To);
        self.expect_keyword(Keyword::Be, "BE")?;
        if !self.eat_keyword(Keyword::A) {
            self.eat_keyword(Keyword::An);
        }
        self.expect_keyword(Keyword::Function, "FUNCTION")?;

        let params = self.parse_optional_params()?;
        self.eat_keyword(Keyword::And);
        self.eat_keyword(Keyword::That);
        self.expect_keyword(Keyword::Does, "DOES")?;
        self.eat_keyword(Keyword::The);
        self.expect_keyword(Keyword::Following, "FOLLOWING")?;
        self.expect_colon()?;
        let body = self.parse_block()?;
        self.expect_thats_it()?;

        Ok(MethodDecl { name, params, body, span: self.span_from(start) })
    }

    /// Reads a statement sequence up to (but not consuming) the construct's
    /// own terminator — `thats`, `otherwise`, `on`, `but`, or EOF.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.at_block_end() {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn at_block_end(&self) -> bool {
        self.at_eof()
            || self.is_keyword(Keyword::Thats)
            || self.is_keyword(Keyword::Otherwise)
            || self.is_keyword(Keyword::On)
            || self.is_keyword(Keyword::OnError)
            || self.is_keyword(Keyword::But)
    }
}
