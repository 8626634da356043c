//! AST → bytecode. Total: every `Stmt`/`Expr` variant has an arm here, so a
//! non-exhaustive match is a compile error if the AST grows a variant this
//! file forgets.

use abc_ast::{ElseIf, Expr, ExprKind, FieldDecl, MethodDecl, Program, Stmt, StmtKind};
use abc_util::Symbol;

use crate::tags;
use crate::writer::Writer;

pub const MAGIC: [u8; 4] = [0x10, 0x1E, 0x4E, 0x47];
pub const VERSION: u8 = 0x01;

/// Encodes a whole program: magic, version, then the tagged body.
pub fn encode_program(program: &Program) -> Vec<u8> {
    let mut w = Writer::new();
    w.u8(MAGIC[0]);
    w.u8(MAGIC[1]);
    w.u8(MAGIC[2]);
    w.u8(MAGIC[3]);
    w.u8(VERSION);
    w.u8(tags::PROGRAM);
    w.list(&program.statements, |w, stmt| encode_stmt(w, stmt));
    w.into_bytes()
}

fn encode_symbol(w: &mut Writer, s: Symbol) {
    w.string(s.as_str());
}

fn encode_stmt(w: &mut Writer, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::VariableDecl { name, is_constant, value } => {
            w.u8(tags::VARIABLE_DECL);
            encode_symbol(w, *name);
            w.bool(*is_constant);
            encode_expr(w, value);
        }
        StmtKind::TypedVariableDecl { name, type_name, is_constant, value } => {
            w.u8(tags::TYPED_VARIABLE_DECL);
            encode_symbol(w, *name);
            encode_symbol(w, *type_name);
            w.bool(*is_constant);
            encode_expr(w, value);
        }
        StmtKind::Assignment { name, value } => {
            w.u8(tags::ASSIGNMENT);
            encode_symbol(w, *name);
            encode_expr(w, value);
        }
        StmtKind::IndexAssignment { list_name, index, value } => {
            w.u8(tags::INDEX_ASSIGNMENT);
            encode_symbol(w, *list_name);
            encode_expr(w, index);
            encode_expr(w, value);
        }
        StmtKind::FieldAssignment { object_name, field, value } => {
            w.u8(tags::FIELD_ASSIGNMENT);
            encode_symbol(w, *object_name);
            encode_symbol(w, *field);
            encode_expr(w, value);
        }
        StmtKind::FunctionDecl { name, params, body } => {
            w.u8(tags::FUNCTION_DECL);
            encode_symbol(w, *name);
            w.list(params, |w, p| encode_symbol(w, *p));
            w.list(body, |w, s| encode_stmt(w, s));
        }
        StmtKind::StructDecl { name, fields, methods } => {
            w.u8(tags::STRUCT_DECL);
            encode_symbol(w, *name);
            w.list(fields, encode_field_decl);
            w.list(methods, encode_method_decl);
        }
        StmtKind::CallStatement { call } => {
            w.u8(tags::CALL_STATEMENT);
            encode_expr(w, call);
        }
        StmtKind::IfStatement { condition, then_branch, elseif_parts, else_branch } => {
            w.u8(tags::IF_STATEMENT);
            encode_expr(w, condition);
            w.list(then_branch, |w, s| encode_stmt(w, s));
            w.list(elseif_parts, encode_elseif);
            w.option(else_branch, |w, body| w.list(body, |w, s| encode_stmt(w, s)));
        }
        StmtKind::WhileLoop { condition, body } => {
            w.u8(tags::WHILE_LOOP);
            encode_expr(w, condition);
            w.list(body, |w, s| encode_stmt(w, s));
        }
        StmtKind::ForLoop { count, body } => {
            w.u8(tags::FOR_LOOP);
            encode_expr(w, count);
            w.list(body, |w, s| encode_stmt(w, s));
        }
        StmtKind::ForEachLoop { item_name, list, body } => {
            w.u8(tags::FOR_EACH_LOOP);
            encode_symbol(w, *item_name);
            encode_expr(w, list);
            w.list(body, |w, s| encode_stmt(w, s));
        }
        StmtKind::OutputStatement { values, trailing_newline } => {
            w.u8(tags::OUTPUT_STATEMENT);
            w.list(values, |w, e| encode_expr(w, e));
            w.bool(*trailing_newline);
        }
        StmtKind::ReturnStatement { value } => {
            w.u8(tags::RETURN_STATEMENT);
            encode_expr(w, value);
        }
        StmtKind::BreakStatement => {
            w.u8(tags::BREAK_STATEMENT);
        }
        StmtKind::ToggleStatement { name } => {
            w.u8(tags::TOGGLE_STATEMENT);
            encode_symbol(w, *name);
        }
        StmtKind::SwapStatement { name1, name2 } => {
            w.u8(tags::SWAP_STATEMENT);
            encode_symbol(w, *name1);
            encode_symbol(w, *name2);
        }
        StmtKind::TryStatement { try_body, error_body, finally_body } => {
            w.u8(tags::TRY_STATEMENT);
            w.list(try_body, |w, s| encode_stmt(w, s));
            w.option(error_body, |w, body| w.list(body, |w, s| encode_stmt(w, s)));
            w.option(finally_body, |w, body| w.list(body, |w, s| encode_stmt(w, s)));
        }
        StmtKind::RaiseStatement { message, error_type } => {
            w.u8(tags::RAISE_STATEMENT);
            encode_expr(w, message);
            encode_symbol(w, *error_type);
        }
        StmtKind::ImportStatement { path } => {
            w.u8(tags::IMPORT_STATEMENT);
            encode_symbol(w, *path);
        }
    }
}

fn encode_field_decl(w: &mut Writer, field: &FieldDecl) {
    encode_symbol(w, field.name);
    encode_symbol(w, field.type_name);
    w.bool(field.unsigned);
    w.option(&field.default, |w, e| encode_expr(w, e));
}

fn encode_method_decl(w: &mut Writer, method: &MethodDecl) {
    encode_symbol(w, method.name);
    w.list(&method.params, |w, p| encode_symbol(w, *p));
    w.list(&method.body, |w, s| encode_stmt(w, s));
}

fn encode_elseif(w: &mut Writer, elseif: &ElseIf) {
    encode_expr(w, &elseif.condition);
    w.list(&elseif.then_branch, |w, s| encode_stmt(w, s));
}

fn encode_binop(w: &mut Writer, op: abc_ast::BinOp) {
    use abc_ast::BinOp::*;
    w.u8(match op {
        Add => tags::OP_ADD,
        Sub => tags::OP_SUB,
        Mul => tags::OP_MUL,
        Div => tags::OP_DIV,
        Mod => tags::OP_MOD,
        Eq => tags::OP_EQ,
        Ne => tags::OP_NE,
        Lt => tags::OP_LT,
        Gt => tags::OP_GT,
        Le => tags::OP_LE,
        Ge => tags::OP_GE,
    });
}

fn encode_unop(w: &mut Writer, op: abc_ast::UnOp) {
    use abc_ast::UnOp::*;
    w.u8(match op {
        Neg => tags::UNOP_NEG,
    });
}

fn encode_expr(w: &mut Writer, expr: &Expr) {
    match &expr.kind {
        ExprKind::NumberLit(n) => {
            w.u8(tags::NUMBER_LIT);
            w.f64(*n);
        }
        ExprKind::StringLit(s) => {
            w.u8(tags::STRING_LIT);
            encode_symbol(w, *s);
        }
        ExprKind::BooleanLit(b) => {
            w.u8(tags::BOOLEAN_LIT);
            w.bool(*b);
        }
        ExprKind::ListLit(items) => {
            w.u8(tags::LIST_LIT);
            w.list(items, |w, e| encode_expr(w, e));
        }
        ExprKind::Identifier(name) => {
            w.u8(tags::IDENTIFIER);
            encode_symbol(w, *name);
        }
        ExprKind::BinaryExpr { left, op, right } => {
            w.u8(tags::BINARY_EXPR);
            encode_expr(w, left);
            encode_binop(w, *op);
            encode_expr(w, right);
        }
        ExprKind::UnaryExpr { op, right } => {
            w.u8(tags::UNARY_EXPR);
            encode_unop(w, *op);
            encode_expr(w, right);
        }
        ExprKind::FunctionCall { name, args } => {
            w.u8(tags::FUNCTION_CALL);
            encode_symbol(w, *name);
            w.list(args, |w, e| encode_expr(w, e));
        }
        ExprKind::MethodCall { object, method, args } => {
            w.u8(tags::METHOD_CALL);
            encode_expr(w, object);
            encode_symbol(w, *method);
            w.list(args, |w, e| encode_expr(w, e));
        }
        ExprKind::IndexExpr { list, index } => {
            w.u8(tags::INDEX_EXPR);
            encode_expr(w, list);
            encode_expr(w, index);
        }
        ExprKind::LengthExpr { value } => {
            w.u8(tags::LENGTH_EXPR);
            encode_expr(w, value);
        }
        ExprKind::LocationExpr { name } => {
            w.u8(tags::LOCATION_EXPR);
            encode_symbol(w, *name);
        }
        ExprKind::StructInstantiation { struct_name, field_values } => {
            w.u8(tags::STRUCT_INSTANTIATION);
            encode_symbol(w, *struct_name);
            w.list(field_values, |w, e| encode_expr(w, e));
        }
        ExprKind::FieldAccess { object, field } => {
            w.u8(tags::FIELD_ACCESS);
            encode_expr(w, object);
            encode_symbol(w, *field);
        }
        ExprKind::TypeExpr { value } => {
            w.u8(tags::TYPE_EXPR);
            encode_expr(w, value);
        }
        ExprKind::CastExpr { value, type_name } => {
            w.u8(tags::CAST_EXPR);
            encode_expr(w, value);
            encode_symbol(w, *type_name);
        }
        ExprKind::ReferenceExpr { name } => {
            w.u8(tags::REFERENCE_EXPR);
            encode_symbol(w, *name);
        }
        ExprKind::CopyExpr { value } => {
            w.u8(tags::COPY_EXPR);
            encode_expr(w, value);
        }
    }
}
