//! Bytecode → AST, the inverse of [`crate::encode`].
//!
//! Decoded nodes carry [`Span::DUMMY`]: nothing downstream of parsing reads
//! a span at runtime (errors report the call stack, not source position),
//! so the wire format omits it rather than inflating every node by two
//! `Pos` pairs for a value nothing consumes.

use abc_ast::{ElseIf, Expr, ExprKind, FieldDecl, MethodDecl, Program, Stmt, StmtKind};
use abc_util::{Span, Symbol};

use crate::encode::{MAGIC, VERSION};
use crate::error::BytecodeError;
use crate::reader::Reader;
use crate::tags;

pub fn decode_program(bytes: &[u8]) -> Result<Program, BytecodeError> {
    let mut r = Reader::new(bytes);
    for expected in MAGIC {
        if r.u8()? != expected {
            return Err(BytecodeError::BadMagic);
        }
    }
    let version = r.u8()?;
    if version != VERSION {
        return Err(BytecodeError::UnsupportedVersion { found: version, expected: VERSION });
    }
    let tag = r.u8()?;
    if tag != tags::PROGRAM {
        return Err(BytecodeError::InvalidTag(tag));
    }
    let statements = r.list(decode_stmt)?;
    Ok(Program { statements })
}

fn decode_symbol(r: &mut Reader) -> Result<Symbol, BytecodeError> {
    Ok(Symbol::intern(&r.string()?))
}

fn decode_stmt(r: &mut Reader) -> Result<Stmt, BytecodeError> {
    let tag = r.u8()?;
    let kind = match tag {
        tags::VARIABLE_DECL => StmtKind::VariableDecl {
            name: decode_symbol(r)?,
            is_constant: r.bool()?,
            value: decode_expr(r)?,
        },
        tags::TYPED_VARIABLE_DECL => StmtKind::TypedVariableDecl {
            name: decode_symbol(r)?,
            type_name: decode_symbol(r)?,
            is_constant: r.bool()?,
            value: decode_expr(r)?,
        },
        tags::ASSIGNMENT => StmtKind::Assignment {
            name: decode_symbol(r)?,
            value: decode_expr(r)?,
        },
        tags::INDEX_ASSIGNMENT => StmtKind::IndexAssignment {
            list_name: decode_symbol(r)?,
            index: decode_expr(r)?,
            value: decode_expr(r)?,
        },
        tags::FIELD_ASSIGNMENT => StmtKind::FieldAssignment {
            object_name: decode_symbol(r)?,
            field: decode_symbol(r)?,
            value: decode_expr(r)?,
        },
        tags::FUNCTION_DECL => StmtKind::FunctionDecl {
            name: decode_symbol(r)?,
            params: r.list(decode_symbol)?,
            body: r.list(decode_stmt)?,
        },
        tags::STRUCT_DECL => StmtKind::StructDecl {
            name: decode_symbol(r)?,
            fields: r.list(decode_field_decl)?,
            methods: r.list(decode_method_decl)?,
        },
        tags::CALL_STATEMENT => StmtKind::CallStatement { call: decode_expr(r)? },
        tags::IF_STATEMENT => StmtKind::IfStatement {
            condition: decode_expr(r)?,
            then_branch: r.list(decode_stmt)?,
            elseif_parts: r.list(decode_elseif)?,
            else_branch: r.option(|r| r.list(decode_stmt))?,
        },
        tags::WHILE_LOOP => StmtKind::WhileLoop {
            condition: decode_expr(r)?,
            body: r.list(decode_stmt)?,
        },
        tags::FOR_LOOP => StmtKind::ForLoop {
            count: decode_expr(r)?,
            body: r.list(decode_stmt)?,
        },
        tags::FOR_EACH_LOOP => StmtKind::ForEachLoop {
            item_name: decode_symbol(r)?,
            list: decode_expr(r)?,
            body: r.list(decode_stmt)?,
        },
        tags::OUTPUT_STATEMENT => StmtKind::OutputStatement {
            values: r.list(decode_expr)?,
            trailing_newline: r.bool()?,
        },
        tags::RETURN_STATEMENT => StmtKind::ReturnStatement { value: decode_expr(r)? },
        tags::BREAK_STATEMENT => StmtKind::BreakStatement,
        tags::TOGGLE_STATEMENT => StmtKind::ToggleStatement { name: decode_symbol(r)? },
        tags::SWAP_STATEMENT => StmtKind::SwapStatement {
            name1: decode_symbol(r)?,
            name2: decode_symbol(r)?,
        },
        tags::TRY_STATEMENT => StmtKind::TryStatement {
            try_body: r.list(decode_stmt)?,
            error_body: r.option(|r| r.list(decode_stmt))?,
            finally_body: r.option(|r| r.list(decode_stmt))?,
        },
        tags::RAISE_STATEMENT => StmtKind::RaiseStatement {
            message: decode_expr(r)?,
            error_type: decode_symbol(r)?,
        },
        tags::IMPORT_STATEMENT => StmtKind::ImportStatement { path: decode_symbol(r)? },
        other => return Err(BytecodeError::InvalidTag(other)),
    };
    Ok(Stmt::new(kind, Span::DUMMY))
}

fn decode_field_decl(r: &mut Reader) -> Result<FieldDecl, BytecodeError> {
    Ok(FieldDecl {
        name: decode_symbol(r)?,
        type_name: decode_symbol(r)?,
        unsigned: r.bool()?,
        default: r.option(decode_expr)?,
    })
}

fn decode_method_decl(r: &mut Reader) -> Result<MethodDecl, BytecodeError> {
    Ok(MethodDecl {
        name: decode_symbol(r)?,
        params: r.list(decode_symbol)?,
        body: r.list(decode_stmt)?,
        span: Span::DUMMY,
    })
}

fn decode_elseif(r: &mut Reader) -> Result<ElseIf, BytecodeError> {
    Ok(ElseIf {
        condition: decode_expr(r)?,
        then_branch: r.list(decode_stmt)?,
    })
}

fn decode_binop(r: &mut Reader) -> Result<abc_ast::BinOp, BytecodeError> {
    use abc_ast::BinOp::*;
    let tag = r.u8()?;
    Ok(match tag {
        tags::OP_ADD => Add,
        tags::OP_SUB => Sub,
        tags::OP_MUL => Mul,
        tags::OP_DIV => Div,
        tags::OP_MOD => Mod,
        tags::OP_EQ => Eq,
        tags::OP_NE => Ne,
        tags::OP_LT => Lt,
        tags::OP_GT => Gt,
        tags::OP_LE => Le,
        tags::OP_GE => Ge,
        other => return Err(BytecodeError::InvalidTag(other)),
    })
}

fn decode_unop(r: &mut Reader) -> Result<abc_ast::UnOp, BytecodeError> {
    use abc_ast::UnOp::*;
    let tag = r.u8()?;
    Ok(match tag {
        tags::UNOP_NEG => Neg,
        other => return Err(BytecodeError::InvalidTag(other)),
    })
}

fn decode_expr(r: &mut Reader) -> Result<Expr, BytecodeError> {
    let tag = r.u8()?;
    let kind = match tag {
        tags::NUMBER_LIT => ExprKind::NumberLit(r.f64()?),
        tags::STRING_LIT => ExprKind::StringLit(decode_symbol(r)?),
        tags::BOOLEAN_LIT => ExprKind::BooleanLit(r.bool()?),
        tags::LIST_LIT => ExprKind::ListLit(r.list(decode_expr)?),
        tags::IDENTIFIER => ExprKind::Identifier(decode_symbol(r)?),
        tags::BINARY_EXPR => {
            let left = Box::new(decode_expr(r)?);
            let op = decode_binop(r)?;
            let right = Box::new(decode_expr(r)?);
            ExprKind::BinaryExpr { left, op, right }
        }
        tags::UNARY_EXPR => {
            let op = decode_unop(r)?;
            let right = Box::new(decode_expr(r)?);
            ExprKind::UnaryExpr { op, right }
        }
        tags::FUNCTION_CALL => ExprKind::FunctionCall {
            name: decode_symbol(r)?,
            args: r.list(decode_expr)?,
        },
        tags::METHOD_CALL => {
            let object = Box::new(decode_expr(r)?);
            let method = decode_symbol(r)?;
            let args = r.list(decode_expr)?;
            ExprKind::MethodCall { object, method, args }
        }
        tags::INDEX_EXPR => {
            let list = Box::new(decode_expr(r)?);
            let index = Box::new(decode_expr(r)?);
            ExprKind::IndexExpr { list, index }
        }
        tags::LENGTH_EXPR => ExprKind::LengthExpr { value: Box::new(decode_expr(r)?) },
        tags::LOCATION_EXPR => ExprKind::LocationExpr { name: decode_symbol(r)? },
        tags::STRUCT_INSTANTIATION => ExprKind::StructInstantiation {
            struct_name: decode_symbol(r)?,
            field_values: r.list(decode_expr)?,
        },
        tags::FIELD_ACCESS => {
            let object = Box::new(decode_expr(r)?);
            let field = decode_symbol(r)?;
            ExprKind::FieldAccess { object, field }
        }
        tags::TYPE_EXPR => ExprKind::TypeExpr { value: Box::new(decode_expr(r)?) },
        tags::CAST_EXPR => {
            let value = Box::new(decode_expr(r)?);
            let type_name = decode_symbol(r)?;
            ExprKind::CastExpr { value, type_name }
        }
        tags::REFERENCE_EXPR => ExprKind::ReferenceExpr { name: decode_symbol(r)? },
        tags::COPY_EXPR => ExprKind::CopyExpr { value: Box::new(decode_expr(r)?) },
        other => return Err(BytecodeError::InvalidTag(other)),
    };
    Ok(Expr::new(kind, Span::DUMMY))
}
