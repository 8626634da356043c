//! Binary serialization of a parsed [`abc_ast::Program`].
//!
//! A tag byte per node, fields in declaration order, no derive macro in the
//! loop — the wire format's tag numbering and field layout are part of the
//! contract a cache file on disk has to honor across runs, not a detail a
//! `serde`/`bincode` derive would be free to rearrange on an upgrade.
//!
//! ```text
//! [0..4)  magic bytes: 10 1E 4E 47
//! [4]     format version: 01
//! [5..)   body: tagged Program
//! ```

mod decode;
mod encode;
mod error;
mod reader;
mod tags;
mod writer;

pub use decode::decode_program;
pub use encode::{encode_program, MAGIC, VERSION};
pub use error::BytecodeError;

#[cfg(test)]
mod tests {
    use super::*;
    use abc_ast::{BinOp, Expr, ExprKind, Program, Stmt, StmtKind};
    use abc_util::{Span, Symbol};

    fn num(n: f64) -> Expr {
        Expr::new(ExprKind::NumberLit(n), Span::DUMMY)
    }

    #[test]
    fn header_carries_magic_and_version() {
        let program = Program { statements: vec![] };
        let bytes = encode_program(&program);
        assert_eq!(&bytes[0..4], &MAGIC);
        assert_eq!(bytes[4], VERSION);
    }

    #[test]
    fn empty_program_round_trips() {
        let program = Program { statements: vec![] };
        let bytes = encode_program(&program);
        let decoded = decode_program(&bytes).unwrap();
        assert_eq!(decoded.statements.len(), 0);
    }

    #[test]
    fn variable_decl_and_binary_expr_round_trip() {
        let program = Program {
            statements: vec![Stmt::new(
                StmtKind::VariableDecl {
                    name: Symbol::intern("x"),
                    is_constant: false,
                    value: Expr::new(
                        ExprKind::BinaryExpr {
                            left: Box::new(num(1.0)),
                            op: BinOp::Add,
                            right: Box::new(num(2.0)),
                        },
                        Span::DUMMY,
                    ),
                },
                Span::DUMMY,
            )],
        };
        let bytes = encode_program(&program);
        let decoded = decode_program(&bytes).unwrap();
        match &decoded.statements[0].kind {
            StmtKind::VariableDecl { name, is_constant, value } => {
                assert_eq!(name.as_str(), "x");
                assert!(!is_constant);
                match &value.kind {
                    ExprKind::BinaryExpr { op, .. } => assert_eq!(*op, BinOp::Add),
                    other => panic!("wrong expr kind: {other:?}"),
                }
            }
            other => panic!("wrong stmt kind: {other:?}"),
        }
    }

    #[test]
    fn string_with_non_ascii_round_trips() {
        let program = Program {
            statements: vec![Stmt::new(
                StmtKind::OutputStatement {
                    values: vec![Expr::new(ExprKind::StringLit(Symbol::intern("caf\u{e9} \u{2603}")), Span::DUMMY)],
                    trailing_newline: true,
                },
                Span::DUMMY,
            )],
        };
        let bytes = encode_program(&program);
        let decoded = decode_program(&bytes).unwrap();
        match &decoded.statements[0].kind {
            StmtKind::OutputStatement { values, .. } => match &values[0].kind {
                ExprKind::StringLit(s) => assert_eq!(s.as_str(), "caf\u{e9} \u{2603}"),
                other => panic!("wrong expr kind: {other:?}"),
            },
            other => panic!("wrong stmt kind: {other:?}"),
        }
    }

    #[test]
    fn bad_magic_is_rejected() {
        let err = decode_program(&[0, 0, 0, 0, VERSION]).unwrap_err();
        assert_eq!(err, BytecodeError::BadMagic);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut bytes = MAGIC.to_vec();
        bytes.push(0xFF);
        let err = decode_program(&bytes).unwrap_err();
        assert_eq!(err, BytecodeError::UnsupportedVersion { found: 0xFF, expected: VERSION });
    }

    #[test]
    fn truncated_body_is_rejected() {
        let mut bytes = MAGIC.to_vec();
        bytes.push(VERSION);
        bytes.push(tags::PROGRAM);
        // claims 1 statement, but supplies none
        bytes.extend_from_slice(&1u32.to_le_bytes());
        let err = decode_program(&bytes).unwrap_err();
        assert!(matches!(err, BytecodeError::Truncated { .. }));
    }

    #[test]
    fn invalid_tag_is_rejected() {
        let mut bytes = MAGIC.to_vec();
        bytes.push(VERSION);
        bytes.push(0xEE);
        let err = decode_program(&bytes).unwrap_err();
        assert_eq!(err, BytecodeError::InvalidTag(0xEE));
    }

    #[test]
    fn nested_if_with_elseif_and_else_round_trips() {
        let program = Program {
            statements: vec![Stmt::new(
                StmtKind::IfStatement {
                    condition: num(1.0),
                    then_branch: vec![Stmt::new(StmtKind::BreakStatement, Span::DUMMY)],
                    elseif_parts: vec![abc_ast::ElseIf {
                        condition: num(2.0),
                        then_branch: vec![Stmt::new(StmtKind::BreakStatement, Span::DUMMY)],
                    }],
                    else_branch: Some(vec![Stmt::new(StmtKind::BreakStatement, Span::DUMMY)]),
                },
                Span::DUMMY,
            )],
        };
        let bytes = encode_program(&program);
        let decoded = decode_program(&bytes).unwrap();
        match &decoded.statements[0].kind {
            StmtKind::IfStatement { elseif_parts, else_branch, .. } => {
                assert_eq!(elseif_parts.len(), 1);
                assert!(else_branch.is_some());
            }
            other => panic!("wrong stmt kind: {other:?}"),
        }
    }
}
