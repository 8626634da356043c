use abc_ast::{BinOp, ExprKind, StmtKind};

use crate::parse_source;

fn stmts(src: &str) -> Vec<abc_ast::Stmt> {
    parse_source(src).unwrap().statements
}

#[test]
fn variable_decl_be_form() {
    let s = stmts("Declare x to be 5.");
    assert!(matches!(s[0].kind, StmtKind::VariableDecl { is_constant: false, .. }));
}

#[test]
fn variable_decl_always_be_form() {
    let s = stmts("Declare x to always be 5.");
    assert!(matches!(s[0].kind, StmtKind::VariableDecl { is_constant: true, .. }));
}

#[test]
fn let_decl_accepts_be_equal_to() {
    let s = stmts("Let x be equal to 5.");
    assert!(matches!(s[0].kind, StmtKind::VariableDecl { is_constant: false, .. }));
}

#[test]
fn let_decl_accepts_bare_equal() {
    let s = stmts("Let x equal 5.");
    assert!(matches!(s[0].kind, StmtKind::VariableDecl { .. }));
}

#[test]
fn function_decl_with_params_and_body() {
    let s = stmts(
        "Declare function add that takes a and b and does the following: Return a + b. thats it.",
    );
    match &s[0].kind {
        StmtKind::FunctionDecl { params, body, .. } => {
            assert_eq!(params.len(), 2);
            assert_eq!(body.len(), 1);
        }
        other => panic!("expected FunctionDecl, got {other:?}"),
    }
}

#[test]
fn set_result_of_calling() {
    let s = stmts("Set r to be the result of calling add with 3 and 7.");
    match &s[0].kind {
        StmtKind::Assignment { value, .. } => {
            assert!(matches!(value.kind, ExprKind::FunctionCall { .. }));
        }
        other => panic!("expected Assignment, got {other:?}"),
    }
}

#[test]
fn if_otherwise_if_otherwise_chain() {
    let s = stmts(
        "If x is equal to 1, then Print \"one\". otherwise if x is equal to 2, then Print \"two\". otherwise Print \"other\". thats it.",
    );
    match &s[0].kind {
        StmtKind::IfStatement { elseif_parts, else_branch, .. } => {
            assert_eq!(elseif_parts.len(), 1);
            assert!(else_branch.is_some());
        }
        other => panic!("expected IfStatement, got {other:?}"),
    }
}

#[test]
fn repeat_the_following_n_times() {
    let s = stmts("repeat the following 3 times: Print 1. thats it.");
    assert!(matches!(s[0].kind, StmtKind::ForLoop { .. }));
}

#[test]
fn repeat_forever_lowers_to_while_true() {
    let s = stmts("repeat forever: Break. thats it.");
    match &s[0].kind {
        StmtKind::WhileLoop { condition, .. } => {
            assert!(matches!(condition.kind, ExprKind::BooleanLit(true)));
        }
        other => panic!("expected WhileLoop, got {other:?}"),
    }
}

#[test]
fn repeat_the_following_while() {
    let s = stmts("repeat the following while x is less than 10: Set x to be x + 1. thats it.");
    assert!(matches!(s[0].kind, StmtKind::WhileLoop { .. }));
}

#[test]
fn foreach_loop() {
    let s = stmts("for each item in L, do the following: Print item. thats it.");
    assert!(matches!(s[0].kind, StmtKind::ForEachLoop { .. }));
}

#[test]
fn output_statement_multiple_values() {
    let s = stmts("Print a, b, c.");
    match &s[0].kind {
        StmtKind::OutputStatement { values, trailing_newline } => {
            assert_eq!(values.len(), 3);
            assert!(trailing_newline);
        }
        other => panic!("expected OutputStatement, got {other:?}"),
    }
}

#[test]
fn write_has_no_trailing_newline() {
    let s = stmts("Write a.");
    match &s[0].kind {
        StmtKind::OutputStatement { trailing_newline, .. } => assert!(!trailing_newline),
        other => panic!("expected OutputStatement, got {other:?}"),
    }
}

#[test]
fn index_assignment() {
    let s = stmts("Set the item at position 1 in L to be 99.");
    assert!(matches!(s[0].kind, StmtKind::IndexAssignment { .. }));
}

#[test]
fn field_assignment() {
    let s = stmts("Set the name of person to be \"Ada\".");
    assert!(matches!(s[0].kind, StmtKind::FieldAssignment { .. }));
}

#[test]
fn call_statement_with_args() {
    let s = stmts("Call add with 3 and 7.");
    match &s[0].kind {
        StmtKind::CallStatement { call } => {
            assert!(matches!(call.kind, ExprKind::FunctionCall { .. }));
        }
        other => panic!("expected CallStatement, got {other:?}"),
    }
}

#[test]
fn call_statement_possessive_method() {
    let s = stmts("Call account's deposit with 10.");
    match &s[0].kind {
        StmtKind::CallStatement { call } => {
            assert!(matches!(call.kind, ExprKind::MethodCall { .. }));
        }
        other => panic!("expected CallStatement, got {other:?}"),
    }
}

#[test]
fn struct_decl_with_field_and_method() {
    let s = stmts(
        "Declare account as a structure with the following fields: balance is a number. let deposit to be a function that takes amount and does the following: Set balance to be balance + amount. thats it. thats it.",
    );
    match &s[0].kind {
        StmtKind::StructDecl { fields, methods, .. } => {
            assert_eq!(fields.len(), 1);
            assert_eq!(methods.len(), 1);
        }
        other => panic!("expected StructDecl, got {other:?}"),
    }
}

#[test]
fn try_on_error_but_finally() {
    let s = stmts(
        "try doing the following: raise \"boom\" as MyErr. on error: Print \"caught\". but finally: Print \"done\". thats it.",
    );
    match &s[0].kind {
        StmtKind::TryStatement { try_body, error_body, finally_body } => {
            assert_eq!(try_body.len(), 1);
            assert!(error_body.is_some());
            assert!(finally_body.is_some());
        }
        other => panic!("expected TryStatement, got {other:?}"),
    }
}

#[test]
fn remainder_expr_produces_mod() {
    let s = stmts("Print the remainder of 17 divided by 5.");
    match &s[0].kind {
        StmtKind::OutputStatement { values, .. } => {
            assert!(matches!(values[0].kind, ExprKind::BinaryExpr { op: BinOp::Mod, .. }));
        }
        other => panic!("expected OutputStatement, got {other:?}"),
    }
}

#[test]
fn new_instance_expression() {
    let s = stmts("Set p to be a new instance of Point with 1 and 2.");
    match &s[0].kind {
        StmtKind::Assignment { value, .. } => {
            assert!(matches!(value.kind, ExprKind::StructInstantiation { .. }));
        }
        other => panic!("expected Assignment, got {other:?}"),
    }
}

#[test]
fn reference_and_copy_expressions() {
    let s = stmts("Declare r to be a reference to x.");
    match &s[0].kind {
        StmtKind::VariableDecl { value, .. } => assert!(matches!(value.kind, ExprKind::ReferenceExpr { .. })),
        other => panic!("expected VariableDecl, got {other:?}"),
    }
    let s2 = stmts("Declare y to be a copy of x.");
    match &s2[0].kind {
        StmtKind::VariableDecl { value, .. } => assert!(matches!(value.kind, ExprKind::CopyExpr { .. })),
        other => panic!("expected VariableDecl, got {other:?}"),
    }
}

#[test]
fn arithmetic_precedence() {
    let s = stmts("Print 2 + 3 * 4.");
    match &s[0].kind {
        StmtKind::OutputStatement { values, .. } => match &values[0].kind {
            ExprKind::BinaryExpr { op: BinOp::Add, right, .. } => {
                assert!(matches!(right.kind, ExprKind::BinaryExpr { op: BinOp::Mul, .. }));
            }
            other => panic!("expected additive BinaryExpr, got {other:?}"),
        },
        other => panic!("expected OutputStatement, got {other:?}"),
    }
}

#[test]
fn missing_period_reports_hint() {
    let err = parse_source("Declare x to be 5").unwrap_err();
    assert_eq!(err.expected, "PERIOD");
}

#[test]
fn missing_thats_it_reports_hint() {
    // function_decl (unlike if/repeat/for-each) mandates the "thats it."
    // terminator, so dropping it is a genuine parse error here.
    let err = parse_source("Declare function f that takes a and does the following: Return a.").unwrap_err();
    assert_eq!(err.expected, "THATS");
}
