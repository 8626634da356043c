//! The closed tag enumeration. Expressions and statements share one
//! namespace (they're disjoint-valued in the tree) plus a tag for the
//! `Program` root itself, so the decoder's outermost dispatch looks the
//! same shape as every nested one.

pub const PROGRAM: u8 = 1;

// StmtKind, in declaration order.
pub const VARIABLE_DECL: u8 = 2;
pub const TYPED_VARIABLE_DECL: u8 = 3;
pub const ASSIGNMENT: u8 = 4;
pub const INDEX_ASSIGNMENT: u8 = 5;
pub const FIELD_ASSIGNMENT: u8 = 6;
pub const FUNCTION_DECL: u8 = 7;
pub const STRUCT_DECL: u8 = 8;
pub const CALL_STATEMENT: u8 = 9;
pub const IF_STATEMENT: u8 = 10;
pub const WHILE_LOOP: u8 = 11;
pub const FOR_LOOP: u8 = 12;
pub const FOR_EACH_LOOP: u8 = 13;
pub const OUTPUT_STATEMENT: u8 = 14;
pub const RETURN_STATEMENT: u8 = 15;
pub const BREAK_STATEMENT: u8 = 16;
pub const TOGGLE_STATEMENT: u8 = 17;
pub const SWAP_STATEMENT: u8 = 18;
pub const TRY_STATEMENT: u8 = 19;
pub const RAISE_STATEMENT: u8 = 20;
pub const IMPORT_STATEMENT: u8 = 21;

// ExprKind, in declaration order.
pub const NUMBER_LIT: u8 = 22;
pub const STRING_LIT: u8 = 23;
pub const BOOLEAN_LIT: u8 = 24;
pub const LIST_LIT: u8 = 25;
pub const IDENTIFIER: u8 = 26;
pub const BINARY_EXPR: u8 = 27;
pub const UNARY_EXPR: u8 = 28;
pub const FUNCTION_CALL: u8 = 29;
pub const METHOD_CALL: u8 = 30;
pub const INDEX_EXPR: u8 = 31;
pub const LENGTH_EXPR: u8 = 32;
pub const LOCATION_EXPR: u8 = 33;
pub const STRUCT_INSTANTIATION: u8 = 34;
pub const FIELD_ACCESS: u8 = 35;
pub const TYPE_EXPR: u8 = 36;
pub const CAST_EXPR: u8 = 37;
pub const REFERENCE_EXPR: u8 = 38;
pub const COPY_EXPR: u8 = 39;

// BinOp, its own byte-sized namespace (never confused with a node tag
// since it only ever appears as BINARY_EXPR's immediate second byte).
pub const OP_ADD: u8 = 0;
pub const OP_SUB: u8 = 1;
pub const OP_MUL: u8 = 2;
pub const OP_DIV: u8 = 3;
pub const OP_MOD: u8 = 4;
pub const OP_EQ: u8 = 5;
pub const OP_NE: u8 = 6;
pub const OP_LT: u8 = 7;
pub const OP_GT: u8 = 8;
pub const OP_LE: u8 = 9;
pub const OP_GE: u8 = 10;

// UnOp.
pub const UNOP_NEG: u8 = 0;
