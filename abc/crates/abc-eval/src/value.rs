//! Runtime value representation.
//!
//! Closures and struct instances are `Rc`-shared so that assigning a value
//! around copies a handle, not the underlying storage — lists and struct
//! fields are mutable in place, matching the evaluator's value semantics.

use std::cell::RefCell;
use std::rc::Rc;

use abc_ast::{Expr, Stmt};
use abc_util::Symbol;
use indexmap::IndexMap;

use crate::env::FrameId;

/// Tag carried alongside a number recording which cast (if any) produced it.
///
/// Arithmetic always yields `Untyped`: "typed casts... are converted to
/// float on arithmetic use" (a cast result only keeps its narrower identity
/// until the next operator touches it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumTag {
    Untyped,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
}

impl NumTag {
    /// The string `type of` reports for a number carrying this tag.
    pub fn type_name(self, value: f64) -> &'static str {
        match self {
            NumTag::Untyped => {
                if value.fract() == 0.0 {
                    "i32"
                } else {
                    "f64"
                }
            }
            NumTag::I32 => "i32",
            NumTag::I64 => "i64",
            NumTag::U32 => "u32",
            NumTag::U64 => "u64",
            NumTag::F32 => "f32",
            NumTag::F64 => "f64",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionValue {
    pub name: Symbol,
    pub params: Vec<Symbol>,
    /// Empty body marks a standard-library builtin, dispatched by name.
    pub body: Rc<[Stmt]>,
    pub closure_frame: FrameId,
}

#[derive(Debug, Clone)]
pub struct MethodValue {
    pub name: Symbol,
    pub params: Vec<Symbol>,
    pub body: Rc<[Stmt]>,
    pub closure_frame: FrameId,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: Symbol,
    pub type_name: Symbol,
    pub unsigned: bool,
    pub default: Option<Expr>,
}

#[derive(Debug)]
pub struct StructDef {
    pub name: Symbol,
    pub fields: Vec<FieldSpec>,
    pub methods: rustc_hash::FxHashMap<Symbol, MethodValue>,
    /// Frame active at the struct's declaration; field defaults evaluate
    /// here, same as a method's closure.
    pub closure_frame: FrameId,
}

#[derive(Debug)]
pub struct StructInstance {
    pub def: Rc<StructDef>,
    pub fields: IndexMap<Symbol, Value>,
}

/// `{message, type, call_stack}` — the shape every raised error takes once
/// caught by `try`, per the error-handling design.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    pub message: String,
    pub type_name: String,
    pub call_stack: Vec<String>,
}

#[derive(Clone)]
pub enum Value {
    Number { value: f64, tag: NumTag },
    String(Rc<str>),
    Bool(bool),
    List(Rc<RefCell<Vec<Value>>>),
    Function(Rc<FunctionValue>),
    Struct(Rc<RefCell<StructInstance>>),
    Reference { frame: FrameId, name: Symbol, generation: u32 },
    Error(Rc<ErrorValue>),
    Null,
}

impl Value {
    pub fn number(value: f64) -> Self {
        Value::Number { value, tag: NumTag::Untyped }
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn is_truthy_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string `type of` reports, per the closed type-tag set.
    pub fn type_name(&self) -> String {
        match self {
            Value::Number { value, tag } => tag.type_name(*value).to_string(),
            Value::String(_) => "string".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Function(_) => "function".to_string(),
            Value::Struct(inst) => inst.borrow().def.name.to_string(),
            Value::Reference { .. } => "reference".to_string(),
            Value::Error(_) => "error".to_string(),
            Value::Null => "null".to_string(),
        }
    }

    /// Canonical text form, used by `print`/`write`, string concatenation,
    /// and cast-to-string.
    pub fn stringify(&self) -> String {
        match self {
            Value::Number { value, .. } => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    format!("{value}")
                }
            }
            Value::String(s) => s.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::List(items) => {
                let rendered: Vec<String> = items.borrow().iter().map(Value::stringify).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Function(f) => format!("<function {}>", f.name),
            Value::Struct(inst) => format!("<{} instance>", inst.borrow().def.name),
            Value::Reference { name, .. } => format!("<reference to {name}>"),
            Value::Error(e) => format!("{}: {}", e.type_name, e.message),
            Value::Null => "null".to_string(),
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Value({})", self.stringify())
    }
}

/// "is equal to"/"is not equal to": defined only between same-tagged
/// values; cross-type equality is false, never an error.
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number { value: x, .. }, Value::Number { value: y, .. }) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Null, Value::Null) => true,
        (Value::List(x), Value::List(y)) => {
            let x = x.borrow();
            let y = y.borrow();
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| value_eq(a, b))
        }
        _ => false,
    }
}

/// Deep-copies lists and struct instances; primitives (and references,
/// functions, errors) are already return-by-value handles.
pub fn deep_copy(v: &Value) -> Value {
    match v {
        Value::List(items) => {
            let copied: Vec<Value> = items.borrow().iter().map(deep_copy).collect();
            Value::list(copied)
        }
        Value::Struct(inst) => {
            let inst = inst.borrow();
            let fields = inst.fields.iter().map(|(k, v)| (*k, deep_copy(v))).collect();
            Value::Struct(Rc::new(RefCell::new(StructInstance { def: inst.def.clone(), fields })))
        }
        other => other.clone(),
    }
}
