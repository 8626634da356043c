//! Tree-walking evaluator for parsed programs.
//!
//! [`Evaluator::run`] drives a [`abc_ast::Program`] to completion, threading
//! a generational-arena [`Env`] through statement and expression evaluation.
//! Everything needed to embed the interpreter (bytecode codec, cache,
//! CLI) is re-exported from here rather than reaching into submodules.

mod builtins;
mod env;
mod error;
mod eval;
mod signal;
mod value;

pub use env::{Env, FrameId};
pub use error::EvalError;
pub use eval::Evaluator;
pub use signal::{EvalResult, Signal};
pub use value::{
    deep_copy, value_eq, ErrorValue, FieldSpec, FunctionValue, MethodValue, NumTag, StructDef,
    StructInstance, Value,
};
