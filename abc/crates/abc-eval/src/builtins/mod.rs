//! Standard library: registered into the root frame as [`FunctionValue`]s
//! with an empty body — the body's emptiness is the sentinel that tells
//! [`crate::eval::Evaluator::call_function`] to dispatch here by name
//! instead of executing a body.

mod lists;
mod math;
mod strings;

use std::rc::Rc;

use abc_util::Symbol;

use crate::env::Env;
use crate::error::EvalError;
use crate::value::{FunctionValue, Value};

/// `(name, arity)` for every builtin — arity doubles as the stub
/// [`FunctionValue`]'s parameter count, so ordinary call-site arity
/// checking covers builtins for free.
const BUILTINS: &[(&str, usize)] = &[
    ("sqrt", 1),
    ("pow", 2),
    ("abs", 1),
    ("floor", 1),
    ("ceil", 1),
    ("round", 1),
    ("min", 2),
    ("max", 2),
    ("sin", 1),
    ("cos", 1),
    ("tan", 1),
    ("uppercase", 1),
    ("lowercase", 1),
    ("split", 2),
    ("join", 2),
    ("trim", 1),
    ("replace", 3),
    ("contains", 2),
    ("append", 2),
    ("remove", 2),
    ("insert", 3),
    ("sort", 1),
    ("reverse", 1),
];

/// Populates `frame` (normally the environment root) with a stub
/// [`FunctionValue`] per builtin.
pub fn install(env: &mut Env, frame: crate::env::FrameId) {
    for &(name, arity) in BUILTINS {
        let sym = Symbol::intern(name);
        let params = (0..arity).map(|i| Symbol::intern(&format!("_{i}"))).collect();
        let stub = Rc::new(FunctionValue {
            name: sym,
            params,
            body: Rc::from(Vec::new().into_boxed_slice()),
            closure_frame: frame,
        });
        env.define_function(frame, sym, stub);
    }
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.iter().any(|&(n, _)| n == name)
}

pub fn dispatch(name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    match name {
        "sqrt" | "abs" | "floor" | "ceil" | "round" | "sin" | "cos" | "tan" => math::unary(name, &args),
        "pow" | "min" | "max" => math::binary(name, &args),
        "uppercase" | "lowercase" | "trim" => strings::unary(name, &args),
        "split" => strings::split(&args),
        "join" => strings::join(&args),
        "replace" => strings::replace(&args),
        "contains" => strings::contains(&args),
        "append" => lists::append(&args),
        "remove" => lists::remove(&args),
        "insert" => lists::insert(&args),
        "sort" => lists::sort(&args),
        "reverse" => lists::reverse(&args),
        _ => Err(EvalError::Runtime(format!("no such builtin '{name}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_of_nine() {
        let v = dispatch("sqrt", vec![Value::number(9.0)]).unwrap();
        assert!(matches!(v, Value::Number { value, .. } if value == 3.0));
    }

    #[test]
    fn append_does_not_mutate_argument() {
        let original = Value::list(vec![Value::number(1.0)]);
        let Value::List(backing) = original.clone() else { unreachable!() };
        let appended = dispatch("append", vec![original, Value::number(2.0)]).unwrap();
        assert_eq!(backing.borrow().len(), 1);
        match appended {
            Value::List(items) => assert_eq!(items.borrow().len(), 2),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn sort_numeric() {
        let list = Value::list(vec![Value::number(3.0), Value::number(1.0), Value::number(2.0)]);
        let sorted = dispatch("sort", vec![list]).unwrap();
        match sorted {
            Value::List(items) => {
                let nums: Vec<f64> = items
                    .borrow()
                    .iter()
                    .map(|v| match v {
                        Value::Number { value, .. } => *value,
                        _ => panic!("expected number"),
                    })
                    .collect();
                assert_eq!(nums, vec![1.0, 2.0, 3.0]);
            }
            _ => panic!("expected list"),
        }
    }
}
