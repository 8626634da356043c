use crate::error::EvalError;
use crate::value::Value;

fn number(v: &Value, who: &str) -> Result<f64, EvalError> {
    match v {
        Value::Number { value, .. } => Ok(*value),
        other => Err(EvalError::Type(format!("{who} expects a number, got {}", other.type_name()))),
    }
}

pub fn unary(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let x = number(&args[0], name)?;
    let result = match name {
        "sqrt" => x.sqrt(),
        "abs" => x.abs(),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        "round" => x.round(),
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        _ => unreachable!("unary math dispatch for {name}"),
    };
    Ok(Value::number(result))
}

pub fn binary(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let a = number(&args[0], name)?;
    let b = number(&args[1], name)?;
    let result = match name {
        "pow" => a.powf(b),
        "min" => a.min(b),
        "max" => a.max(b),
        _ => unreachable!("binary math dispatch for {name}"),
    };
    Ok(Value::number(result))
}
