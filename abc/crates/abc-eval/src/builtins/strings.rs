use crate::error::EvalError;
use crate::value::Value;

fn text(v: &Value, who: &str) -> Result<String, EvalError> {
    match v {
        Value::String(s) => Ok(s.to_string()),
        other => Err(EvalError::Type(format!("{who} expects a string, got {}", other.type_name()))),
    }
}

pub fn unary(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let s = text(&args[0], name)?;
    let result = match name {
        "uppercase" => s.to_uppercase(),
        "lowercase" => s.to_lowercase(),
        "trim" => s.trim().to_string(),
        _ => unreachable!("unary string dispatch for {name}"),
    };
    Ok(Value::string(result))
}

pub fn split(args: &[Value]) -> Result<Value, EvalError> {
    let s = text(&args[0], "split")?;
    let sep = text(&args[1], "split")?;
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::string(c.to_string())).collect()
    } else {
        s.split(sep.as_str()).map(Value::string).collect()
    };
    Ok(Value::list(parts))
}

pub fn join(args: &[Value]) -> Result<Value, EvalError> {
    let list = match &args[0] {
        Value::List(items) => items.borrow().clone(),
        other => return Err(EvalError::Type(format!("join expects a list, got {}", other.type_name()))),
    };
    let sep = text(&args[1], "join")?;
    let rendered: Vec<String> = list.iter().map(Value::stringify).collect();
    Ok(Value::string(rendered.join(&sep)))
}

pub fn replace(args: &[Value]) -> Result<Value, EvalError> {
    let s = text(&args[0], "replace")?;
    let old = text(&args[1], "replace")?;
    let new = text(&args[2], "replace")?;
    Ok(Value::string(s.replace(old.as_str(), &new)))
}

pub fn contains(args: &[Value]) -> Result<Value, EvalError> {
    let s = text(&args[0], "contains")?;
    let sub = text(&args[1], "contains")?;
    Ok(Value::Bool(s.contains(sub.as_str())))
}
