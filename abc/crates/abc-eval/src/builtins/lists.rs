use crate::error::EvalError;
use crate::value::Value;

fn items(v: &Value, who: &str) -> Result<Vec<Value>, EvalError> {
    match v {
        Value::List(items) => Ok(items.borrow().clone()),
        other => Err(EvalError::Type(format!("{who} expects a list, got {}", other.type_name()))),
    }
}

fn index(v: &Value, who: &str) -> Result<usize, EvalError> {
    match v {
        Value::Number { value, .. } if *value >= 0.0 => Ok(*value as usize),
        Value::Number { .. } => Err(EvalError::Runtime(format!("{who}: index out of bounds"))),
        other => Err(EvalError::Type(format!("{who} expects a number index, got {}", other.type_name()))),
    }
}

pub fn append(args: &[Value]) -> Result<Value, EvalError> {
    let mut list = items(&args[0], "append")?;
    list.push(args[1].clone());
    Ok(Value::list(list))
}

pub fn remove(args: &[Value]) -> Result<Value, EvalError> {
    let mut list = items(&args[0], "remove")?;
    let idx = index(&args[1], "remove")?;
    if idx >= list.len() {
        return Err(EvalError::Runtime("remove: index out of bounds".to_string()));
    }
    list.remove(idx);
    Ok(Value::list(list))
}

pub fn insert(args: &[Value]) -> Result<Value, EvalError> {
    let mut list = items(&args[0], "insert")?;
    let idx = index(&args[1], "insert")?;
    if idx > list.len() {
        return Err(EvalError::Runtime("insert: index out of bounds".to_string()));
    }
    list.insert(idx, args[2].clone());
    Ok(Value::list(list))
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number { value, .. } => Some(*value),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

pub fn sort(args: &[Value]) -> Result<Value, EvalError> {
    let mut list = items(&args[0], "sort")?;
    let all_numeric = list.iter().all(|v| as_number(v).is_some());
    if all_numeric {
        list.sort_by(|a, b| as_number(a).unwrap().partial_cmp(&as_number(b).unwrap()).unwrap());
    } else {
        list.sort_by(|a, b| a.stringify().cmp(&b.stringify()));
    }
    Ok(Value::list(list))
}

pub fn reverse(args: &[Value]) -> Result<Value, EvalError> {
    let mut list = items(&args[0], "reverse")?;
    list.reverse();
    Ok(Value::list(list))
}
