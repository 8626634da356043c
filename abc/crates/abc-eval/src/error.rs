//! The evaluator's own error taxonomy, each variant mapped to one of the
//! `type` tags an `ErrorValue` can carry.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum EvalError {
    #[error("{0}")]
    Runtime(String),
    #[error("division by zero")]
    ZeroDivision,
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Import(String),
}

impl EvalError {
    pub fn type_name(&self) -> &'static str {
        match self {
            EvalError::Runtime(_) => "RuntimeError",
            EvalError::ZeroDivision => "ZeroDivisionError",
            EvalError::Type(_) => "TypeError",
            EvalError::Import(_) => "ImportError",
        }
    }
}
