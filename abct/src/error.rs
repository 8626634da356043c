//! Error handling for the abct CLI.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AbctError {
    #[error("{0}")]
    Parse(#[from] abc_par::ParseError),

    #[error("Runtime Error: {message}")]
    Runtime {
        message: String,
        call_stack: Vec<String>,
    },

    #[error("{0}")]
    Bytecode(#[from] abc_bc::BytecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl From<abc_eval::ErrorValue> for AbctError {
    fn from(err: abc_eval::ErrorValue) -> Self {
        AbctError::Runtime { message: err.message, call_stack: err.call_stack }
    }
}

impl AbctError {
    /// The exact user-visible text from the error-handling design: for a
    /// runtime failure, "Runtime Error: <message>" followed by one line per
    /// call-stack frame; every other variant prints its own formatted
    /// diagnostic as-is.
    pub fn render(&self) -> String {
        match self {
            AbctError::Runtime { message, call_stack } => {
                let mut out = format!("Runtime Error: {message}");
                for frame in call_stack {
                    out.push('\n');
                    out.push_str(frame);
                }
                out
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AbctError>;
