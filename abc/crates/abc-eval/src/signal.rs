//! Non-local control flow, propagated through `Result::Err` instead of as
//! `Value` variants: `?` carries a `Return`, a `Break`, or a raised error
//! up through however many nested blocks separate the producer from the
//! construct that consumes it (the nearest loop, the nearest call, or the
//! top of the program).

use crate::value::ErrorValue;
use crate::value::Value;

pub enum Signal {
    Return(Value),
    Break,
    Raised(ErrorValue),
}

pub type EvalResult<T> = Result<T, Signal>;
