//! Foundation types shared by every stage of the pipeline: interned
//! symbols, source spans, diagnostics, a typed-index arena helper, and the
//! Levenshtein-based name suggester used for "did you mean" errors.

mod diagnostic;
mod idx;
mod span;
mod suggest;
mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use idx::{Idx, IndexVec};
pub use span::{Pos, Span};
pub use suggest::{levenshtein, suggest};
pub use symbol::Symbol;
