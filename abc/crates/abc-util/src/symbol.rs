//! String interning.
//!
//! Identifiers and keyword text are interned into a process-global table so
//! that [`Symbol`] equality and hashing are O(1) integer operations instead
//! of string comparisons. The lexer interns every identifier it produces;
//! the parser and evaluator only ever compare `Symbol`s.

use std::fmt;
use std::sync::RwLock;

use rustc_hash::FxHashMap;

/// An interned string.
///
/// Four bytes, `Copy`, and cheap to compare — the handle, never the data.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

struct Table {
    index: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl Table {
    fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            strings: Vec::new(),
        }
    }

    fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&idx) = self.index.get(s) {
            return Symbol(idx);
        }
        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        let idx = self.strings.len() as u32;
        self.strings.push(leaked);
        self.index.insert(leaked, idx);
        Symbol(idx)
    }

    fn resolve(&self, sym: Symbol) -> &'static str {
        self.strings[sym.0 as usize]
    }
}

static TABLE: std::sync::OnceLock<RwLock<Table>> = std::sync::OnceLock::new();

fn table() -> &'static RwLock<Table> {
    TABLE.get_or_init(|| RwLock::new(Table::new()))
}

impl Symbol {
    /// Intern `s`, returning a handle that compares equal to every other
    /// handle interned from an equal string.
    pub fn intern(s: &str) -> Self {
        table().write().unwrap().intern(s)
    }

    /// Look up the original string. Always succeeds for a `Symbol` obtained
    /// from [`Symbol::intern`].
    pub fn as_str(&self) -> &'static str {
        table().read().unwrap().resolve(*self)
    }

    /// Case-insensitive equality against a plain string, used by keyword
    /// lookup without needing to intern the candidate first.
    pub fn eq_ignore_ascii_case(&self, other: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(other)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_same_symbol() {
        let a = Symbol::intern("declare");
        let b = Symbol::intern("declare");
        assert_eq!(a, b);
    }

    #[test]
    fn different_strings_different_symbols() {
        let a = Symbol::intern("alpha_unique_1");
        let b = Symbol::intern("beta_unique_1");
        assert_ne!(a, b);
    }

    #[test]
    fn round_trips_through_as_str() {
        let s = Symbol::intern("round_trip_me");
        assert_eq!(s.as_str(), "round_trip_me");
    }
}
