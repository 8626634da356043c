use thiserror::Error;

/// Failure modes of the bytecode codec.
///
/// The decoder always returns one of these instead of panicking — a
/// truncated or foreign file is an expected input, not a bug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BytecodeError {
    #[error("not an abc bytecode file: bad magic bytes")]
    BadMagic,
    #[error("unsupported bytecode version {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },
    #[error("truncated bytecode: expected {needed} more byte(s) at offset {at}")]
    Truncated { at: usize, needed: usize },
    #[error("invalid node tag {0:#04x}")]
    InvalidTag(u8),
    #[error("invalid utf-8 in bytecode string: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
