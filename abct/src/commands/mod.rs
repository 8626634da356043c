//! Subcommand implementations, one module per lifecycle operation.

pub mod cache;
pub mod run;
