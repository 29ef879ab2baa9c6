//! Schema compilers.
//!
//! Turn schema declarations into the statement text a backend executes.

pub mod sql;

pub use sql::SqlCompiler;
