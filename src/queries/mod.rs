//! Query layer: filter AST, statement compilation and typed results.

pub mod builder;
pub mod filter;
pub mod result;

pub use builder::{CompiledQuery, Mode, compile_filter, compile_ordering};
pub use filter::{Filter, Operator, SortBy, SortOrder};
pub use result::QueryResult;
