//! Database layer: backend collaborator, values, schema model and migrations.
//!
//! This module provides everything below the typed table facade:
//! - The backend contract (`DatabaseBackend`, `RowCursor`) and a SQLite implementation
//! - Root values and the quoting rules used when rendering statements
//! - The schema model (type chain, fields, indexes), its SQL compiler and the
//!   versioned migration engine
//! - Connection configuration (file-backed or in-memory)
//!
//! # Type Decisions
//!
//! **Why a dynamic `Value` at the bottom of a typed API?**
//! Rows are typed end to end (`Field<R, T>`), but the backend binds and returns
//! values positionally. The type chain encodes every `T` to a root `Value`
//! once, so the query compiler and the backend never need to know `T`.
//!
//! **Why `i32` versions with a `-1` sentinel instead of `Option<u32>`?**
//! The physical naming convention (`<name>:v<version>`) and migration reports
//! are shared with existing stores, where `-1` already means "unversioned,
//! always migrate". Keeping the integer avoids a lossy translation layer.

pub mod backend;
pub mod config;
mod connection;
pub mod escape;
pub mod schema;
pub mod sqlite;
pub mod value;

pub use backend::{Binding, BufferedCursor, DatabaseBackend, RowCursor, TableInfo, TableKind};
pub use config::DatabaseConfig;
pub use connection::{open_db, open_mem_db};
pub use escape::{qualified_column, quote_identifier, quote_literal};
pub use sqlite::SqliteBackend;
pub use value::{DatabaseValue, Value};

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to open database '{path}': {message}")]
    OpenFailed { path: String, message: String },

    #[error("Statement failed: {message}\n  statement: {statement}")]
    Statement { statement: String, message: String },

    #[error("Failed to {operation} on '{table}': {source}")]
    Failed {
        operation: &'static str,
        table: String,
        #[source]
        source: Box<DbError>,
    },

    #[error("Schema version conflict on '{table}': target is v{target} but found v{found} in storage")]
    VersionConflict { table: String, target: i32, found: i32 },

    #[error("Invalid schema version {0}: use -1 to always migrate or a non-negative number")]
    InvalidVersion(i32),

    #[error("Source table '{table}' has no primary key column '{column}'")]
    MissingPrimaryKey { table: String, column: String },

    #[error(
        "Column '{column}' is NOT NULL without a default and does not exist in source table '{table}'"
    )]
    UnfillableColumn { table: String, column: String },

    #[error("Failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },

    #[error("Missing column {index} in query result")]
    MissingColumn { index: usize },

    #[error("Index '{name}' must have at least one filter, ordering or field")]
    EmptyIndex { name: String },

    #[error("Unsupported comparison operator flags {0:#05b}")]
    UnsupportedOperator(u8),

    #[error("Column label '{label}' is declared more than once")]
    DuplicateColumn { label: String },

    #[error("No such field with label '{0}'")]
    UnknownField(String),

    #[error("Field '{label}' is not of type {expected}")]
    FieldTypeMismatch { label: String, expected: &'static str },

    #[error("Row factory expected field {index} to be {expected}")]
    FactoryMismatch { index: usize, expected: &'static str },
}

impl DbError {
    /// Wrap an error with the operation and table it happened on.
    pub fn during(operation: &'static str, table: impl Into<String>) -> impl FnOnce(DbError) -> DbError {
        let table = table.into();
        move |source| DbError::Failed {
            operation,
            table,
            source: Box::new(source),
        }
    }

    /// The innermost error, skipping `Failed` context wrappers.
    pub fn root_cause(&self) -> &DbError {
        match self {
            DbError::Failed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether this error signals stored data that cannot be decoded, as
    /// opposed to a connectivity or statement failure.
    pub fn is_decode(&self) -> bool {
        matches!(self.root_cause(), DbError::Decode { .. })
    }
}
