//! table_schema library - typed, versioned relational tables
//!
//! Declare a row type's storage shape once as a [`Schema`](db::schema::Schema)
//! and get table creation, versioned migration, filtered queries, inserts,
//! updates and deletes compiled against a relational backend.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod output;
pub mod queries;
pub mod table;

pub use db::schema::{Constraint, Field, Index, MigrationReport, Schema, types};
pub use db::{DatabaseBackend, DbError};
pub use queries::filter;
pub use queries::{Filter, QueryResult, SortBy};
pub use table::{Database, Table};

#[macro_use]
pub mod test_macros;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
