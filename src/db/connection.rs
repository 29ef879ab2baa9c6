//! Database connection management.

use std::path::Path;

use super::DbError;
use super::sqlite::SqliteBackend;

/// Open a SQLite database file, creating it if needed.
pub fn open_db(path: &Path) -> Result<SqliteBackend, DbError> {
    SqliteBackend::open(path)
}

/// Create an in-memory database.
///
/// Used by tests and by `--db :memory:` to avoid disk I/O.
pub fn open_mem_db() -> Result<SqliteBackend, DbError> {
    SqliteBackend::open_memory()
}
