//! Shared test utilities for unit, command and integration tests.
//!
//! Compiled for this crate's own tests and, behind the `test-utils` feature,
//! for the integration tests under `tests/`.

use std::sync::{Arc, Mutex};

use crate::db::backend::{Binding, DatabaseBackend, RowCursor, TableInfo};
use crate::db::schema::{Constraint, Field, Schema, types};
use crate::db::{DbError, SqliteBackend, open_mem_db};

/// Wraps an in-memory SQLite backend and records every mutating statement.
///
/// Metadata calls (`list_tables`, `list_columns`) and queries are not
/// recorded, so the log reflects exactly what changed the store. Queries go
/// to a separate log.
pub struct RecordingBackend {
    inner: SqliteBackend,
    log: Arc<Mutex<Vec<String>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            inner: open_mem_db().expect("in-memory database"),
            log: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the log, usable after the backend is boxed.
    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.log)
    }

    /// Shared handle to the query log.
    pub fn query_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.queries)
    }

    pub fn statements(&self) -> Vec<String> {
        self.log.lock().expect("log lock").clone()
    }

    pub fn clear(&self) {
        self.log.lock().expect("log lock").clear();
    }
}

impl DatabaseBackend for RecordingBackend {
    fn execute(&self, statement: &str, bindings: &[Binding]) -> Result<usize, DbError> {
        self.log.lock().expect("log lock").push(statement.to_string());
        self.inner.execute(statement, bindings)
    }

    fn query(&self, statement: &str, bindings: &[Binding]) -> Result<Box<dyn RowCursor>, DbError> {
        self.queries.lock().expect("log lock").push(statement.to_string());
        self.inner.query(statement, bindings)
    }

    fn list_tables(&self) -> Result<Vec<TableInfo>, DbError> {
        self.inner.list_tables()
    }

    fn list_columns(&self, table: &str) -> Result<Vec<String>, DbError> {
        self.inner.list_columns(table)
    }

    fn backend_name(&self) -> &'static str {
        "Recording"
    }
}

/// Row type used across unit tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub age: i32,
}

impl Person {
    pub fn new(id: i32, name: &str, age: i32) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
        }
    }
}

pub fn person_id() -> Field<Person, i32> {
    Field::new("id", types::int(), |p: &Person| p.id)
}

pub fn person_name() -> Field<Person, String> {
    Field::new("name", types::fixed_string(20), |p: &Person| p.name.clone())
}

pub fn person_age() -> Field<Person, i32> {
    Field::new("age", types::int(), |p: &Person| p.age).with(Constraint::Defaulted(0))
}

/// `{id, name}` at version 1. Decoded rows have `age == 0`.
pub fn person_schema_v1() -> Schema<i32, Person> {
    Schema::of1(person_id(), person_name(), |id, name| Person { id, name, age: 0 }).with_version(1)
}

/// `{id, name, age DEFAULT 0}` at version 2.
pub fn person_schema_v2() -> Schema<i32, Person> {
    Schema::of2(person_id(), person_name(), person_age(), |id, name, age| Person { id, name, age })
        .with_version(2)
}

/// A recording backend with `statements` already applied and the log cleared.
pub fn store_with(statements: &[&str]) -> RecordingBackend {
    let backend = RecordingBackend::new();
    for statement in statements {
        backend.execute_no_params(statement).expect("setup statement");
    }
    backend.clear();
    backend
}

/// Catalog shared by command tests: two versions of `users` history, a
/// leftover temporary table and a view.
pub fn sample_store() -> RecordingBackend {
    store_with(&[
        r#"CREATE TABLE "users:v2" ("id" INTEGER PRIMARY KEY, "name" NVARCHAR(20), "age" INTEGER DEFAULT 0)"#,
        r#"CREATE TABLE "users:backup:2024-05-01T10:00:00.000000" ("id" INTEGER PRIMARY KEY, "name" NVARCHAR(20))"#,
        r#"CREATE TABLE "events" ("id" BIGINT PRIMARY KEY)"#,
        r#"CREATE TABLE "migrate:events" ("id" BIGINT PRIMARY KEY)"#,
        r#"CREATE VIEW "adults" AS SELECT "id" FROM "users:v2" WHERE "age" >= 18"#,
    ])
}
