//! Typed table facade.
//!
//! [`Database`] owns a backend handle; [`Table`] binds a base table name to a
//! [`Schema`] and turns typed calls into compiled statements.
//!
//! ```ignore
//! let db = Database::new(Box::new(open_mem_db()?));
//! let users = db.table("users", schema);
//! users.migrate(true)?;
//! users.insert_one(&user)?;
//! let adults = users.query(Some(&filter::ge(&age, 18)), None)?.collect_all()?;
//! ```

use tracing::debug;

use crate::db::DbError;
use crate::db::backend::DatabaseBackend;
use crate::db::schema::compilers::SqlCompiler;
use crate::db::schema::{Field, MigrationReport, Schema, naming, run_migration};
use crate::queries::filter::{self, Filter, SortBy};
use crate::queries::result::QueryResult;

/// Entry point: a backend connection shared by every table opened on it.
pub struct Database {
    backend: Box<dyn DatabaseBackend>,
}

impl Database {
    pub fn new(backend: Box<dyn DatabaseBackend>) -> Self {
        Self { backend }
    }

    /// Bind `name` to `schema`. Nothing is checked against the store until
    /// the table is migrated or used.
    pub fn table<K, R>(&self, name: impl Into<String>, schema: Schema<K, R>) -> Table<'_, K, R>
    where
        K: Clone + Send + Sync + 'static,
        R: 'static,
    {
        Table {
            backend: self.backend.as_ref(),
            name: name.into(),
            schema,
        }
    }

    pub fn backend(&self) -> &dyn DatabaseBackend {
        self.backend.as_ref()
    }

    /// Close the underlying connection.
    pub fn close(self) -> Result<(), DbError> {
        self.backend.close()
    }
}

/// A typed view over the active physical table for a schema.
pub struct Table<'db, K, R> {
    backend: &'db dyn DatabaseBackend,
    name: String,
    schema: Schema<K, R>,
}

impl<'db, K, R> Table<'db, K, R>
where
    K: Clone + Send + Sync + 'static,
    R: 'static,
{
    /// Base name, without any version suffix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema<K, R> {
        &self.schema
    }

    /// Physical name of the table at the schema's version.
    pub fn active_name(&self) -> String {
        naming::active_table_name(&self.name, self.schema.version())
    }

    pub fn primary_key(&self) -> &Field<R, K> {
        self.schema.primary_key()
    }

    /// Create or migrate the table to the schema's version.
    ///
    /// With `backup`, a retired table is renamed to `<name>:backup:<timestamp>`
    /// instead of dropped. Returns `None` when the table was already current.
    pub fn migrate(&self, backup: bool) -> Result<Option<MigrationReport>, DbError> {
        run_migration(self.backend, &self.name, &self.schema, backup)
    }

    /// Drop the active table.
    pub fn drop_table(&self) -> Result<(), DbError> {
        let active = self.active_name();
        self.backend
            .execute_no_params(&SqlCompiler::compile_drop(&active))
            .map_err(DbError::during("drop table", &active))?;
        Ok(())
    }

    /// Insert rows one statement at a time. Returns the number inserted.
    pub fn insert<'a>(&self, rows: impl IntoIterator<Item = &'a R>) -> Result<usize, DbError>
    where
        R: 'a,
    {
        let active = self.active_name();
        let mut inserted = 0;
        for row in rows {
            let compiled = SqlCompiler::compile_insert(&self.schema, &active, row);
            inserted += self
                .backend
                .execute(&compiled.sql, &compiled.bindings)
                .map_err(DbError::during("insert into", &active))?;
        }
        Ok(inserted)
    }

    pub fn insert_one(&self, row: &R) -> Result<bool, DbError> {
        Ok(self.insert([row])? == 1)
    }

    /// Rows matching `filter` (all rows when `None`), optionally ordered.
    ///
    /// The SQLite backend materializes the whole result set before the first
    /// row is read. Use [`query_limit`](Self::query_limit) to bound it.
    pub fn query(&self, filter: Option<&Filter<R>>, ordering: Option<&SortBy<R>>) -> Result<QueryResult<K, R>, DbError> {
        self.select(filter, ordering, None)
    }

    /// Like [`query`](Self::query), but the store returns at most `limit` rows.
    pub fn query_limit(
        &self,
        filter: Option<&Filter<R>>,
        ordering: Option<&SortBy<R>>,
        limit: usize,
    ) -> Result<QueryResult<K, R>, DbError> {
        self.select(filter, ordering, Some(limit))
    }

    /// The row stored under `key`, if any.
    pub fn query_key(&self, key: &K) -> Result<Option<R>, DbError> {
        self.query_limit(Some(&self.key_filter(key)), None, 1)?.first()
    }

    fn select(
        &self,
        filter: Option<&Filter<R>>,
        ordering: Option<&SortBy<R>>,
        limit: Option<usize>,
    ) -> Result<QueryResult<K, R>, DbError> {
        let active = self.active_name();
        let mut compiled = SqlCompiler::compile_select(&self.schema, &active, filter, ordering)?;
        if let Some(limit) = limit {
            compiled = SqlCompiler::with_limit(compiled, limit);
        }
        let cursor = self
            .backend
            .query(&compiled.sql, &compiled.bindings)
            .map_err(DbError::during("query", &active))?;
        Ok(QueryResult::new(cursor, self.schema.clone()))
    }

    /// Update rows by primary key. Rows whose key is not stored are ignored.
    pub fn update<'a>(&self, rows: impl IntoIterator<Item = &'a R>) -> Result<usize, DbError>
    where
        R: 'a,
    {
        let active = self.active_name();
        let mut updated = 0;
        for row in rows {
            let compiled = SqlCompiler::compile_update(&self.schema, &active, row);
            updated += self
                .backend
                .execute(&compiled.sql, &compiled.bindings)
                .map_err(DbError::during("update", &active))?;
        }
        Ok(updated)
    }

    pub fn update_one(&self, row: &R) -> Result<bool, DbError> {
        Ok(self.update([row])? == 1)
    }

    /// Delete rows matching `filter`. `None` deletes every row.
    pub fn delete(&self, filter: Option<&Filter<R>>) -> Result<usize, DbError> {
        let active = self.active_name();
        let compiled = SqlCompiler::compile_delete(&active, filter)?;
        self.backend
            .execute(&compiled.sql, &compiled.bindings)
            .map_err(DbError::during("delete from", &active))
    }

    pub fn delete_key(&self, key: &K) -> Result<bool, DbError> {
        Ok(self.delete(Some(&self.key_filter(key)))? == 1)
    }

    pub fn delete_row(&self, row: &R) -> Result<bool, DbError> {
        self.delete_key(&self.primary_key().get(row))
    }

    /// Delete every row whose key is in `keys`, in a single statement.
    pub fn delete_keys(&self, keys: impl IntoIterator<Item = K>) -> Result<usize, DbError> {
        let primary_key = self.primary_key();
        let matches: Vec<Filter<R>> = keys.into_iter().map(|k| filter::eq(primary_key, k)).collect();
        if matches.is_empty() {
            debug!(table = %self.active_name(), "No keys to delete");
            return Ok(0);
        }
        self.delete(Some(&filter::any_of(matches)))
    }

    pub fn delete_rows<'a>(&self, rows: impl IntoIterator<Item = &'a R>) -> Result<usize, DbError>
    where
        R: 'a,
    {
        let primary_key = self.primary_key();
        self.delete_keys(rows.into_iter().map(|row| primary_key.get(row)))
    }

    fn key_filter(&self, key: &K) -> Filter<R> {
        filter::eq(self.primary_key(), key.clone())
    }
}
