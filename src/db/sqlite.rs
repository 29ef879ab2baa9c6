//! SQLite backend over `rusqlite`.

use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, instrument};

use super::DbError;
use super::backend::{Binding, BufferedCursor, DatabaseBackend, RowCursor, TableInfo, TableKind};
use super::value::{DatabaseValue, Value, integral_f64};

/// A relational store backed by a single SQLite connection.
pub struct SqliteBackend {
    conn: Connection,
    label: String,
}

impl SqliteBackend {
    /// Opens (or creates) a SQLite database at the given file path.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).map_err(|e| DbError::OpenFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("Opened SQLite database at {}", path.display());
        Ok(Self {
            conn,
            label: path.display().to_string(),
        })
    }

    /// Opens an in-memory SQLite database.
    pub fn open_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().map_err(|e| DbError::OpenFailed {
            path: ":memory:".to_string(),
            message: e.to_string(),
        })?;
        debug!("Opened in-memory SQLite database");
        Ok(Self {
            conn,
            label: ":memory:".to_string(),
        })
    }

    /// Where the database lives: a file path or `:memory:`.
    pub fn location(&self) -> &str {
        &self.label
    }
}

fn statement_error(statement: &str) -> impl FnOnce(rusqlite::Error) -> DbError + '_ {
    move |e| DbError::Statement {
        statement: statement.to_string(),
        message: e.to_string(),
    }
}

fn to_sql(binding: &Binding) -> SqlValue {
    match &binding.value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

impl From<SqlValue> for Value {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => Value::Null,
            SqlValue::Integer(i) => Value::Integer(i),
            SqlValue::Real(f) => Value::Real(f),
            SqlValue::Text(s) => Value::Text(s),
            SqlValue::Blob(b) => Value::Text(String::from_utf8_lossy(&b).into_owned()),
        }
    }
}

impl DatabaseValue for SqlValue {
    fn as_string(&self) -> Option<String> {
        match self {
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Blob(b) => String::from_utf8(b.clone()).ok(),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            SqlValue::Real(f) => integral_f64(*f),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Integer(i) => Some(*i as f64),
            SqlValue::Real(f) => Some(*f),
            _ => None,
        }
    }

    fn is_null_value(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Integer(_) => "integer",
            SqlValue::Real(_) => "real",
            SqlValue::Text(_) => "text",
            SqlValue::Blob(_) => "blob",
        }
    }

    fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

impl DatabaseBackend for SqliteBackend {
    #[instrument(skip_all, fields(bindings = bindings.len()))]
    fn execute(&self, statement: &str, bindings: &[Binding]) -> Result<usize, DbError> {
        debug!("{}", statement);
        let params: Vec<SqlValue> = bindings.iter().map(to_sql).collect();
        self.conn
            .execute(statement, params_from_iter(params.iter()))
            .map_err(statement_error(statement))
    }

    /// Runs the statement to completion and buffers every row.
    ///
    /// `rusqlite` rows borrow their statement, which borrows the connection,
    /// so the native cursor cannot be handed out past this call. Memory is
    /// bounded by the result set: callers that only need a prefix should put
    /// a `LIMIT` on the statement.
    #[instrument(skip_all, fields(bindings = bindings.len()))]
    fn query(&self, statement: &str, bindings: &[Binding]) -> Result<Box<dyn RowCursor>, DbError> {
        debug!("{}", statement);
        let params: Vec<SqlValue> = bindings.iter().map(to_sql).collect();

        let mut stmt = self.conn.prepare(statement).map_err(statement_error(statement))?;
        let column_count = stmt.column_count();
        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(statement_error(statement))?;

        let mut buffered = Vec::new();
        while let Some(row) = rows.next().map_err(statement_error(statement))? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value: SqlValue = row.get(i).map_err(statement_error(statement))?;
                values.push(Value::from(value));
            }
            buffered.push(values);
        }

        debug!("Buffered {} rows", buffered.len());
        Ok(Box::new(BufferedCursor::new(buffered)))
    }

    fn list_tables(&self) -> Result<Vec<TableInfo>, DbError> {
        let statement = "SELECT name, type FROM sqlite_master \
                         WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
                         ORDER BY name";
        let mut stmt = self.conn.prepare(statement).map_err(statement_error(statement))?;
        let tables = stmt
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let kind: String = row.get(1)?;
                Ok(TableInfo {
                    name,
                    kind: if kind == "view" {
                        TableKind::View
                    } else {
                        TableKind::Table
                    },
                })
            })
            .map_err(statement_error(statement))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(statement_error(statement))?;
        Ok(tables)
    }

    #[instrument(skip_all, fields(table = %table))]
    fn list_columns(&self, table: &str) -> Result<Vec<String>, DbError> {
        let statement = "SELECT name FROM pragma_table_info(?1) ORDER BY cid";
        let mut stmt = self.conn.prepare(statement).map_err(statement_error(statement))?;
        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .map_err(statement_error(statement))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(statement_error(statement))?;
        Ok(columns)
    }

    fn backend_name(&self) -> &'static str {
        "Sqlite"
    }

    fn close(self: Box<Self>) -> Result<(), DbError> {
        let SqliteBackend { conn, label } = *self;
        conn.close().map_err(|(_, e)| DbError::Statement {
            statement: format!("close {}", label),
            message: e.to_string(),
        })
    }
}
