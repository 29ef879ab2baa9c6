//! Backend trait for abstracting the relational store behind a typed table.
//!
//! The table layer never talks to a driver directly. It compiles statements
//! to text plus an ordered list of [`Binding`]s and hands them to a
//! [`DatabaseBackend`], which executes them and returns either an affected
//! row count or a [`RowCursor`].

use std::collections::VecDeque;

use super::DbError;
use super::schema::RootType;
use super::value::Value;

/// Whether a catalog entry is a real table or a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Table,
    View,
}

/// A catalog entry as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub kind: TableKind,
}

impl TableInfo {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TableKind::Table,
        }
    }

    pub fn view(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TableKind::View,
        }
    }
}

/// A positional statement parameter: the root type it binds as, and the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub root: RootType,
    pub value: Value,
}

impl Binding {
    pub fn new(root: RootType, value: Value) -> Self {
        Self { root, value }
    }
}

/// Forward-only cursor over the rows of a query.
///
/// Implementations must tolerate `close` being called more than once.
pub trait RowCursor: Send {
    /// Move to the next row. Returns `false` once the rows are exhausted.
    fn advance(&mut self) -> Result<bool, DbError>;

    /// Read the column at `index` of the current row as the given root type.
    fn read(&self, index: usize, root: RootType) -> Result<Value, DbError>;

    /// Whether the column at `index` of the current row is NULL.
    fn is_null(&self, index: usize) -> bool;

    /// Release backend resources held by the cursor.
    fn close(&mut self);
}

/// Cursor over rows already drained from the backend.
///
/// Used by backends whose native cursors borrow the connection and so cannot
/// outlive the call that produced them.
#[derive(Debug, Default)]
pub struct BufferedCursor {
    pending: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
    closed: bool,
}

impl BufferedCursor {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        Self {
            pending: rows.into(),
            current: None,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn cell(&self, index: usize) -> Option<&Value> {
        self.current.as_ref().and_then(|row| row.get(index))
    }
}

impl RowCursor for BufferedCursor {
    fn advance(&mut self) -> Result<bool, DbError> {
        if self.closed {
            return Ok(false);
        }
        self.current = self.pending.pop_front();
        Ok(self.current.is_some())
    }

    fn read(&self, index: usize, root: RootType) -> Result<Value, DbError> {
        self.cell(index)
            .map(|value| root.coerce(value))
            .ok_or(DbError::MissingColumn { index })
    }

    fn is_null(&self, index: usize) -> bool {
        self.cell(index).is_none_or(Value::is_null)
    }

    fn close(&mut self) {
        self.closed = true;
        self.pending.clear();
        self.current = None;
    }
}

/// Trait for relational backends the table layer can drive.
///
/// A handle serves one thread at a time: the trait requires `Send` but not
/// `Sync`.
pub trait DatabaseBackend: Send {
    /// Execute a statement, returning the number of affected rows.
    fn execute(&self, statement: &str, bindings: &[Binding]) -> Result<usize, DbError>;

    /// Execute a statement without parameters.
    fn execute_no_params(&self, statement: &str) -> Result<usize, DbError> {
        self.execute(statement, &[])
    }

    /// Execute a query and return a cursor over its rows.
    fn query(&self, statement: &str, bindings: &[Binding]) -> Result<Box<dyn RowCursor>, DbError>;

    /// Enumerate the tables and views in the store.
    fn list_tables(&self) -> Result<Vec<TableInfo>, DbError>;

    /// Column names of a table, in declaration order.
    fn list_columns(&self, table: &str) -> Result<Vec<String>, DbError>;

    /// Check if a table (not a view) exists.
    fn table_exists(&self, name: &str) -> Result<bool, DbError> {
        Ok(self
            .list_tables()?
            .iter()
            .any(|t| t.kind == TableKind::Table && t.name == name))
    }

    /// Get the backend name for logging/debugging.
    fn backend_name(&self) -> &'static str;

    /// Release the connection. Dropping the handle has the same effect but
    /// swallows any error the driver reports on shutdown.
    fn close(self: Box<Self>) -> Result<(), DbError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> BufferedCursor {
        BufferedCursor::new(vec![
            vec![Value::Integer(1), Value::from("a")],
            vec![Value::Integer(2), Value::Null],
        ])
    }

    #[test]
    fn test_buffered_cursor_walks_rows_in_order() {
        let mut cursor = cursor();
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.read(0, RootType::Int).unwrap(), Value::Integer(1));
        assert_eq!(cursor.read(1, RootType::Text).unwrap(), Value::from("a"));

        assert!(cursor.advance().unwrap());
        assert!(cursor.is_null(1));
        assert!(!cursor.is_null(0));

        assert!(!cursor.advance().unwrap());
        assert!(!cursor.advance().unwrap());
    }

    #[test]
    fn test_buffered_cursor_read_out_of_range() {
        let mut cursor = cursor();
        cursor.advance().unwrap();
        let err = cursor.read(5, RootType::Int).unwrap_err();
        assert!(matches!(err, DbError::MissingColumn { index: 5 }));
    }

    #[test]
    fn test_buffered_cursor_read_before_advance() {
        let cursor = cursor();
        assert!(cursor.read(0, RootType::Int).is_err());
        assert!(cursor.is_null(0));
    }

    #[test]
    fn test_buffered_cursor_coerces_by_root() {
        let mut cursor = BufferedCursor::new(vec![vec![Value::Integer(3)]]);
        cursor.advance().unwrap();
        assert_eq!(cursor.read(0, RootType::Double).unwrap(), Value::Real(3.0));
    }

    #[test]
    fn test_close_is_idempotent_and_stops_iteration() {
        let mut cursor = cursor();
        cursor.close();
        cursor.close();
        assert!(cursor.is_closed());
        assert!(!cursor.advance().unwrap());
    }

    #[test]
    fn test_table_info_constructors() {
        assert_eq!(TableInfo::table("t").kind, TableKind::Table);
        assert_eq!(TableInfo::view("v").kind, TableKind::View);
    }
}
