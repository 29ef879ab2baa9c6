//! Typed, forward-only result cursor.

use std::any::Any;

use crate::db::DbError;
use crate::db::backend::RowCursor;
use crate::db::schema::{DecodeError, Schema};

fn decode_failure(column: &str) -> impl FnOnce(DecodeError) -> DbError + '_ {
    move |e| DbError::Decode {
        column: column.to_string(),
        message: e.to_string(),
    }
}

/// Rows of a query, materialized through the schema's row factory.
///
/// Single pass and single consumer. The backend cursor is released once the
/// rows run out, on [`close`](Self::close), or when the result is dropped.
pub struct QueryResult<K, R> {
    cursor: Option<Box<dyn RowCursor>>,
    schema: Schema<K, R>,
}

impl<K, R> QueryResult<K, R>
where
    K: Clone + Send + Sync + 'static,
    R: 'static,
{
    pub fn new(cursor: Box<dyn RowCursor>, schema: Schema<K, R>) -> Self {
        Self {
            cursor: Some(cursor),
            schema,
        }
    }

    /// Fetch the next row, or `None` once the rows are exhausted.
    pub fn next_row(&mut self) -> Result<Option<R>, DbError> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        if !cursor.advance()? {
            self.close();
            return Ok(None);
        }

        let primary_key = self.schema.primary_key();
        let raw = cursor.read(0, primary_key.field_type().root())?;
        let key = primary_key
            .field_type()
            .decode(&raw)
            .map_err(decode_failure(primary_key.label()))?;

        let mut values: Vec<Box<dyn Any + Send>> = Vec::with_capacity(self.schema.fields().len());
        for (i, column) in self.schema.fields().iter().enumerate() {
            let raw = cursor.read(i + 1, column.root_type())?;
            values.push(column.decode_any(&raw).map_err(decode_failure(column.label()))?);
        }
        self.schema.build(key, values).map(Some)
    }

    /// Drain every remaining row, then close.
    pub fn collect_all(mut self) -> Result<Vec<R>, DbError> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// The next row, if any. Closes regardless.
    pub fn first(mut self) -> Result<Option<R>, DbError> {
        let row = self.next_row();
        self.close();
        row
    }

    /// Release the backend cursor. Calling this again does nothing.
    pub fn close(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }
}

impl<K, R> Iterator for QueryResult<K, R>
where
    K: Clone + Send + Sync + 'static,
    R: 'static,
{
    type Item = Result<R, DbError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

impl<K, R> Drop for QueryResult<K, R> {
    fn drop(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
        }
    }
}
