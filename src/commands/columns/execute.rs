use std::error::Error;

use serde::Serialize;
use thiserror::Error;

use super::ColumnsCmd;
use crate::commands::Execute;
use crate::db::backend::DatabaseBackend;

#[derive(Error, Debug)]
enum ColumnsError {
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },
}

/// Result of the columns command execution
#[derive(Debug, Default, Serialize)]
pub struct ColumnsResult {
    pub table: String,
    pub columns: Vec<String>,
}

impl Execute for ColumnsCmd {
    type Output = ColumnsResult;

    fn execute(self, backend: &dyn DatabaseBackend) -> Result<Self::Output, Box<dyn Error>> {
        if !backend.list_tables()?.iter().any(|t| t.name == self.table) {
            return Err(ColumnsError::TableNotFound { table: self.table }.into());
        }
        let columns = backend.list_columns(&self.table)?;

        Ok(ColumnsResult {
            table: self.table,
            columns,
        })
    }
}
