//! Output formatting for columns command results.

use super::execute::ColumnsResult;
use crate::output::Outputable;

impl Outputable for ColumnsResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Columns: {}", self.table));
        lines.push(String::new());

        if self.columns.is_empty() {
            lines.push("No columns found.".to_string());
        } else {
            lines.push(format!("Found {} column(s):", self.columns.len()));
            for (i, column) in self.columns.iter().enumerate() {
                lines.push(format!("  {}. {}", i + 1, column));
            }
        }

        lines.join("\n")
    }
}
