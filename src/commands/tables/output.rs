//! Output formatting for tables command results.

use super::execute::TablesResult;
use crate::output::{Outputable, render_columns};

impl Outputable for TablesResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        let header = match &self.base_filter {
            Some(base) => format!("Tables: {}", base),
            None => "Tables".to_string(),
        };
        lines.push(header);
        lines.push(String::new());

        if self.groups.is_empty() {
            lines.push("No tables found.".to_string());
            return lines.join("\n");
        }

        lines.push(format!(
            "Found {} table(s) in {} group(s):",
            self.table_count(),
            self.groups.len()
        ));
        for group in &self.groups {
            lines.push(String::new());
            lines.push(group.base.clone());
            let rows: Vec<Vec<String>> = group
                .tables
                .iter()
                .map(|t| {
                    vec![
                        t.name.clone(),
                        t.role.to_string(),
                        t.version.map_or("-".to_string(), |v| v.to_string()),
                        if t.view { "view" } else { "table" }.to_string(),
                    ]
                })
                .collect();
            for line in render_columns(&["NAME", "ROLE", "VERSION", "KIND"], &rows) {
                lines.push(format!("  {}", line));
            }
        }

        lines.join("\n")
    }
}
