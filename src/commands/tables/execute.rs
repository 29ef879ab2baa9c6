use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use serde::Serialize;

use super::TablesCmd;
use crate::commands::Execute;
use crate::db::backend::{DatabaseBackend, TableKind};
use crate::db::schema::naming::{self, TableRole};

/// What a stored table is, according to its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryRole {
    Active,
    Backup,
    Temporary,
    Index,
}

impl fmt::Display for EntryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryRole::Active => "active",
            EntryRole::Backup => "backup",
            EntryRole::Temporary => "temporary",
            EntryRole::Index => "index",
        };
        f.write_str(label)
    }
}

/// A single stored table or view.
#[derive(Debug, Clone, Serialize)]
pub struct TableEntry {
    pub name: String,
    pub role: EntryRole,
    pub version: Option<i32>,
    pub view: bool,
}

/// Every stored table that belongs to one base name.
#[derive(Debug, Clone, Serialize)]
pub struct TableGroup {
    pub base: String,
    pub tables: Vec<TableEntry>,
}

/// Result of the tables command execution
#[derive(Debug, Default, Serialize)]
pub struct TablesResult {
    pub base_filter: Option<String>,
    pub groups: Vec<TableGroup>,
}

impl TablesResult {
    pub fn table_count(&self) -> usize {
        self.groups.iter().map(|g| g.tables.len()).sum()
    }
}

impl Execute for TablesCmd {
    type Output = TablesResult;

    fn execute(self, backend: &dyn DatabaseBackend) -> Result<Self::Output, Box<dyn Error>> {
        let mut groups: BTreeMap<String, Vec<TableEntry>> = BTreeMap::new();

        for info in backend.list_tables()? {
            let view = info.kind == TableKind::View;
            if view && self.no_views {
                continue;
            }
            let role = naming::classify(&info.name);
            if self.base.as_deref().is_some_and(|base| base != role.base()) {
                continue;
            }
            let (kind, version) = match &role {
                TableRole::Active { version, .. } => (EntryRole::Active, *version),
                TableRole::Backup { version, .. } => (EntryRole::Backup, *version),
                TableRole::Temporary { .. } => (EntryRole::Temporary, None),
                TableRole::Index { .. } => (EntryRole::Index, None),
            };
            groups.entry(role.base().to_string()).or_default().push(TableEntry {
                name: info.name,
                role: kind,
                version,
                view,
            });
        }

        Ok(TablesResult {
            base_filter: self.base,
            groups: groups
                .into_iter()
                .map(|(base, tables)| TableGroup { base, tables })
                .collect(),
        })
    }
}
