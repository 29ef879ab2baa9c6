//! Physical table naming convention.
//!
//! | Role                         | Physical name              |
//! |------------------------------|----------------------------|
//! | Unversioned (`-1`) table     | `<name>`                   |
//! | Versioned table              | `<name>:v<version>`        |
//! | Backup of a retired table    | `<name>:backup:<timestamp>`|
//! | Self-migration destination   | `migrate:<name>`           |
//! | Index                        | `<table>:indexes:<index>`  |
//!
//! These names are shared with existing stores and must not change.

use super::definition::ALWAYS_MIGRATE;

const VERSION_MARKER: &str = ":v";
const BACKUP_MARKER: &str = ":backup:";
const INDEX_MARKER: &str = ":indexes:";
const TEMPORARY_PREFIX: &str = "migrate:";

/// Physical name of the table holding `base` at `version`.
pub fn active_table_name(base: &str, version: i32) -> String {
    if version == ALWAYS_MIGRATE {
        base.to_string()
    } else {
        versioned(base, version)
    }
}

pub fn versioned(base: &str, version: i32) -> String {
    format!("{}{}{}", base, VERSION_MARKER, version)
}

/// Backup name for a retired table of `base`.
pub fn backup_name(base: &str, timestamp: &str) -> String {
    format!("{}{}{}", base, BACKUP_MARKER, timestamp)
}

pub fn temporary_name(active: &str) -> String {
    format!("{}{}", TEMPORARY_PREFIX, active)
}

pub fn index_name(table: &str, index: &str) -> String {
    format!("{}{}{}", table, INDEX_MARKER, index)
}

/// Version of `table` if it is `<base>:v<n>`.
///
/// Only a plain non-negative decimal suffix counts; anything else (including
/// `<base>:v1:backup:...`) is not a version of `base`.
pub fn parse_version(base: &str, table: &str) -> Option<i32> {
    let suffix = table.strip_prefix(base)?.strip_prefix(VERSION_MARKER)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// What a physical table name represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRole {
    /// Live table, with its version if the name carries one.
    Active { base: String, version: Option<i32> },
    /// Retired table kept as a backup.
    Backup { base: String, version: Option<i32>, timestamp: String },
    /// Leftover self-migration destination.
    Temporary { base: String },
    /// Index name as it appears in the catalog.
    Index { table: String, index: String },
}

impl TableRole {
    pub fn base(&self) -> &str {
        match self {
            TableRole::Active { base, .. } | TableRole::Backup { base, .. } | TableRole::Temporary { base } => base,
            TableRole::Index { table, .. } => table,
        }
    }
}

fn split_versioned(name: &str) -> (String, Option<i32>) {
    if let Some(pos) = name.rfind(VERSION_MARKER) {
        let base = &name[..pos];
        if let Some(version) = parse_version(base, name) {
            return (base.to_string(), Some(version));
        }
    }
    (name.to_string(), None)
}

/// Classify a physical table name by the naming convention.
pub fn classify(name: &str) -> TableRole {
    if let Some(rest) = name.strip_prefix(TEMPORARY_PREFIX) {
        let (base, _) = split_versioned(rest);
        return TableRole::Temporary { base };
    }
    if let Some((table, index)) = name.split_once(INDEX_MARKER) {
        return TableRole::Index {
            table: table.to_string(),
            index: index.to_string(),
        };
    }
    if let Some((retired, timestamp)) = name.split_once(BACKUP_MARKER) {
        let (base, version) = split_versioned(retired);
        return TableRole::Backup {
            base,
            version,
            timestamp: timestamp.to_string(),
        };
    }
    let (base, version) = split_versioned(name);
    TableRole::Active { base, version }
}
