//! Versioned table migration.
//!
//! A typed table is stored under a physical name derived from its base name
//! and schema version (see [`naming`](super::naming)). On `migrate` the engine
//! inspects the catalog and picks one of three outcomes:
//!
//! - **Create**: no table for this base exists yet
//! - **Migrate**: an older version exists; copy the shared columns into a new
//!   table, then back up or drop the old one
//! - **Skip**: the target version is already active
//!
//! The statements run one after another without a surrounding transaction. A
//! failure part way through leaves whatever was already applied in place.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use super::compilers::SqlCompiler;
use super::definition::{ALWAYS_MIGRATE, Column, ColumnConstraint, Schema};
use super::naming;
use crate::db::DbError;
use crate::db::backend::{DatabaseBackend, TableInfo, TableKind};

/// Outcome of a migration that changed the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Name the retired table was renamed to, when a backup was requested.
    pub backup_name: Option<String>,
    /// Version migrated from; `-1` for a fresh table or a self-migration.
    pub from_version: i32,
    pub to_version: i32,
}

/// What `migrate` would do, decided from the catalog alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum MigrationPlan {
    /// Create `table` from scratch.
    Create { table: String },
    /// Copy `source` into `destination`, retire `source`, and end with the
    /// data under `active`. `destination` differs from `active` only when an
    /// unversioned table migrates onto itself.
    Migrate {
        source: String,
        destination: String,
        active: String,
        from_version: i32,
    },
    /// `table` is already at the target version.
    Skip { table: String },
}

/// Decide how to bring `base` to `version` given the current catalog.
///
/// Views are ignored. Fails with [`DbError::VersionConflict`] when the store
/// holds a newer version than the target.
pub fn plan_migration(tables: &[TableInfo], base: &str, version: i32) -> Result<MigrationPlan, DbError> {
    if version < ALWAYS_MIGRATE {
        return Err(DbError::InvalidVersion(version));
    }
    let active = naming::active_table_name(base, version);
    let names = tables.iter().filter(|t| t.kind == TableKind::Table).map(|t| t.name.as_str());

    if names.clone().any(|name| name == active) {
        if version == ALWAYS_MIGRATE {
            return Ok(MigrationPlan::Migrate {
                source: active.clone(),
                destination: naming::temporary_name(&active),
                active,
                from_version: ALWAYS_MIGRATE,
            });
        }
        return Ok(MigrationPlan::Skip { table: active });
    }

    let mut newest_older: Option<i32> = None;
    let mut newest_newer: Option<i32> = None;
    for found in names.filter_map(|name| naming::parse_version(base, name)) {
        if found == version {
            return Ok(MigrationPlan::Skip { table: active });
        }
        let slot = if found > version { &mut newest_newer } else { &mut newest_older };
        *slot = Some(slot.map_or(found, |v| v.max(found)));
    }

    if let Some(found) = newest_newer {
        return Err(DbError::VersionConflict {
            table: base.to_string(),
            target: version,
            found,
        });
    }

    Ok(match newest_older {
        Some(from_version) => MigrationPlan::Migrate {
            source: naming::versioned(base, from_version),
            destination: active.clone(),
            active,
            from_version,
        },
        None => MigrationPlan::Create { table: active },
    })
}

/// Bring the table for `base` to the schema's version.
///
/// Returns `None` when nothing had to change.
#[instrument(skip_all, fields(table = %base, version = schema.version()))]
pub fn run_migration<K, R>(
    backend: &dyn DatabaseBackend,
    base: &str,
    schema: &Schema<K, R>,
    backup: bool,
) -> Result<Option<MigrationReport>, DbError>
where
    K: Clone + Send + Sync + 'static,
    R: 'static,
{
    schema.validate()?;
    let version = schema.version();
    let tables = backend.list_tables().map_err(DbError::during("migrate", base))?;

    match plan_migration(&tables, base, version)? {
        MigrationPlan::Skip { table } => {
            info!(table = %table, "Table already at target version");
            Ok(None)
        }
        MigrationPlan::Create { table } => {
            create(backend, schema, &table).map_err(DbError::during("create table", &table))?;
            info!(table = %table, version, "Created table");
            Ok(Some(MigrationReport {
                backup_name: None,
                from_version: ALWAYS_MIGRATE,
                to_version: version,
            }))
        }
        MigrationPlan::Migrate {
            source,
            destination,
            active,
            from_version,
        } => {
            let backup_name = backup.then(|| naming::backup_name(base, &backup_timestamp()));
            migrate(backend, schema, &source, &destination, &active, backup_name.as_deref())
                .map_err(DbError::during("migrate", &source))?;
            info!(
                from = %source,
                to = %active,
                backup = backup_name.as_deref().unwrap_or("none"),
                "Migrated table"
            );
            Ok(Some(MigrationReport {
                backup_name,
                from_version,
                to_version: version,
            }))
        }
    }
}

fn backup_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

fn create<K, R>(backend: &dyn DatabaseBackend, schema: &Schema<K, R>, table: &str) -> Result<(), DbError>
where
    K: Clone + Send + Sync + 'static,
    R: 'static,
{
    backend.execute_no_params(&SqlCompiler::compile_create_table(schema, table))?;
    build_indexes(backend, schema, table)
}

fn build_indexes<K, R>(backend: &dyn DatabaseBackend, schema: &Schema<K, R>, table: &str) -> Result<(), DbError>
where
    K: Clone + Send + Sync + 'static,
    R: 'static,
{
    for index in schema.indexes() {
        // A backed-up table keeps its index names after the rename.
        backend.execute_no_params(&SqlCompiler::compile_drop_index(index, table))?;
        backend.execute_no_params(&SqlCompiler::compile_index(index, table)?)?;
    }
    Ok(())
}

/// First target field that NOT NULL forbids leaving empty and the source cannot fill.
fn unfillable<'a, R>(fields: &'a [Arc<dyn Column<R>>], source_columns: &[String]) -> Option<&'a str> {
    fields
        .iter()
        .filter(|c| !source_columns.iter().any(|s| s == c.label()))
        .find(|c| {
            let constraints = c.column_constraints();
            constraints.contains(&ColumnConstraint::NotNull)
                && !constraints.iter().any(|k| matches!(k, ColumnConstraint::Default(_)))
        })
        .map(|c| c.label())
}

fn migrate<K, R>(
    backend: &dyn DatabaseBackend,
    schema: &Schema<K, R>,
    source: &str,
    destination: &str,
    active: &str,
    backup_name: Option<&str>,
) -> Result<(), DbError>
where
    K: Clone + Send + Sync + 'static,
    R: 'static,
{
    let source_columns = backend.list_columns(source)?;

    let primary_key = schema.primary_key().label();
    if !source_columns.iter().any(|c| c == primary_key) {
        return Err(DbError::MissingPrimaryKey {
            table: source.to_string(),
            column: primary_key.to_string(),
        });
    }
    if let Some(column) = unfillable(schema.fields(), &source_columns) {
        return Err(DbError::UnfillableColumn {
            table: source.to_string(),
            column: column.to_string(),
        });
    }

    let shared: Vec<&str> = schema
        .labels()
        .into_iter()
        .filter(|label| source_columns.iter().any(|c| c == label))
        .collect();

    backend.execute_no_params(&SqlCompiler::compile_create_table(schema, destination))?;
    let copied = backend.execute_no_params(&SqlCompiler::compile_copy(source, destination, &shared))?;
    debug!(rows = copied, columns = ?shared, "Copied rows");

    match backup_name {
        Some(backup) => backend.execute_no_params(&SqlCompiler::compile_rename(source, backup))?,
        None => backend.execute_no_params(&SqlCompiler::compile_drop(source))?,
    };
    if destination != active {
        backend.execute_no_params(&SqlCompiler::compile_rename(destination, active))?;
    }
    build_indexes(backend, schema, active)
}
