use std::error::Error;

use serde::Serialize;

use super::PlanCmd;
use crate::commands::Execute;
use crate::db::DbError;
use crate::db::backend::DatabaseBackend;
use crate::db::schema::{MigrationPlan, naming, plan_migration};

/// Result of the plan command execution
///
/// Exactly one of `plan` and `conflict` is set.
#[derive(Debug, Serialize)]
pub struct PlanResult {
    pub base: String,
    pub target_version: i32,
    pub active_table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<MigrationPlan>,
    /// Newer version found in the store, when the target would downgrade it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<i32>,
}

impl Execute for PlanCmd {
    type Output = PlanResult;

    fn execute(self, backend: &dyn DatabaseBackend) -> Result<Self::Output, Box<dyn Error>> {
        let tables = backend.list_tables()?;
        let (plan, conflict) = match plan_migration(&tables, &self.base, self.version) {
            Ok(plan) => (Some(plan), None),
            Err(DbError::VersionConflict { found, .. }) => (None, Some(found)),
            Err(e) => return Err(e.into()),
        };

        Ok(PlanResult {
            active_table: naming::active_table_name(&self.base, self.version),
            base: self.base,
            target_version: self.version,
            plan,
            conflict,
        })
    }
}
