//! Output formatting for plan command results.

use super::execute::PlanResult;
use crate::db::schema::{ALWAYS_MIGRATE, MigrationPlan};
use crate::output::Outputable;

fn describe_version(version: i32) -> String {
    if version == ALWAYS_MIGRATE {
        "unversioned".to_string()
    } else {
        format!("v{}", version)
    }
}

impl Outputable for PlanResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "Plan: {} -> {} ({})",
            self.base,
            describe_version(self.target_version),
            self.active_table
        ));
        lines.push(String::new());

        let step = match (&self.plan, self.conflict) {
            (Some(MigrationPlan::Create { table }), _) => format!("create {}", table),
            (Some(MigrationPlan::Skip { table }), _) => format!("skip: {} is already current", table),
            (Some(MigrationPlan::Migrate {
                source,
                destination,
                active,
                from_version,
            }), _) => {
                let route = if destination == active {
                    format!("{} -> {}", source, active)
                } else {
                    format!("{} -> {} -> {}", source, destination, active)
                };
                format!("migrate {} (from {})", route, describe_version(*from_version))
            }
            (None, Some(found)) => format!(
                "conflict: store holds {}, newer than target {}",
                describe_version(found),
                describe_version(self.target_version)
            ),
            (None, None) => "nothing to do".to_string(),
        };
        lines.push(format!("  {}", step));

        lines.join("\n")
    }
}
