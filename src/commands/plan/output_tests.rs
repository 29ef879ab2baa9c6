//! Output formatting tests for plan command.

#[cfg(test)]
mod tests {
    use super::super::execute::PlanResult;
    use crate::db::schema::MigrationPlan;
    use rstest::{fixture, rstest};

    const MIGRATE_TABLE: &str = "\
Plan: users -> v3 (users:v3)

  migrate users:v2 -> users:v3 (from v2)";

    const SELF_MIGRATE_TABLE: &str = "\
Plan: events -> unversioned (events)

  migrate events -> migrate:events -> events (from unversioned)";

    const CONFLICT_TABLE: &str = "\
Plan: users -> v1 (users:v1)

  conflict: store holds v2, newer than target v1";

    #[fixture]
    fn migrate_result() -> PlanResult {
        PlanResult {
            base: "users".to_string(),
            target_version: 3,
            active_table: "users:v3".to_string(),
            plan: Some(MigrationPlan::Migrate {
                source: "users:v2".to_string(),
                destination: "users:v3".to_string(),
                active: "users:v3".to_string(),
                from_version: 2,
            }),
            conflict: None,
        }
    }

    #[fixture]
    fn self_migrate_result() -> PlanResult {
        PlanResult {
            base: "events".to_string(),
            target_version: -1,
            active_table: "events".to_string(),
            plan: Some(MigrationPlan::Migrate {
                source: "events".to_string(),
                destination: "migrate:events".to_string(),
                active: "events".to_string(),
                from_version: -1,
            }),
            conflict: None,
        }
    }

    #[fixture]
    fn conflict_result() -> PlanResult {
        PlanResult {
            base: "users".to_string(),
            target_version: 1,
            active_table: "users:v1".to_string(),
            plan: None,
            conflict: Some(2),
        }
    }

    crate::output_table_test! {
        test_name: test_to_table_migrate,
        fixture: migrate_result,
        fixture_type: PlanResult,
        expected: MIGRATE_TABLE,
    }

    crate::output_table_test! {
        test_name: test_to_table_self_migrate,
        fixture: self_migrate_result,
        fixture_type: PlanResult,
        expected: SELF_MIGRATE_TABLE,
    }

    crate::output_table_test! {
        test_name: test_to_table_conflict,
        fixture: conflict_result,
        fixture_type: PlanResult,
        expected: CONFLICT_TABLE,
    }

    #[rstest]
    fn test_json_nests_plan_with_action_tag(migrate_result: PlanResult) {
        use crate::output::{OutputFormat, Outputable};
        let parsed: serde_json::Value =
            serde_json::from_str(&migrate_result.format(OutputFormat::Json)).unwrap();
        assert_eq!(parsed["plan"]["action"], "migrate");
        assert_eq!(parsed["plan"]["from_version"], 2);
        assert!(parsed.get("conflict").is_none());
    }

    crate::output_json_test! {
        test_name: test_format_json_conflict,
        fixture: conflict_result,
        fixture_type: PlanResult,
        assertions: {
            "conflict": 2,
            "target_version": 1,
        },
    }

    crate::output_toon_test! {
        test_name: test_format_toon,
        fixture: migrate_result,
        fixture_type: PlanResult,
        contains: ["users:v3", "migrate"],
    }
}
