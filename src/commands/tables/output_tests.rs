//! Output formatting tests for tables command.

#[cfg(test)]
mod tests {
    use super::super::execute::{EntryRole, TableEntry, TableGroup, TablesResult};
    use rstest::{fixture, rstest};

    // =========================================================================
    // Expected outputs
    // =========================================================================

    const EMPTY_TABLE: &str = "\
Tables

No tables found.";

    const SINGLE_TABLE: &str = "\
Tables: users

Found 2 table(s) in 1 group(s):

users
  NAME                     ROLE    VERSION  KIND
  users:backup:2024-05-01  backup  -        table
  users:v2                 active  2        table";

    // =========================================================================
    // Fixtures
    // =========================================================================

    #[fixture]
    fn empty_result() -> TablesResult {
        TablesResult::default()
    }

    #[fixture]
    fn single_result() -> TablesResult {
        TablesResult {
            base_filter: Some("users".to_string()),
            groups: vec![TableGroup {
                base: "users".to_string(),
                tables: vec![
                    TableEntry {
                        name: "users:backup:2024-05-01".to_string(),
                        role: EntryRole::Backup,
                        version: None,
                        view: false,
                    },
                    TableEntry {
                        name: "users:v2".to_string(),
                        role: EntryRole::Active,
                        version: Some(2),
                        view: false,
                    },
                ],
            }],
        }
    }

    // =========================================================================
    // Tests
    // =========================================================================

    crate::output_table_test! {
        test_name: test_to_table_empty,
        fixture: empty_result,
        fixture_type: TablesResult,
        expected: EMPTY_TABLE,
    }

    crate::output_table_test! {
        test_name: test_to_table_single,
        fixture: single_result,
        fixture_type: TablesResult,
        expected: SINGLE_TABLE,
    }

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: single_result,
        fixture_type: TablesResult,
        assertions: {
            "base_filter": "users",
        },
    }

    #[rstest]
    fn test_json_roles_are_lowercase(single_result: TablesResult) {
        use crate::output::{OutputFormat, Outputable};
        let parsed: serde_json::Value =
            serde_json::from_str(&single_result.format(OutputFormat::Json)).unwrap();
        assert_eq!(parsed["groups"][0]["tables"][0]["role"], "backup");
        assert_eq!(parsed["groups"][0]["tables"][1]["version"], 2);
    }

    crate::output_toon_test! {
        test_name: test_format_toon,
        fixture: single_result,
        fixture_type: TablesResult,
        contains: ["users:v2", "backup"],
    }
}
