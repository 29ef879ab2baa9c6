//! Execute tests for columns command.

#[cfg(test)]
mod tests {
    use super::super::ColumnsCmd;
    use crate::commands::Execute;
    use crate::test_utils::{RecordingBackend, sample_store};
    use rstest::{fixture, rstest};

    #[fixture]
    fn populated_db() -> RecordingBackend {
        sample_store()
    }

    crate::execute_test! {
        test_name: test_columns_in_declaration_order,
        fixture: populated_db,
        cmd: ColumnsCmd { table: "users:v2".to_string() },
        assertions: |result| {
            assert_eq!(result.table, "users:v2");
            assert_eq!(result.columns, vec!["id", "name", "age"]);
        },
    }

    crate::execute_test! {
        test_name: test_columns_of_view,
        fixture: populated_db,
        cmd: ColumnsCmd { table: "adults".to_string() },
        assertions: |result| {
            assert_eq!(result.columns, vec!["id"]);
        },
    }

    #[rstest]
    fn test_unknown_table_is_error(populated_db: RecordingBackend) {
        let err = ColumnsCmd { table: "nope".to_string() }
            .execute(&populated_db)
            .unwrap_err();
        assert_eq!(err.to_string(), "Table 'nope' not found");
    }
}
