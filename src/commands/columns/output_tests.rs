//! Output formatting tests for columns command.

#[cfg(test)]
mod tests {
    use super::super::execute::ColumnsResult;
    use rstest::{fixture, rstest};

    const EMPTY_TABLE: &str = "\
Columns: t

No columns found.";

    const SINGLE_TABLE: &str = "\
Columns: users:v2

Found 3 column(s):
  1. id
  2. name
  3. age";

    #[fixture]
    fn empty_result() -> ColumnsResult {
        ColumnsResult {
            table: "t".to_string(),
            columns: vec![],
        }
    }

    #[fixture]
    fn single_result() -> ColumnsResult {
        ColumnsResult {
            table: "users:v2".to_string(),
            columns: vec!["id".to_string(), "name".to_string(), "age".to_string()],
        }
    }

    crate::output_table_test! {
        test_name: test_to_table_empty,
        fixture: empty_result,
        fixture_type: ColumnsResult,
        expected: EMPTY_TABLE,
    }

    crate::output_table_test! {
        test_name: test_to_table_single,
        fixture: single_result,
        fixture_type: ColumnsResult,
        expected: SINGLE_TABLE,
    }

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: single_result,
        fixture_type: ColumnsResult,
        assertions: {
            "table": "users:v2",
        },
    }

    crate::output_toon_test! {
        test_name: test_format_toon,
        fixture: single_result,
        fixture_type: ColumnsResult,
        contains: ["users:v2", "name"],
    }
}
