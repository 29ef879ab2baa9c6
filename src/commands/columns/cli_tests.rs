//! CLI parsing tests for columns command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "columns",
        test_name: test_requires_table,
        required_arg: "<TABLE>",
    }

    crate::cli_option_test! {
        command: "columns",
        variant: Columns,
        test_name: test_with_table,
        args: ["users:v2"],
        field: table,
        expected: "users:v2",
    }
}
