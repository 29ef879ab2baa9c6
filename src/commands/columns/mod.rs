mod cli_tests;
mod execute;
mod execute_tests;
mod output;
mod output_tests;

use clap::Args;

/// Show the physical columns of a stored table
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  table_schema columns users:v2        # Columns of a versioned table
  table_schema columns 'migrate:t'     # Columns of a leftover temporary table")]
pub struct ColumnsCmd {
    /// Physical table name, including any version or backup suffix
    pub table: String,
}
