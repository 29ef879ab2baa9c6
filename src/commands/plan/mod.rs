mod execute;
mod output;
mod output_tests;

use clap::Args;

/// Preview what migrating a table to a version would do
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  table_schema plan users --version 3    # Create, migrate from an older version, or skip
  table_schema plan events --version -1  # Unversioned table, always migrated")]
pub struct PlanCmd {
    /// Base table name, without version suffix
    pub base: String,

    /// Target schema version (-1 for an unversioned table)
    #[arg(short = 'v', long, allow_negative_numbers = true)]
    pub version: i32,
}
