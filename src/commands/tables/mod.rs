mod execute;
mod output;
mod output_tests;

use clap::Args;

/// List stored tables grouped by base name
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  table_schema tables                  # Every table and view
  table_schema tables --base users     # Only the history of 'users'
  table_schema -o json tables          # Machine-readable")]
pub struct TablesCmd {
    /// Only show tables whose base name matches exactly
    #[arg(short, long)]
    pub base: Option<String>,

    /// Leave views out of the listing
    #[arg(long, default_value_t = false)]
    pub no_views: bool,
}
