//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;

use crate::commands::Command;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect typed, versioned tables", long_about = None)]
pub struct Args {
    /// Database URL or SQLite file path (`:memory:`, `sqlite://path`, `path`).
    /// Falls back to .table_schema.json, then DATABASE_URL / TABLE_SCHEMA_DB,
    /// then ./table_schema.sqlite
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}
