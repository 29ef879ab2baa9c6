//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `Execute` impl that reads from the backend (`execute.rs`)
//! - An `Outputable` impl for its result (`output.rs`)

mod columns;
mod plan;
mod tables;

pub use columns::ColumnsCmd;
pub use plan::PlanCmd;
pub use tables::TablesCmd;

use clap::Subcommand;
use std::error::Error;

use crate::db::backend::DatabaseBackend;
use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
///
/// Commands only inspect the store; none of them issue mutating statements.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, backend: &dyn DatabaseBackend) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List stored tables grouped by base name, with versions and backups
    Tables(TablesCmd),

    /// Show the physical columns of a stored table
    Columns(ColumnsCmd),

    /// Preview the migration decision for a base name and target version
    Plan(PlanCmd),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, backend: &dyn DatabaseBackend, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Tables(cmd) => {
                let result = cmd.execute(backend)?;
                Ok(result.format(format))
            }
            Command::Columns(cmd) => {
                let result = cmd.execute(backend)?;
                Ok(result.format(format))
            }
            Command::Plan(cmd) => {
                let result = cmd.execute(backend)?;
                Ok(result.format(format))
            }
        }
    }
}
