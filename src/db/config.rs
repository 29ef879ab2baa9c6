//! Database configuration for runtime backend selection.
//!
//! A connection can be chosen by CLI argument, environment variable or the
//! `.table_schema.json` configuration file, in that order of explicitness.

use std::error::Error;
use std::path::PathBuf;

use super::backend::DatabaseBackend;
use super::connection::{open_db, open_mem_db};

/// Default database file when nothing else is configured.
pub const DEFAULT_DB_PATH: &str = "./table_schema.sqlite";

/// Configuration for database backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// SQLite database stored in a file.
    Sqlite { path: PathBuf },

    /// SQLite database held in memory for the life of the connection.
    Memory,
}

impl DatabaseConfig {
    /// Create a backend instance from this configuration.
    pub fn connect(&self) -> Result<Box<dyn DatabaseBackend>, Box<dyn Error>> {
        let backend = match self {
            Self::Sqlite { path } => Box::new(open_db(path)?) as Box<dyn DatabaseBackend>,
            Self::Memory => Box::new(open_mem_db()?) as Box<dyn DatabaseBackend>,
        };
        Ok(backend)
    }

    /// Parse from a connection URL or file path.
    ///
    /// Supported formats:
    /// - `./path/to/db.sqlite` or `/absolute/path` → Sqlite
    /// - `sqlite:///path/to/db` → Sqlite
    /// - `:memory:` → Memory
    pub fn from_url(url: &str) -> Result<Self, Box<dyn Error>> {
        if url == ":memory:" {
            return Ok(Self::Memory);
        }

        if let Some(path) = url.strip_prefix("sqlite://") {
            if path.is_empty() {
                return Err("sqlite:// URL is missing a path".into());
            }
            return Ok(Self::Sqlite {
                path: PathBuf::from(path),
            });
        }

        if let Some((scheme, _)) = url.split_once("://") {
            return Err(format!("Unsupported database scheme '{}'", scheme).into());
        }

        Ok(Self::Sqlite {
            path: PathBuf::from(url),
        })
    }

    /// Load from environment variables.
    ///
    /// Checks in order:
    /// 1. DATABASE_URL
    /// 2. TABLE_SCHEMA_DB (a plain file path)
    pub fn from_env() -> Result<Option<Self>, Box<dyn Error>> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            return Ok(Some(Self::from_url(&url)?));
        }

        if let Ok(path) = std::env::var("TABLE_SCHEMA_DB") {
            return Ok(Some(Self::Sqlite {
                path: PathBuf::from(path),
            }));
        }

        Ok(None)
    }

    /// Resolve configuration from config file and environment.
    ///
    /// Priority: Config file > Environment > Default (./table_schema.sqlite)
    pub fn resolve() -> Result<Self, Box<dyn Error>> {
        if let Some(config_file) = crate::config::ConfigFile::load_if_present()? {
            return Ok(config_file.database.to_database_config());
        }

        if let Some(config) = Self::from_env()? {
            return Ok(config);
        }

        Self::from_url(DEFAULT_DB_PATH)
    }
}
