//! Configuration file handling for database connections.
//!
//! Loads `.table_schema.json` from the current directory:
//!
//! ```json
//! { "database": { "type": "sqlite", "path": "./table_schema.sqlite" } }
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use crate::db::DatabaseConfig;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".table_schema.json";

/// Top-level configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseConfigFile,
}

/// Database configuration variants, tagged by a lowercase `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatabaseConfigFile {
    /// SQLite backend with file path
    Sqlite { path: PathBuf },
    /// In-memory backend
    Memory,
}

impl ConfigFile {
    /// Load configuration from `.table_schema.json` in the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist, cannot be read, or does
    /// not describe a supported database.
    pub fn load() -> Result<Self, Box<dyn Error>> {
        Self::load_if_present()?.ok_or_else(|| {
            format!(
                "Configuration file not found: {name}\n\n\
                 Create {name} in the current directory, for example:\n\
                 {{\n  \
                   \"database\": {{\n    \
                     \"type\": \"sqlite\",\n    \
                     \"path\": \"./table_schema.sqlite\"\n  \
                   }}\n\
                 }}\n",
                name = CONFIG_FILE_NAME
            )
            .into()
        })
    }

    /// Like [`load`](Self::load), but a missing file is `Ok(None)`.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_if_present() -> Result<Option<Self>, Box<dyn Error>> {
        let config_path = PathBuf::from(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| format!("Failed to read {}: {}", CONFIG_FILE_NAME, e))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid JSON in {}: {}", CONFIG_FILE_NAME, e))?;

        Ok(Some(config))
    }
}

impl DatabaseConfigFile {
    /// Convert this configuration to a DatabaseConfig.
    pub fn to_database_config(&self) -> DatabaseConfig {
        match self {
            Self::Sqlite { path } => DatabaseConfig::Sqlite { path: path.clone() },
            Self::Memory => DatabaseConfig::Memory,
        }
    }
}
