//! Store configuration.

use std::{env, fmt, path::PathBuf};

/// Default path of the task file.
pub const DEFAULT_FILE_PATH: &str = "tasks.json";

/// Default name of the task table.
pub const DEFAULT_TABLE_NAME: &str = "tasks";

/// Storage configuration loaded from environment variables.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// PostgreSQL connection string. Its presence selects the database
    /// backend.
    pub database_url: Option<String>,
    /// Path of the task file for the file backend.
    pub file_path: PathBuf,
    /// Table name for the database backend.
    pub table_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            file_path: PathBuf::from(DEFAULT_FILE_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

impl StoreConfig {
    /// Loads configuration from environment variables.
    ///
    /// Reads `DATABASE_URL`, `TASKS_FILE` and `TASKS_TABLE`. Empty values
    /// count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            database_url: get("DATABASE_URL"),
            file_path: get("TASKS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_PATH)),
            table_name: get("TASKS_TABLE").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
        }
    }

    /// Sets the database connection string.
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Sets the task file path.
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = path.into();
        self
    }

    /// Sets the task table name.
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Returns the connection string if one is configured and non-empty.
    pub fn postgres_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &self.database_url.as_deref().map(redact_url))
            .field("file_path", &self.file_path)
            .field("table_name", &self.table_name)
            .finish()
    }
}

/// Hides credentials in a connection string.
fn redact_url(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => match rest.rsplit_once('@') {
            Some((_, host)) => format!("{scheme}://***@{host}"),
            None => url.to_string(),
        },
        None => "***".to_string(),
    }
}
