//! Backend selection.

use std::sync::Arc;

use tracing::info;

use crate::{FileTaskStore, PostgresTaskStore, StoreConfig, TaskStore, TaskStoreResult};

/// The storage backends a process can run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Single JSON file.
    File,
    /// PostgreSQL table.
    Postgres,
}

impl BackendKind {
    /// Picks the database backend when a connection string is configured,
    /// the file backend otherwise.
    pub fn select(config: &StoreConfig) -> Self {
        if config.postgres_url().is_some() {
            Self::Postgres
        } else {
            Self::File
        }
    }
}

/// Builds the task store chosen by the configuration.
///
/// Call this once per process and pass the handle to whoever needs it. The
/// returned store is not yet initialized.
pub fn create_store(config: &StoreConfig) -> TaskStoreResult<Arc<dyn TaskStore>> {
    let store: Arc<dyn TaskStore> = match config.postgres_url() {
        Some(url) => Arc::new(PostgresTaskStore::new(url, &config.table_name)?),
        None => Arc::new(FileTaskStore::new(&config.file_path)),
    };

    info!(backend = store.backend_name(), "Selected task storage backend");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::TaskStoreError;

    #[test]
    fn test_select_file_without_url() {
        assert_eq!(BackendKind::select(&StoreConfig::default()), BackendKind::File);
        assert_eq!(
            BackendKind::select(&StoreConfig::default().with_database_url("   ")),
            BackendKind::File
        );
    }

    #[test]
    fn test_select_postgres_with_url() {
        let config = StoreConfig::default().with_database_url("postgres://localhost/todo");
        assert_eq!(BackendKind::select(&config), BackendKind::Postgres);
    }

    #[test]
    fn test_create_store_matches_selection() {
        let file = create_store(&StoreConfig::default()).unwrap();
        assert_eq!(file.backend_name(), "File");

        let config = StoreConfig::default().with_database_url("postgres://localhost/todo");
        let postgres = create_store(&config).unwrap();
        assert_eq!(postgres.backend_name(), "PostgreSQL");
    }

    #[test]
    fn test_create_store_rejects_bad_table_name() {
        let config = StoreConfig::default()
            .with_database_url("postgres://localhost/todo")
            .with_table_name("tasks;--");

        assert!(matches!(
            create_store(&config),
            Err(TaskStoreError::InvalidTableName(_))
        ));
    }

    #[test]
    fn test_table_name_ignored_for_file_backend() {
        let config = StoreConfig::default().with_table_name("not valid!");
        assert_eq!(create_store(&config).unwrap().backend_name(), "File");
    }

    #[tokio::test]
    async fn test_selected_file_store_is_usable() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::default().with_file_path(dir.path().join("tasks.json"));

        let store = create_store(&config).unwrap();
        store.initialize().await.unwrap();
        let task = store.add_task("Through the handle", "medium", None).await.unwrap();

        assert_eq!(store.get_task(task.id).await.unwrap(), Some(task));
        store.close().await.unwrap();
    }
}
