//! Task store error types.

use thiserror::Error;

/// Errors that can occur during task store operations.
///
/// A missing task id is never an error; operations signal it with `None` or
/// `false` instead.
#[derive(Debug, Error)]
pub enum TaskStoreError {
    /// Store used before `initialize` or after `close`.
    #[error("{backend} store is not initialized")]
    NotInitialized { backend: &'static str },

    /// Backend unreachable while initializing.
    #[error("Failed to connect to database: {0}")]
    Connection(#[source] sqlx::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No identifier is left to assign.
    #[error("Task id space is exhausted")]
    IdExhausted,

    /// Table name is not a plain SQL identifier.
    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),
}

impl TaskStoreError {
    /// Creates a not initialized error.
    pub fn not_initialized(backend: &'static str) -> Self {
        Self::NotInitialized { backend }
    }
}

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_display() {
        let error = TaskStoreError::not_initialized("PostgreSQL");
        assert_eq!(error.to_string(), "PostgreSQL store is not initialized");
    }

    #[test]
    fn test_invalid_table_name_display() {
        let error = TaskStoreError::InvalidTableName("tasks; drop".to_string());
        assert_eq!(error.to_string(), "Invalid table name: \"tasks; drop\"");
    }

    #[test]
    fn test_id_exhausted_display() {
        assert_eq!(TaskStoreError::IdExhausted.to_string(), "Task id space is exhausted");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: TaskStoreError = io.into();
        assert!(matches!(error, TaskStoreError::Io(_)));
        assert_eq!(error.to_string(), "I/O error: denied");
    }
}
