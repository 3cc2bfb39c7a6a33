//! PostgreSQL task store.

use std::{fmt, str::FromStr, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::Task;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    FromRow, PgPool,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{TaskFilter, TaskStore, TaskStoreError, TaskStoreResult};

const BACKEND_NAME: &str = "PostgreSQL";

/// Postgres limits identifiers to 63 bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Connection pool tuning for [`PostgresTaskStore`].
#[derive(Debug, Clone)]
pub struct PostgresOptions {
    /// Connections kept open while idle.
    pub min_connections: u32,
    /// Upper bound on simultaneous connections.
    pub max_connections: u32,
    /// How long to wait for a pooled connection.
    pub acquire_timeout: Duration,
    /// Server-side limit on a single statement.
    pub statement_timeout: Duration,
    /// Reported to the server as `application_name`.
    pub application_name: String,
}

impl Default for PostgresOptions {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            statement_timeout: Duration::from_secs(30),
            application_name: "task_store".to_string(),
        }
    }
}

/// Database row for Task
#[derive(Debug, FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    priority: String,
    due_date: Option<String>,
    created: DateTime<Utc>,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            title: row.title,
            priority: row.priority,
            due_date: row.due_date,
            created: row.created,
            completed: row.completed,
            completed_at: row.completed_at,
        }
    }
}

/// SQL text for one table, built once since the table name is configurable.
#[derive(Debug)]
struct Statements {
    create_table: String,
    insert: String,
    select_by_id: String,
    select_all: String,
    select_filtered: String,
    update_completed: String,
    update_priority: String,
    delete: String,
}

impl Statements {
    fn for_table(table: &str) -> Self {
        const COLUMNS: &str = "id, title, priority, due_date, created, completed, completed_at";

        Self {
            create_table: format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id BIGSERIAL PRIMARY KEY,
                    title TEXT NOT NULL,
                    priority TEXT NOT NULL DEFAULT 'medium',
                    due_date TEXT,
                    created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    completed BOOLEAN NOT NULL DEFAULT FALSE,
                    completed_at TIMESTAMPTZ
                )
                "#
            ),
            insert: format!(
                "INSERT INTO {table} (title, priority, due_date) VALUES ($1, $2, $3) RETURNING id"
            ),
            select_by_id: format!("SELECT {COLUMNS} FROM {table} WHERE id = $1"),
            select_all: format!("SELECT {COLUMNS} FROM {table} ORDER BY id"),
            select_filtered: format!(
                "SELECT {COLUMNS} FROM {table} WHERE ($1::BOOLEAN IS NULL OR completed = $1) AND \
                 ($2::TEXT IS NULL OR priority = $2) ORDER BY id"
            ),
            update_completed: format!(
                "UPDATE {table} SET completed = $1, completed_at = $2 WHERE id = $3"
            ),
            update_priority: format!("UPDATE {table} SET priority = $1 WHERE id = $2"),
            delete: format!("DELETE FROM {table} WHERE id = $1"),
        }
    }
}

/// Checks that a table name is a plain identifier, since it is interpolated
/// into SQL text.
fn validate_table_name(name: &str) -> TaskStoreResult<()> {
    let mut chars = name.chars();
    let valid = name.len() <= MAX_IDENTIFIER_LEN
        && chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(TaskStoreError::InvalidTableName(name.to_string()))
    }
}

/// Task store backed by one PostgreSQL table.
///
/// The pool is created by `initialize` and torn down by `close`; every other
/// operation fails with [`TaskStoreError::NotInitialized`] outside that
/// window.
pub struct PostgresTaskStore {
    database_url: String,
    table_name: String,
    options: PostgresOptions,
    statements: Statements,
    pool: RwLock<Option<PgPool>>,
}

impl fmt::Debug for PostgresTaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresTaskStore")
            .field("table_name", &self.table_name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PostgresTaskStore {
    /// Creates a store for the given connection string and table. No
    /// connection is made until `initialize`.
    pub fn new(
        database_url: impl Into<String>,
        table_name: impl Into<String>,
    ) -> TaskStoreResult<Self> {
        let table_name = table_name.into();
        validate_table_name(&table_name)?;

        Ok(Self {
            database_url: database_url.into(),
            statements: Statements::for_table(&table_name),
            table_name,
            options: PostgresOptions::default(),
            pool: RwLock::new(None),
        })
    }

    /// Replaces the pool options.
    pub fn with_options(mut self, options: PostgresOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns a handle to the pool, or an error if not initialized.
    async fn pool(&self) -> TaskStoreResult<PgPool> {
        self.pool
            .read()
            .await
            .clone()
            .ok_or_else(|| TaskStoreError::not_initialized(BACKEND_NAME))
    }

    async fn connect(&self) -> TaskStoreResult<PgPool> {
        let statement_timeout = format!("{}ms", self.options.statement_timeout.as_millis());
        let connect_options = PgConnectOptions::from_str(&self.database_url)
            .map_err(TaskStoreError::Connection)?
            .application_name(&self.options.application_name)
            .options([("statement_timeout", statement_timeout)]);

        PgPoolOptions::new()
            .min_connections(self.options.min_connections)
            .max_connections(self.options.max_connections)
            .acquire_timeout(self.options.acquire_timeout)
            .connect_with(connect_options)
            .await
            .map_err(TaskStoreError::Connection)
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn initialize(&self) -> TaskStoreResult<()> {
        let mut guard = self.pool.write().await;
        if guard.is_some() {
            return Ok(());
        }

        info!(table = %self.table_name, "Connecting to PostgreSQL");
        let pool = self.connect().await?;

        if let Err(e) = sqlx::query(&self.statements.create_table)
            .execute(&pool)
            .await
        {
            warn!(table = %self.table_name, error = %e, "Failed to create task table");
            pool.close().await;
            return Err(TaskStoreError::Connection(e));
        }

        *guard = Some(pool);
        info!(table = %self.table_name, "PostgreSQL task storage initialized");
        Ok(())
    }

    async fn close(&self) -> TaskStoreResult<()> {
        let pool = self.pool.write().await.take();
        if let Some(pool) = pool {
            pool.close().await;
            info!(table = %self.table_name, "PostgreSQL task storage closed");
        }
        Ok(())
    }

    async fn add_task(
        &self,
        title: &str,
        priority: &str,
        due_date: Option<&str>,
    ) -> TaskStoreResult<Task> {
        let pool = self.pool().await?;
        let mut conn = pool.acquire().await?;

        let id: i64 = sqlx::query_scalar(&self.statements.insert)
            .bind(title)
            .bind(priority)
            .bind(due_date)
            .fetch_one(&mut *conn)
            .await?;

        let row: TaskRow = sqlx::query_as(&self.statements.select_by_id)
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

        debug!(id, priority, "Added task");
        Ok(row.into())
    }

    async fn list_tasks(&self) -> TaskStoreResult<Vec<Task>> {
        let pool = self.pool().await?;
        let rows: Vec<TaskRow> = sqlx::query_as(&self.statements.select_all)
            .fetch_all(&pool)
            .await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn get_task(&self, id: i64) -> TaskStoreResult<Option<Task>> {
        let pool = self.pool().await?;
        let row: Option<TaskRow> = sqlx::query_as(&self.statements.select_by_id)
            .bind(id)
            .fetch_optional(&pool)
            .await?;

        Ok(row.map(Task::from))
    }

    async fn set_completed(&self, id: i64, completed: bool) -> TaskStoreResult<bool> {
        let pool = self.pool().await?;
        let completed_at = completed.then(Utc::now);

        let result = sqlx::query(&self.statements.update_completed)
            .bind(completed)
            .bind(completed_at)
            .bind(id)
            .execute(&pool)
            .await?;

        let updated = result.rows_affected() > 0;
        debug!(id, completed, updated, "Set task completion");
        Ok(updated)
    }

    async fn delete_task(&self, id: i64) -> TaskStoreResult<bool> {
        let pool = self.pool().await?;
        let result = sqlx::query(&self.statements.delete)
            .bind(id)
            .execute(&pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        debug!(id, deleted, "Deleted task");
        Ok(deleted)
    }

    async fn set_priority(&self, id: i64, priority: &str) -> TaskStoreResult<bool> {
        let pool = self.pool().await?;
        let result = sqlx::query(&self.statements.update_priority)
            .bind(priority)
            .bind(id)
            .execute(&pool)
            .await?;

        let updated = result.rows_affected() > 0;
        debug!(id, priority, updated, "Set task priority");
        Ok(updated)
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn list_filtered(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>> {
        let pool = self.pool().await?;
        let rows: Vec<TaskRow> = sqlx::query_as(&self.statements.select_filtered)
            .bind(filter.status.completed())
            .bind(filter.priority.as_deref())
            .fetch_all(&pool)
            .await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }
}
