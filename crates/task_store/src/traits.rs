//! Task store trait definitions.

use async_trait::async_trait;
use entities::{Task, TaskStatusFilter};

use crate::{TaskStats, TaskStoreResult};

/// Filter options for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Filter by completion state.
    pub status: TaskStatusFilter,
    /// Filter by exact priority string.
    pub priority: Option<String>,
}

impl TaskFilter {
    /// Creates a filter that matches every task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the filter to a completion state.
    pub fn with_status(mut self, status: TaskStatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Restricts the filter to one priority.
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Returns true if the task passes this filter.
    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task) && self.priority.as_ref().is_none_or(|p| &task.priority == p)
    }
}

/// Trait for task storage operations.
///
/// Every backend behaves identically to callers. Operations on a missing id
/// return `None` or `false` rather than an error, and every returned task is
/// a fresh copy owned by the caller.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Prepares the backend for use. Calling it again after success is a
    /// no-op.
    async fn initialize(&self) -> TaskStoreResult<()>;

    /// Releases backend resources. The store must be initialized again before
    /// further use.
    async fn close(&self) -> TaskStoreResult<()>;

    /// Creates a task with a fresh id and returns the stored record.
    ///
    /// Neither `priority` nor `due_date` is validated.
    async fn add_task(
        &self,
        title: &str,
        priority: &str,
        due_date: Option<&str>,
    ) -> TaskStoreResult<Task>;

    /// Lists every task ordered by ascending id.
    async fn list_tasks(&self) -> TaskStoreResult<Vec<Task>>;

    /// Gets a task by ID.
    async fn get_task(&self, id: i64) -> TaskStoreResult<Option<Task>>;

    /// Sets a task's completion state, stamping or clearing `completed_at`.
    ///
    /// Returns false if the task does not exist.
    async fn set_completed(&self, id: i64, completed: bool) -> TaskStoreResult<bool>;

    /// Deletes a task. Returns false if the task does not exist.
    async fn delete_task(&self, id: i64) -> TaskStoreResult<bool>;

    /// Overwrites a task's priority verbatim. Returns false if the task does
    /// not exist.
    async fn set_priority(&self, id: i64, priority: &str) -> TaskStoreResult<bool>;

    /// Returns a fixed label identifying the backend.
    fn backend_name(&self) -> &'static str;

    /// Lists tasks matching the filter, ordered by ascending id.
    async fn list_filtered(&self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>> {
        let tasks = self.list_tasks().await?;
        Ok(tasks.into_iter().filter(|t| filter.matches(t)).collect())
    }

    /// Computes summary statistics over every task.
    async fn stats(&self) -> TaskStoreResult<TaskStats> {
        let tasks = self.list_tasks().await?;
        Ok(TaskStats::from_tasks(&tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = TaskFilter::new();
        let mut task = Task::new(1, "a", "low", None);

        assert!(filter.matches(&task));
        task.set_completed(true);
        assert!(filter.matches(&task));
    }

    #[test]
    fn test_filter_combines_status_and_priority() {
        let filter = TaskFilter::new()
            .with_status(TaskStatusFilter::Pending)
            .with_priority("high");

        let high_pending = Task::new(1, "a", "high", None);
        let low_pending = Task::new(2, "b", "low", None);
        let mut high_done = Task::new(3, "c", "high", None);
        high_done.set_completed(true);

        assert!(filter.matches(&high_pending));
        assert!(!filter.matches(&low_pending));
        assert!(!filter.matches(&high_done));
    }

    #[test]
    fn test_priority_filter_is_exact() {
        let filter = TaskFilter::new().with_priority("High");
        assert!(!filter.matches(&Task::new(1, "a", "high", None)));
    }
}
