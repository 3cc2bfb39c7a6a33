//! Task entity definitions.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TaskPriority;

/// A tracked unit of work.
///
/// Only `completed`, `completed_at` and `priority` change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier, strictly positive and never reused.
    pub id: i64,
    /// Free-form title.
    pub title: String,
    /// Priority as given by the caller, stored verbatim.
    pub priority: String,
    /// Optional due date (ISO date text, unvalidated).
    #[serde(default)]
    pub due_date: Option<String>,
    /// When this record was created.
    pub created: DateTime<Utc>,
    /// Whether the task is done.
    #[serde(default)]
    pub completed: bool,
    /// When the task was last marked done.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new pending task.
    pub fn new(
        id: i64,
        title: impl Into<String>,
        priority: impl Into<String>,
        due_date: Option<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            priority: priority.into(),
            due_date,
            created: Utc::now(),
            completed: false,
            completed_at: None,
        }
    }

    /// Sets the completion flag, stamping or clearing `completed_at`.
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        self.completed_at = completed.then(Utc::now);
    }

    /// Returns the parsed priority, or `None` if the stored string is not a
    /// known level.
    pub fn priority_level(&self) -> Option<TaskPriority> {
        self.priority.parse().ok()
    }
}

/// Completion-state filter used when listing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatusFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks not yet completed.
    Pending,
    /// Completed tasks.
    Completed,
}

impl TaskStatusFilter {
    /// Returns the `completed` value this filter selects, if any.
    pub fn completed(&self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Pending => Some(false),
            Self::Completed => Some(true),
        }
    }

    /// Returns true if the task passes this filter.
    pub fn matches(&self, task: &Task) -> bool {
        self.completed().is_none_or(|c| task.completed == c)
    }

    /// Returns the string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known status filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Status must be one of: all, pending, completed (got '{0}')")]
pub struct ParseStatusFilterError(pub String);

impl FromStr for TaskStatusFilter {
    type Err = ParseStatusFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(ParseStatusFilterError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new(1, "Buy milk", "high", Some("2025-01-01".to_string()));

        assert_eq!(task.id, 1);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.priority, "high");
        assert_eq!(task.due_date.as_deref(), Some("2025-01-01"));
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_set_completed_stamps_and_clears() {
        let mut task = Task::new(1, "Write report", "medium", None);

        task.set_completed(true);
        assert!(task.completed);
        assert!(task.completed_at.is_some());

        task.set_completed(false);
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_priority_level() {
        let mut task = Task::new(1, "t", "urgent", None);
        assert_eq!(task.priority_level(), Some(TaskPriority::Urgent));

        task.priority = "someday".to_string();
        assert_eq!(task.priority_level(), None);
    }

    #[test]
    fn test_status_filter() {
        let pending = Task::new(1, "a", "low", None);
        let mut done = Task::new(2, "b", "low", None);
        done.set_completed(true);

        assert!(TaskStatusFilter::All.matches(&pending));
        assert!(TaskStatusFilter::All.matches(&done));
        assert!(TaskStatusFilter::Pending.matches(&pending));
        assert!(!TaskStatusFilter::Pending.matches(&done));
        assert!(TaskStatusFilter::Completed.matches(&done));
        assert!(!TaskStatusFilter::Completed.matches(&pending));
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("pending".parse::<TaskStatusFilter>(), Ok(TaskStatusFilter::Pending));
        assert_eq!("all".parse::<TaskStatusFilter>(), Ok(TaskStatusFilter::All));
        assert!("done".parse::<TaskStatusFilter>().is_err());
    }

    #[test]
    fn test_json_uses_plain_field_names() {
        let task = Task::new(7, "Call mom", "medium", None);
        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["title"], "Call mom");
        assert_eq!(value["priority"], "medium");
        assert!(value["due_date"].is_null());
        assert_eq!(value["completed"], false);
        assert!(value["completed_at"].is_null());
        assert!(value["created"].is_string());
    }

    #[test]
    fn test_json_missing_optional_fields_default() {
        let json = r#"{"id":3,"title":"x","priority":"low","created":"2025-01-01T00:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.id, 3);
        assert!(task.due_date.is_none());
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }
}
