//! Task statistics.

use std::collections::BTreeMap;

use entities::Task;
use serde::Serialize;

/// Summary counts over a set of tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    /// Percentage of completed tasks, rounded to one decimal. Zero when
    /// there are no tasks.
    pub completion_rate: f64,
    /// Task count per stored priority string.
    pub priority_breakdown: BTreeMap<String, usize>,
}

impl TaskStats {
    /// Computes statistics for the given tasks.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total_tasks = tasks.len();
        let completed_tasks = tasks.iter().filter(|t| t.completed).count();

        let mut priority_breakdown = BTreeMap::new();
        for task in tasks {
            *priority_breakdown.entry(task.priority.clone()).or_insert(0) += 1;
        }

        let completion_rate = if total_tasks > 0 {
            let rate = completed_tasks as f64 / total_tasks as f64 * 100.0;
            (rate * 10.0).round() / 10.0
        } else {
            0.0
        };

        Self {
            total_tasks,
            completed_tasks,
            pending_tasks: total_tasks - completed_tasks,
            completion_rate,
            priority_breakdown,
        }
    }
}
