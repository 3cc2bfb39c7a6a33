//! Task priority definitions.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Priority level of a Task.
///
/// Storage backends persist priorities as plain strings and never validate
/// them. Callers use this type to check user input before handing it to a
/// store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal work.
    #[default]
    Medium,
    /// Should be done soon.
    High,
    /// Needs attention now.
    Urgent,
}

impl TaskPriority {
    /// Every priority, lowest first.
    pub const ALL: [TaskPriority; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    /// Returns the persisted string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known priority.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Priority must be one of: low, medium, high, urgent (got '{0}')")]
pub struct ParsePriorityError(pub String);

impl FromStr for TaskPriority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParsePriorityError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(TaskPriority::default().as_str(), "medium");
    }

    #[test]
    fn test_parse_known_priorities() {
        for priority in TaskPriority::ALL {
            assert_eq!(priority.as_str().parse::<TaskPriority>(), Ok(priority));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_case_variants() {
        let err = "critical".parse::<TaskPriority>().unwrap_err();
        assert_eq!(err, ParsePriorityError("critical".to_string()));
        assert!(err.to_string().contains("low, medium, high, urgent"));

        assert!("High".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn test_ordering_follows_urgency() {
        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert!(TaskPriority::High < TaskPriority::Urgent);
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&TaskPriority::Urgent).unwrap();
        assert_eq!(json, "\"urgent\"");
    }
}
