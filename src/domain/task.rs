use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::BoardError;

/// Unique identifier for a task: the creation time in Unix milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a TaskId from a millisecond timestamp
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TaskId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(BoardError::InvalidTaskId(s.to_string()))
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority, shown as one of three row styles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// The selector order wraps: low → medium → high → low
    pub fn next(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!(
                "Invalid priority '{}'. Valid priorities: low, medium, high",
                s
            )),
        }
    }
}

/// A task on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task, trimming the text.
    ///
    /// Fails with [`BoardError::EmptyTaskText`] when nothing is left after trimming.
    pub fn new(
        id: TaskId,
        text: &str,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Result<Self, BoardError> {
        let text = normalize_text(text)?;
        Ok(Self {
            id,
            text,
            priority,
            created_at,
        })
    }

    /// Replaces text and priority, keeping id and creation time
    pub fn edit(&mut self, text: &str, priority: Priority) -> Result<(), BoardError> {
        self.text = normalize_text(text)?;
        self.priority = priority;
        Ok(())
    }
}

/// Trims task text and rejects it when empty
pub fn normalize_text(text: &str) -> Result<String, BoardError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BoardError::EmptyTaskText);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_from_millis() {
        let id = TaskId::from_millis(1_700_000_000_123);
        assert_eq!(id.as_str(), "1700000000123");
        assert_eq!("1700000000123".parse::<TaskId>().unwrap(), id);
    }

    #[test]
    fn test_task_id_parsing() {
        let id = TaskId::from_str("42").unwrap();
        assert_eq!(id.as_str(), "42");

        let id = TaskId::from_str(" 17 ").unwrap();
        assert_eq!(id.as_str(), "17");

        assert!(TaskId::from_str("").is_err());
        assert!(TaskId::from_str("abc").is_err());
        assert!(TaskId::from_str("12a").is_err());
    }

    #[test]
    fn test_priority_cycle() {
        assert_eq!(Priority::Low.next(), Priority::Medium);
        assert_eq!(Priority::Medium.next(), Priority::High);
        assert_eq!(Priority::High.next(), Priority::Low);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_parsing() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_task_new_trims_text() {
        let task = Task::new(TaskId::from_millis(1), "  Buy milk  ", Priority::High, Utc::now())
            .unwrap();
        assert_eq!(task.text, "Buy milk");
    }

    #[test]
    fn test_task_new_rejects_blank_text() {
        let err = Task::new(TaskId::from_millis(1), "   ", Priority::Low, Utc::now()).unwrap_err();
        assert!(matches!(err, BoardError::EmptyTaskText));
    }

    #[test]
    fn test_edit_keeps_identity() {
        let created = Utc::now();
        let mut task = Task::new(TaskId::from_millis(5), "Buy milk", Priority::High, created).unwrap();

        task.edit("Buy oat milk", Priority::Low).unwrap();
        assert_eq!(task.text, "Buy oat milk");
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.id.as_str(), "5");
        assert_eq!(task.created_at, created);

        assert!(task.edit("  ", Priority::High).is_err());
        assert_eq!(task.text, "Buy oat milk");
        assert_eq!(task.priority, Priority::Low);
    }

    #[test]
    fn test_task_json_shape() {
        let task = Task::new(TaskId::from_millis(9), "Ship it", Priority::Medium, Utc::now())
            .unwrap();
        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["id"], "9");
        assert_eq!(value["text"], "Ship it");
        assert_eq!(value["priority"], "medium");
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_deserialize_browser_record() {
        let json = r#"{
        "id": "1700000000000",
        "text": "Old Task",
        "priority": "high",
        "createdAt": "2024-01-01T00:00:00.000Z"
    }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id.as_str(), "1700000000000");
        assert_eq!(task.priority, Priority::High);
    }
}
