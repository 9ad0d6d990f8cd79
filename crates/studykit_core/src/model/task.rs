//! Task (todo) model.
//!
//! # Invariants
//! - `title` is non-empty after trim.
//! - `completed_at.is_some() == completed`.

use crate::codec::iso8601;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TaskId = Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    /// `completed` and `completed_at` disagree.
    CompletionMismatch,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::CompletionMismatch => {
                write!(f, "task completion flag and completion time disagree")
            }
        }
    }
}

impl Error for TaskValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default, with = "iso8601::utc_option")]
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    #[serde(default, with = "iso8601::utc_option")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(with = "iso8601::utc")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601::utc")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        priority: TaskPriority,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Self, TaskValidationError> {
        let now = iso8601::now_utc();
        let task = Self {
            id: Uuid::new_v4(),
            title: title.into().trim().to_string(),
            priority,
            due_date: due_date.map(iso8601::truncate_to_millis),
            completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        task.validate()?;
        Ok(task)
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.completed != self.completed_at.is_some() {
            return Err(TaskValidationError::CompletionMismatch);
        }
        Ok(())
    }

    /// Sets completion state; re-completing keeps the original time.
    pub fn set_completed(&mut self, completed: bool) {
        let now = iso8601::now_utc();
        match (self.completed, completed) {
            (false, true) => self.completed_at = Some(now),
            (true, false) => self.completed_at = None,
            _ => return,
        }
        self.completed = completed;
        self.updated_at = now;
    }

    /// Open and past due at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskPriority, TaskValidationError};
    use chrono::{Duration, Utc};

    #[test]
    fn completion_toggles_timestamp() {
        let mut task = Task::new("Read chapter 3", TaskPriority::High, None).unwrap();
        task.set_completed(true);
        assert!(task.completed_at.is_some());
        task.validate().unwrap();

        task.set_completed(false);
        assert!(task.completed_at.is_none());
        task.validate().unwrap();
    }

    #[test]
    fn empty_title_is_rejected() {
        assert_eq!(
            Task::new(" ", TaskPriority::Low, None).unwrap_err(),
            TaskValidationError::EmptyTitle
        );
    }

    #[test]
    fn overdue_requires_open_task_past_due() {
        let now = Utc::now();
        let mut task =
            Task::new("Lab report", TaskPriority::Medium, Some(now - Duration::hours(1))).unwrap();
        assert!(task.is_overdue(now));
        task.set_completed(true);
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn missing_optional_fields_deserialize_with_defaults() {
        let json = r#"{
            "id": "00000000-0000-4000-8000-000000000001",
            "title": "legacy",
            "completed": false,
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.due_date.is_none());
    }
}
