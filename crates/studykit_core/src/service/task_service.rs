//! Task (todo) use-case service.
//!
//! # Invariants
//! - `list_tasks` order: open before completed, then earliest due date
//!   (undated last), then creation time, then id.

use super::collection::{Collection, Record};
use super::ServiceResult;
use crate::model::task::{Task, TaskId, TaskPriority, TaskValidationError};
use crate::store::keys::TASKS_KEY;
use crate::store::{KeyedStore, StorageBackend};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

impl Record for Task {
    const KIND: &'static str = "task";
    type Invalid = TaskValidationError;

    fn id(&self) -> Uuid {
        self.id
    }

    fn check(&self) -> Result<(), Self::Invalid> {
        self.validate()
    }
}

/// Task facade over the `tasks` slice.
pub struct TaskService<'s, B: StorageBackend> {
    tasks: Collection<'s, Task, B>,
}

impl<'s, B: StorageBackend> TaskService<'s, B> {
    pub fn open(store: &'s KeyedStore<B>) -> ServiceResult<Self> {
        Ok(Self {
            tasks: Collection::open(store, TASKS_KEY)?,
        })
    }

    pub fn add_task(
        &mut self,
        title: impl Into<String>,
        priority: TaskPriority,
        due_date: Option<DateTime<Utc>>,
    ) -> ServiceResult<Task> {
        let task = Task::new(title, priority, due_date)?;
        self.tasks.insert(task)
    }

    pub fn get_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Tasks in display order.
    pub fn list_tasks(&self) -> Vec<&Task> {
        let mut tasks = self.tasks.items().iter().collect::<Vec<_>>();
        tasks.sort_by(|left, right| compare_for_display(left, right));
        tasks
    }

    pub fn set_completed(&mut self, id: TaskId, completed: bool) -> ServiceResult<Task> {
        self.tasks
            .modify(id, |task| -> Result<(), TaskValidationError> {
                task.set_completed(completed);
                task.validate()
            })
    }

    pub fn delete_task(&mut self, id: TaskId) -> ServiceResult<()> {
        self.tasks.remove(id)?;
        Ok(())
    }

    pub fn persistence_degraded(&self) -> bool {
        self.tasks.persistence_degraded()
    }
}

fn compare_for_display(left: &Task, right: &Task) -> Ordering {
    left.completed
        .cmp(&right.completed)
        .then_with(|| match (left.due_date, right.due_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| left.created_at.cmp(&right.created_at))
        .then_with(|| left.id.cmp(&right.id))
}
