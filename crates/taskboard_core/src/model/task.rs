//! Task entity and its priority reference data.
//!
//! # Invariants
//! - A task belongs to one project and at most one sprint of that project.
//! - `timestamp` is only set together with `date_finished`.

use super::project::ProjectId;
use super::sprint::SprintId;
use super::{check_length, check_stored_date, ValidationError};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;
pub type PriorityId = i64;

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 100;
const DESCRIPTION_MIN: usize = 3;
const DESCRIPTION_MAX: usize = 1000;

/// Read-only priority label seeded by migrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub id: PriorityId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub sprint_id: Option<SprintId>,
    pub priority_id: PriorityId,
    pub name: String,
    pub description: String,
    pub date_created: NaiveDate,
    pub date_finished: Option<NaiveDate>,
    pub timestamp: Option<NaiveDateTime>,
}

impl Task {
    /// Creates an unassigned, unfinished task.
    pub fn new(project_id: ProjectId, draft: TaskDraft, date_created: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            sprint_id: None,
            priority_id: draft.priority_id,
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            date_created,
            date_finished: None,
            timestamp: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("task name", &self.name, NAME_MIN, NAME_MAX)?;
        check_length(
            "task description",
            &self.description,
            DESCRIPTION_MIN,
            DESCRIPTION_MAX,
        )?;
        if self.priority_id < 1 {
            return Err(ValidationError::InvalidPriority(self.priority_id));
        }
        check_stored_date("date created", self.date_created)?;
        if let Some(finished) = self.date_finished {
            check_stored_date("date finished", finished)?;
        }
        Ok(())
    }

    /// Whether the task counts as done on `day` for chart purposes.
    pub fn is_finished_by(&self, day: NaiveDate) -> bool {
        self.date_finished.is_some_and(|finished| finished <= day)
    }

    pub fn finish(&mut self, finished_at: NaiveDateTime) {
        self.date_finished = Some(finished_at.date());
        self.timestamp = Some(finished_at);
    }

    pub fn reopen(&mut self) {
        self.date_finished = None;
        self.timestamp = None;
    }
}

/// Input for task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub priority_id: PriorityId,
}

/// Partial task update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority_id: Option<PriorityId>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.priority_id.is_none()
    }

    pub fn apply(&self, task: &mut Task) -> Result<(), ValidationError> {
        let mut patched = task.clone();
        if let Some(name) = self.name.as_deref() {
            patched.name = name.trim().to_string();
        }
        if let Some(description) = self.description.as_deref() {
            patched.description = description.trim().to_string();
        }
        if let Some(priority_id) = self.priority_id {
            patched.priority_id = priority_id;
        }
        patched.validate()?;
        *task = patched;
        Ok(())
    }
}

/// Task joined with its resolved priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskWithPriority {
    pub task: Task,
    pub priority: Priority,
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskDraft, TaskPatch};
    use crate::model::ValidationError;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn task() -> Task {
        Task::new(
            Uuid::new_v4(),
            TaskDraft {
                name: "Write docs".to_string(),
                description: "Cover the API".to_string(),
                priority_id: 2,
            },
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        )
    }

    #[test]
    fn finish_sets_date_and_timestamp_together() {
        let mut task = task();
        let at = NaiveDate::from_ymd_opt(2024, 1, 12)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        task.finish(at);
        assert_eq!(task.date_finished, Some(at.date()));
        assert_eq!(task.timestamp, Some(at));
        assert!(task.is_finished_by(at.date()));
        assert!(!task.is_finished_by(NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()));

        task.reopen();
        assert_eq!(task.date_finished, None);
        assert_eq!(task.timestamp, None);
    }

    #[test]
    fn patch_rejects_short_name_and_keeps_task() {
        let mut task = task();
        let err = TaskPatch {
            name: Some("ab".to_string()),
            ..TaskPatch::default()
        }
        .apply(&mut task)
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooShort {
                field: "task name",
                min: 3
            }
        );
        assert_eq!(task.name, "Write docs");
    }

    #[test]
    fn zero_priority_is_invalid() {
        let mut task = task();
        task.priority_id = 0;
        assert_eq!(task.validate(), Err(ValidationError::InvalidPriority(0)));
    }
}
