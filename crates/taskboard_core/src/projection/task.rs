//! Task views with resolved priority.

use crate::model::sprint::SprintId;
use crate::model::task::{Priority, PriorityId, Task, TaskId, TaskWithPriority};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityRead {
    pub id: PriorityId,
    pub label: String,
}

impl PriorityRead {
    pub fn from_priority(priority: &Priority) -> Self {
        Self {
            id: priority.id,
            label: priority.label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRead {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub sprint_id: Option<SprintId>,
    pub date_created: NaiveDate,
    pub date_finished: Option<NaiveDate>,
    pub timestamp: Option<NaiveDateTime>,
    pub priority: PriorityRead,
}

impl TaskRead {
    pub fn from_task(task: &Task, priority: &Priority) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            description: task.description.clone(),
            sprint_id: task.sprint_id,
            date_created: task.date_created,
            date_finished: task.date_finished,
            timestamp: task.timestamp,
            priority: PriorityRead::from_priority(priority),
        }
    }
}

impl From<&TaskWithPriority> for TaskRead {
    fn from(value: &TaskWithPriority) -> Self {
        Self::from_task(&value.task, &value.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::TaskRead;
    use crate::model::task::{Priority, Task, TaskDraft};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn unfinished_task_renders_nulls() {
        let task = Task::new(
            Uuid::new_v4(),
            TaskDraft {
                name: "Plan".to_string(),
                description: "Plan sprint".to_string(),
                priority_id: 3,
            },
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        );
        let priority = Priority {
            id: 3,
            label: "high".to_string(),
        };

        let read = TaskRead::from_task(&task, &priority);
        let json = serde_json::to_value(&read).unwrap();
        assert!(json["date_finished"].is_null());
        assert!(json["timestamp"].is_null());
        assert!(json["sprint_id"].is_null());
        assert_eq!(json["date_created"], "2024-04-01");
        assert_eq!(json["priority"]["label"], "high");
    }
}
