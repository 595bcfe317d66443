//! Task and priority repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist project tasks and their optional sprint link.
//! - Serve read-only priority reference data.
//!
//! # Invariants
//! - `sprint_uuid` is only changed through `set_task_sprint` and
//!   `unassign_sprint_tasks`; `update_task` never touches it.
//! - Task listings are ordered by `date_created ASC, uuid ASC`.

use super::{parse_optional_uuid, parse_uuid, RepoError, RepoResult};
use crate::model::project::ProjectId;
use crate::model::sprint::SprintId;
use crate::model::task::{Priority, PriorityId, Task, TaskId, TaskWithPriority};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TASK_SELECT_SQL: &str = "SELECT
    t.uuid AS uuid,
    t.project_uuid AS project_uuid,
    t.sprint_uuid AS sprint_uuid,
    t.priority_id AS priority_id,
    t.name AS name,
    t.description AS description,
    t.date_created AS date_created,
    t.date_finished AS date_finished,
    t.timestamp AS timestamp,
    p.label AS priority_label
FROM tasks t
INNER JOIN priorities p ON p.id = t.priority_id";

/// Repository interface for task persistence.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<TaskWithPriority>>;
    /// Writes name, description, priority and completion fields.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Replaces the sprint link of one task.
    fn set_task_sprint(&self, id: TaskId, sprint_id: Option<SprintId>) -> RepoResult<()>;
    /// Clears the sprint link on every task of the sprint; returns the count.
    fn unassign_sprint_tasks(&self, sprint_id: SprintId) -> RepoResult<usize>;
    fn list_project_tasks(&self, project_id: ProjectId) -> RepoResult<Vec<TaskWithPriority>>;
    fn list_sprint_tasks(&self, sprint_id: SprintId) -> RepoResult<Vec<TaskWithPriority>>;
    fn get_priority(&self, id: PriorityId) -> RepoResult<Option<Priority>>;
    fn list_priorities(&self) -> RepoResult<Vec<Priority>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_tasks(&self, filter_sql: &str, id: String) -> RepoResult<Vec<TaskWithPriority>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE {filter_sql}
             ORDER BY t.date_created ASC, t.uuid ASC;"
        ))?;
        let mut rows = stmt.query([id])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                project_uuid,
                sprint_uuid,
                priority_id,
                name,
                description,
                date_created,
                date_finished,
                timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.to_string(),
                task.project_id.to_string(),
                task.sprint_id.map(|value| value.to_string()),
                task.priority_id,
                task.name,
                task.description,
                task.date_created,
                task.date_finished,
                task.timestamp,
            ],
        )?;

        Ok(task.id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<TaskWithPriority>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE t.uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                priority_id = ?2,
                name = ?3,
                description = ?4,
                date_finished = ?5,
                timestamp = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                task.id.to_string(),
                task.priority_id,
                task.name,
                task.description,
                task.date_finished,
                task.timestamp,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("task", task.id));
        }
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("task", id));
        }
        Ok(())
    }

    fn set_task_sprint(&self, id: TaskId, sprint_id: Option<SprintId>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                sprint_uuid = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), sprint_id.map(|value| value.to_string())],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("task", id));
        }
        Ok(())
    }

    fn unassign_sprint_tasks(&self, sprint_id: SprintId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                sprint_uuid = NULL,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE sprint_uuid = ?1;",
            [sprint_id.to_string()],
        )?;
        Ok(changed)
    }

    fn list_project_tasks(&self, project_id: ProjectId) -> RepoResult<Vec<TaskWithPriority>> {
        self.query_tasks("t.project_uuid = ?1", project_id.to_string())
    }

    fn list_sprint_tasks(&self, sprint_id: SprintId) -> RepoResult<Vec<TaskWithPriority>> {
        self.query_tasks("t.sprint_uuid = ?1", sprint_id.to_string())
    }

    fn get_priority(&self, id: PriorityId) -> RepoResult<Option<Priority>> {
        let priority = self
            .conn
            .query_row(
                "SELECT id, label FROM priorities WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Priority {
                        id: row.get("id")?,
                        label: row.get("label")?,
                    })
                },
            )
            .optional()?;
        Ok(priority)
    }

    fn list_priorities(&self) -> RepoResult<Vec<Priority>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, label FROM priorities ORDER BY id ASC;")?;
        let priorities = stmt
            .query_map([], |row| {
                Ok(Priority {
                    id: row.get("id")?,
                    label: row.get("label")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(priorities)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<TaskWithPriority> {
    let uuid: String = row.get("uuid")?;
    let project_uuid: String = row.get("project_uuid")?;
    let priority_id: PriorityId = row.get("priority_id")?;

    let task = Task {
        id: parse_uuid(&uuid, "tasks.uuid")?,
        project_id: parse_uuid(&project_uuid, "tasks.project_uuid")?,
        sprint_id: parse_optional_uuid(row.get("sprint_uuid")?, "tasks.sprint_uuid")?,
        priority_id,
        name: row.get("name")?,
        description: row.get("description")?,
        date_created: row.get("date_created")?,
        date_finished: row.get("date_finished")?,
        timestamp: row.get("timestamp")?,
    };
    if task.timestamp.is_some() && task.date_finished.is_none() {
        return Err(RepoError::InvalidData(format!(
            "task {} has timestamp without date_finished",
            task.id
        )));
    }

    Ok(TaskWithPriority {
        task,
        priority: Priority {
            id: priority_id,
            label: row.get("priority_label")?,
        },
    })
}
