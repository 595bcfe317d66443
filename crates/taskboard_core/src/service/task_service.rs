//! Task backlog use-case service.
//!
//! # Invariants
//! - Owner and accepted members have edit rights on project tasks.
//! - `date_created` is assigned by the service, never by callers.
//! - Sprint links are managed by `SprintService`, not here.

use crate::model::project::ProjectId;
use crate::model::task::{Priority, Task, TaskDraft, TaskId, TaskPatch, TaskWithPriority};
use crate::model::user::UserId;
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::service::access::ProjectRole;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{authorize, in_transaction, ready};
use chrono::{NaiveDateTime, Utc};
use log::info;
use rusqlite::{Connection, Transaction};

pub struct TaskService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> TaskService<'conn> {
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        ready(conn)?;
        Ok(Self { conn })
    }

    /// Creates an unassigned task dated today (UTC).
    pub fn create_task(
        &self,
        project_id: ProjectId,
        draft: TaskDraft,
        requester: UserId,
    ) -> ServiceResult<TaskWithPriority> {
        let task = Task::new(project_id, draft, Utc::now().date_naive());

        let created = in_transaction(self.conn, |tx| {
            authorize(tx, requester, project_id, ProjectRole::Member)?;
            task.validate()?;
            let tasks = SqliteTaskRepository::new(tx);
            let priority = tasks
                .get_priority(task.priority_id)?
                .ok_or(ServiceError::PriorityNotFound(task.priority_id))?;
            tasks.create_task(&task)?;
            Ok(TaskWithPriority {
                task: task.clone(),
                priority,
            })
        })?;

        info!(
            "event=task_create module=task status=ok project_id={} task_id={}",
            project_id, created.task.id
        );
        Ok(created)
    }

    pub fn get_task(&self, task_id: TaskId, requester: UserId) -> ServiceResult<TaskWithPriority> {
        in_transaction(self.conn, |tx| load_task(tx, task_id, requester))
    }

    pub fn list_tasks(
        &self,
        project_id: ProjectId,
        requester: UserId,
    ) -> ServiceResult<Vec<TaskWithPriority>> {
        in_transaction(self.conn, |tx| {
            authorize(tx, requester, project_id, ProjectRole::Member)?;
            Ok(SqliteTaskRepository::new(tx).list_project_tasks(project_id)?)
        })
    }

    /// Applies name/description/priority changes that are present.
    pub fn update_task(
        &self,
        task_id: TaskId,
        patch: &TaskPatch,
        requester: UserId,
    ) -> ServiceResult<TaskWithPriority> {
        let updated = in_transaction(self.conn, |tx| {
            let mut entry = load_task(tx, task_id, requester)?;
            if patch.is_empty() {
                return Ok(entry);
            }
            let tasks = SqliteTaskRepository::new(tx);
            if let Some(priority_id) = patch.priority_id {
                entry.priority = tasks
                    .get_priority(priority_id)?
                    .ok_or(ServiceError::PriorityNotFound(priority_id))?;
            }
            patch.apply(&mut entry.task)?;
            tasks.update_task(&entry.task)?;
            Ok(entry)
        })?;

        info!(
            "event=task_update module=task status=ok task_id={}",
            task_id
        );
        Ok(updated)
    }

    /// Marks the task finished at `finished_at`, replacing any earlier mark.
    pub fn finish_task(
        &self,
        task_id: TaskId,
        finished_at: NaiveDateTime,
        requester: UserId,
    ) -> ServiceResult<TaskWithPriority> {
        let finished = self.mutate_task(task_id, requester, |task| task.finish(finished_at))?;
        info!(
            "event=task_finish module=task status=ok task_id={} date_finished={}",
            task_id,
            finished_at.date()
        );
        Ok(finished)
    }

    /// Clears completion fields.
    pub fn reopen_task(&self, task_id: TaskId, requester: UserId) -> ServiceResult<TaskWithPriority> {
        let reopened = self.mutate_task(task_id, requester, Task::reopen)?;
        info!(
            "event=task_reopen module=task status=ok task_id={}",
            task_id
        );
        Ok(reopened)
    }

    pub fn delete_task(&self, task_id: TaskId, requester: UserId) -> ServiceResult<()> {
        in_transaction(self.conn, |tx| {
            load_task(tx, task_id, requester)?;
            SqliteTaskRepository::new(tx).delete_task(task_id)?;
            Ok(())
        })?;

        info!(
            "event=task_delete module=task status=ok task_id={}",
            task_id
        );
        Ok(())
    }

    pub fn list_priorities(&self) -> ServiceResult<Vec<Priority>> {
        in_transaction(self.conn, |tx| {
            Ok(SqliteTaskRepository::new(tx).list_priorities()?)
        })
    }

    fn mutate_task(
        &self,
        task_id: TaskId,
        requester: UserId,
        change: impl FnOnce(&mut Task),
    ) -> ServiceResult<TaskWithPriority> {
        in_transaction(self.conn, |tx| {
            let mut entry = load_task(tx, task_id, requester)?;
            change(&mut entry.task);
            SqliteTaskRepository::new(tx).update_task(&entry.task)?;
            Ok(entry)
        })
    }
}

/// Loads a task and checks edit rights on its project.
fn load_task(
    tx: &Transaction<'_>,
    task_id: TaskId,
    requester: UserId,
) -> ServiceResult<TaskWithPriority> {
    let entry = SqliteTaskRepository::new(tx)
        .get_task(task_id)?
        .ok_or(ServiceError::TaskNotFound(task_id))?;
    authorize(tx, requester, entry.task.project_id, ProjectRole::Member)?;
    Ok(entry)
}
