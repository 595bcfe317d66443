//! Sprint use-case service.
//!
//! # Responsibility
//! - Sprint CRUD for project owners.
//! - Task-to-sprint assignment for anyone with edit rights.
//! - Burndown chart projection for readers.
//!
//! # Invariants
//! - A task links to at most one sprint, and only to sprints of its own
//!   project. Reassignment replaces the previous link.
//! - Deleting a sprint first unassigns its tasks in the same transaction.

use crate::model::project::ProjectId;
use crate::model::sprint::{Sprint, SprintDraft, SprintId, SprintPatch};
use crate::model::task::{Task, TaskId, TaskWithPriority};
use crate::model::user::UserId;
use crate::projection::sprint::SprintReadChart;
use crate::repo::sprint_repo::{SprintRepository, SqliteSprintRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::service::access::{ProjectAccess, ProjectRole};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{authorize, in_transaction, ready};
use log::{debug, info};
use rusqlite::{Connection, Transaction};

pub struct SprintService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SprintService<'conn> {
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        ready(conn)?;
        Ok(Self { conn })
    }

    /// Creates an open sprint. Owner only.
    pub fn create_sprint(
        &self,
        project_id: ProjectId,
        draft: SprintDraft,
        requester: UserId,
    ) -> ServiceResult<Sprint> {
        let sprint = Sprint::new(project_id, draft);

        in_transaction(self.conn, |tx| {
            authorize(tx, requester, project_id, ProjectRole::Owner)?;
            sprint.validate()?;
            SqliteSprintRepository::new(tx).create_sprint(&sprint)?;
            Ok(())
        })?;

        info!(
            "event=sprint_create module=sprint status=ok project_id={} sprint_id={}",
            project_id, sprint.id
        );
        Ok(sprint)
    }

    /// Loads one sprint for the owner or an accepted member.
    pub fn read_sprint(&self, sprint_id: SprintId, requester: UserId) -> ServiceResult<Sprint> {
        in_transaction(self.conn, |tx| {
            let (sprint, _) = load_sprint(tx, sprint_id, requester, ProjectRole::Member)?;
            Ok(sprint)
        })
    }

    pub fn list_sprints(
        &self,
        project_id: ProjectId,
        requester: UserId,
    ) -> ServiceResult<Vec<Sprint>> {
        in_transaction(self.conn, |tx| {
            authorize(tx, requester, project_id, ProjectRole::Member)?;
            Ok(SqliteSprintRepository::new(tx).list_project_sprints(project_id)?)
        })
    }

    /// Applies the provided patch fields. Owner only.
    ///
    /// # Errors
    /// - `InvalidDateRange` when the patched range has start after end.
    pub fn update_sprint(
        &self,
        sprint_id: SprintId,
        patch: &SprintPatch,
        requester: UserId,
    ) -> ServiceResult<Sprint> {
        let sprint = in_transaction(self.conn, |tx| {
            let (mut sprint, _) = load_sprint(tx, sprint_id, requester, ProjectRole::Owner)?;
            if patch.is_empty() {
                return Ok(sprint);
            }
            patch.apply(&mut sprint)?;
            SqliteSprintRepository::new(tx).update_sprint(&sprint)?;
            Ok(sprint)
        })?;

        info!(
            "event=sprint_update module=sprint status=ok sprint_id={} sprint_status={}",
            sprint.id,
            sprint.status.as_str()
        );
        Ok(sprint)
    }

    /// Unassigns every linked task, then deletes the sprint. Owner only.
    ///
    /// Returns the number of tasks that were unassigned.
    pub fn delete_sprint(&self, sprint_id: SprintId, requester: UserId) -> ServiceResult<usize> {
        let unassigned = in_transaction(self.conn, |tx| {
            load_sprint(tx, sprint_id, requester, ProjectRole::Owner)?;
            let unassigned = SqliteTaskRepository::new(tx).unassign_sprint_tasks(sprint_id)?;
            SqliteSprintRepository::new(tx).delete_sprint(sprint_id)?;
            Ok(unassigned)
        })?;

        info!(
            "event=sprint_delete module=sprint status=ok sprint_id={} unassigned_tasks={}",
            sprint_id, unassigned
        );
        Ok(unassigned)
    }

    /// Links a task to a sprint, replacing any previous link.
    ///
    /// Assigning a task to the sprint it already belongs to is a no-op.
    ///
    /// # Errors
    /// - `TaskNotFound` / `SprintNotFound` for missing entities.
    /// - `Forbidden` without edit rights on the task's project; checked
    ///   before the projects are compared.
    /// - `TaskOutsideProject` when task and sprint belong to different
    ///   projects.
    pub fn assign_task_to_sprint(
        &self,
        task_id: TaskId,
        sprint_id: SprintId,
        requester: UserId,
    ) -> ServiceResult<TaskWithPriority> {
        let (assigned, previous) = in_transaction(self.conn, |tx| {
            let tasks = SqliteTaskRepository::new(tx);
            let mut entry = tasks
                .get_task(task_id)?
                .ok_or(ServiceError::TaskNotFound(task_id))?;
            let sprint = SqliteSprintRepository::new(tx)
                .get_sprint(sprint_id)?
                .ok_or(ServiceError::SprintNotFound(sprint_id))?;
            authorize(tx, requester, entry.task.project_id, ProjectRole::Member)?;
            if entry.task.project_id != sprint.project_id {
                return Err(ServiceError::TaskOutsideProject { task_id, sprint_id });
            }

            let previous = entry.task.sprint_id;
            if previous != Some(sprint_id) {
                tasks.set_task_sprint(task_id, Some(sprint_id))?;
                entry.task.sprint_id = Some(sprint_id);
            }
            Ok((entry, previous))
        })?;

        info!(
            "event=task_assign module=sprint status=ok task_id={} sprint_id={} replaced={}",
            task_id,
            sprint_id,
            previous.is_some_and(|id| id != sprint_id)
        );
        Ok(assigned)
    }

    /// Clears the sprint link of a task; a no-op when it has none.
    pub fn unassign_task(&self, task_id: TaskId, requester: UserId) -> ServiceResult<TaskWithPriority> {
        let task = in_transaction(self.conn, |tx| {
            let tasks = SqliteTaskRepository::new(tx);
            let mut entry = tasks
                .get_task(task_id)?
                .ok_or(ServiceError::TaskNotFound(task_id))?;
            authorize(tx, requester, entry.task.project_id, ProjectRole::Member)?;
            if entry.task.sprint_id.is_some() {
                tasks.set_task_sprint(task_id, None)?;
                entry.task.sprint_id = None;
            }
            Ok(entry)
        })?;

        info!(
            "event=task_unassign module=sprint status=ok task_id={}",
            task_id
        );
        Ok(task)
    }

    /// Computes the burndown series of a sprint. Same access as
    /// `read_sprint`.
    pub fn sprint_chart(
        &self,
        sprint_id: SprintId,
        requester: UserId,
    ) -> ServiceResult<SprintReadChart> {
        let (sprint, tasks) = in_transaction(self.conn, |tx| {
            let (sprint, _) = load_sprint(tx, sprint_id, requester, ProjectRole::Member)?;
            let tasks: Vec<Task> = SqliteTaskRepository::new(tx)
                .list_sprint_tasks(sprint_id)?
                .into_iter()
                .map(|entry| entry.task)
                .collect();
            Ok((sprint, tasks))
        })?;

        debug!(
            "event=sprint_chart module=sprint status=ok sprint_id={} tasks={}",
            sprint_id,
            tasks.len()
        );
        Ok(SprintReadChart::from_sprint(&sprint, &tasks))
    }
}

/// Loads a sprint and checks `required` on its project.
fn load_sprint(
    tx: &Transaction<'_>,
    sprint_id: SprintId,
    requester: UserId,
    required: ProjectRole,
) -> ServiceResult<(Sprint, ProjectAccess)> {
    let sprint = SqliteSprintRepository::new(tx)
        .get_sprint(sprint_id)?
        .ok_or(ServiceError::SprintNotFound(sprint_id))?;
    let access = authorize(tx, requester, sprint.project_id, required)?;
    Ok((sprint, access))
}
