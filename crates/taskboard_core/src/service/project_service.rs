//! Project use-case service.
//!
//! # Invariants
//! - The requester of `create_project` becomes the immutable owner.
//! - Only the owner updates or deletes; deletion cascades in storage.

use crate::model::project::{Project, ProjectDraft, ProjectId, ProjectPatch};
use crate::model::user::UserId;
use crate::repo::member_repo::SqliteMemberRepository;
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::service::access::{can_act, ProjectAccess, ProjectRole};
use crate::service::error::ServiceResult;
use crate::service::{in_transaction, ready};
use log::info;
use rusqlite::Connection;

pub struct ProjectService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ProjectService<'conn> {
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        ready(conn)?;
        Ok(Self { conn })
    }

    pub fn create_project(&self, draft: ProjectDraft, requester: UserId) -> ServiceResult<Project> {
        let project = Project::new(requester, draft);
        project.validate()?;

        in_transaction(self.conn, |tx| {
            SqliteProjectRepository::new(tx).create_project(&project)?;
            Ok(())
        })?;

        info!(
            "event=project_create module=project status=ok project_id={} owner_id={}",
            project.id, project.owner_id
        );
        Ok(project)
    }

    /// Loads a project with the requester's role; owner or accepted member.
    pub fn get_project(
        &self,
        project_id: ProjectId,
        requester: UserId,
    ) -> ServiceResult<ProjectAccess> {
        in_transaction(self.conn, |tx| {
            can_act(
                &SqliteProjectRepository::new(tx),
                &SqliteMemberRepository::new(tx),
                requester,
                project_id,
                ProjectRole::Member,
            )
        })
    }

    pub fn list_owned_projects(&self, requester: UserId) -> ServiceResult<Vec<Project>> {
        in_transaction(self.conn, |tx| {
            Ok(SqliteProjectRepository::new(tx).list_owned_projects(requester)?)
        })
    }

    pub fn update_project(
        &self,
        project_id: ProjectId,
        patch: &ProjectPatch,
        requester: UserId,
    ) -> ServiceResult<Project> {
        let project = in_transaction(self.conn, |tx| {
            let projects = SqliteProjectRepository::new(tx);
            let access = can_act(
                &projects,
                &SqliteMemberRepository::new(tx),
                requester,
                project_id,
                ProjectRole::Owner,
            )?;
            let mut project = access.project;
            if patch.is_empty() {
                return Ok(project);
            }
            patch.apply(&mut project);
            projects.update_project(&project)?;
            Ok(project)
        })?;

        info!(
            "event=project_update module=project status=ok project_id={}",
            project.id
        );
        Ok(project)
    }

    /// Deletes the project together with its members, sprints and tasks.
    pub fn delete_project(&self, project_id: ProjectId, requester: UserId) -> ServiceResult<()> {
        in_transaction(self.conn, |tx| {
            let projects = SqliteProjectRepository::new(tx);
            can_act(
                &projects,
                &SqliteMemberRepository::new(tx),
                requester,
                project_id,
                ProjectRole::Owner,
            )?;
            projects.delete_project(project_id)?;
            Ok(())
        })?;

        info!(
            "event=project_delete module=project status=ok project_id={}",
            project_id
        );
        Ok(())
    }
}
