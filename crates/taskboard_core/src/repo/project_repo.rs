//! Project repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting a project cascades to members, sprints and tasks through
//!   foreign keys; no application-side fan-out.
//! - Owned-project listing is ordered by `name ASC, uuid ASC`.

use super::{parse_uuid, RepoError, RepoResult};
use crate::model::project::{Project, ProjectId};
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT uuid, name, description, owner_uuid FROM projects";

/// Repository interface for project persistence.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
    fn list_owned_projects(&self, owner_id: UserId) -> RepoResult<Vec<Project>>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn.execute(
            "INSERT INTO projects (uuid, name, description, owner_uuid)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                project.id.to_string(),
                project.name,
                project.description,
                project.owner_id.to_string(),
            ],
        )?;

        Ok(project.id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                name = ?2,
                description = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![project.id.to_string(), project.name, project.description],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("project", project.id));
        }
        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("project", id));
        }
        Ok(())
    }

    fn list_owned_projects(&self, owner_id: UserId) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL}
             WHERE owner_uuid = ?1
             ORDER BY name ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid: String = row.get("uuid")?;
    let owner_uuid: String = row.get("owner_uuid")?;
    Ok(Project {
        id: parse_uuid(&uuid, "projects.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        owner_id: parse_uuid(&owner_uuid, "projects.owner_uuid")?,
    })
}

/// Parses a project from a row that aliases project columns with a
/// `project_` prefix.
pub(crate) fn parse_joined_project(row: &Row<'_>) -> RepoResult<Project> {
    let uuid: String = row.get("project_uuid")?;
    let owner_uuid: String = row.get("project_owner_uuid")?;
    Ok(Project {
        id: parse_uuid(&uuid, "projects.uuid")?,
        name: row.get("project_name")?,
        description: row.get("project_description")?,
        owner_id: parse_uuid(&owner_uuid, "projects.owner_uuid")?,
    })
}
