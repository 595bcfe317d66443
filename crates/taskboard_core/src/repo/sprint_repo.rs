//! Sprint repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Dates are stored as ISO `YYYY-MM-DD` text so SQL ordering matches
//!   calendar ordering.
//! - Project sprint listing is ordered by `start_date ASC, uuid ASC`.

use super::{parse_uuid, RepoError, RepoResult};
use crate::model::project::ProjectId;
use crate::model::sprint::{Sprint, SprintId, SprintStatus};
use rusqlite::{params, Connection, Row};

const SPRINT_SELECT_SQL: &str = "SELECT
    uuid,
    project_uuid,
    name,
    start_date,
    end_date,
    status
FROM sprints";

/// Repository interface for sprint persistence.
pub trait SprintRepository {
    fn create_sprint(&self, sprint: &Sprint) -> RepoResult<SprintId>;
    fn get_sprint(&self, id: SprintId) -> RepoResult<Option<Sprint>>;
    fn update_sprint(&self, sprint: &Sprint) -> RepoResult<()>;
    fn delete_sprint(&self, id: SprintId) -> RepoResult<()>;
    fn list_project_sprints(&self, project_id: ProjectId) -> RepoResult<Vec<Sprint>>;
}

/// SQLite-backed sprint repository.
pub struct SqliteSprintRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSprintRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SprintRepository for SqliteSprintRepository<'_> {
    fn create_sprint(&self, sprint: &Sprint) -> RepoResult<SprintId> {
        sprint.validate()?;

        self.conn.execute(
            "INSERT INTO sprints (
                uuid,
                project_uuid,
                name,
                start_date,
                end_date,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                sprint.id.to_string(),
                sprint.project_id.to_string(),
                sprint.name,
                sprint.start_date,
                sprint.end_date,
                sprint.status.as_str(),
            ],
        )?;

        Ok(sprint.id)
    }

    fn get_sprint(&self, id: SprintId) -> RepoResult<Option<Sprint>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SPRINT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_sprint_row(row)?));
        }
        Ok(None)
    }

    fn update_sprint(&self, sprint: &Sprint) -> RepoResult<()> {
        sprint.validate()?;

        let changed = self.conn.execute(
            "UPDATE sprints
             SET
                name = ?2,
                start_date = ?3,
                end_date = ?4,
                status = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                sprint.id.to_string(),
                sprint.name,
                sprint.start_date,
                sprint.end_date,
                sprint.status.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("sprint", sprint.id));
        }
        Ok(())
    }

    fn delete_sprint(&self, id: SprintId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM sprints WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("sprint", id));
        }
        Ok(())
    }

    fn list_project_sprints(&self, project_id: ProjectId) -> RepoResult<Vec<Sprint>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SPRINT_SELECT_SQL}
             WHERE project_uuid = ?1
             ORDER BY start_date ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut sprints = Vec::new();
        while let Some(row) = rows.next()? {
            sprints.push(parse_sprint_row(row)?);
        }
        Ok(sprints)
    }
}

fn parse_sprint_row(row: &Row<'_>) -> RepoResult<Sprint> {
    let uuid: String = row.get("uuid")?;
    let project_uuid: String = row.get("project_uuid")?;
    let status_text: String = row.get("status")?;
    let status = SprintStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid sprint status `{status_text}` in sprints.status"
        ))
    })?;

    let sprint = Sprint {
        id: parse_uuid(&uuid, "sprints.uuid")?,
        project_id: parse_uuid(&project_uuid, "sprints.project_uuid")?,
        name: row.get("name")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        status,
    };
    sprint.validate()?;
    Ok(sprint)
}
