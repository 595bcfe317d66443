//! Member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the (project, user, status) join rows behind invitations.
//! - Provide joined listings for member lists and "my projects" views.
//!
//! # Invariants
//! - The UNIQUE (project, user) constraint surfaces as `RepoError::Duplicate`.
//! - Membership listings never include projects owned by the queried user.

use super::project_repo::parse_joined_project;
use super::user_repo::parse_joined_user;
use super::{map_unique_violation, parse_uuid, RepoError, RepoResult};
use crate::model::member::{
    Member, MemberId, MemberStatus, MemberWithUser, MembershipWithProject,
};
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};

const MEMBER_COLUMNS_SQL: &str = "m.uuid AS member_uuid,
    m.project_uuid AS member_project_uuid,
    m.user_uuid AS member_user_uuid,
    m.status AS member_status";

/// Repository interface for membership rows.
pub trait MemberRepository {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId>;
    /// Loads the row for one (project, user) pair regardless of status.
    fn get_member(&self, project_id: ProjectId, user_id: UserId) -> RepoResult<Option<Member>>;
    fn update_member_status(&self, id: MemberId, status: MemberStatus) -> RepoResult<()>;
    fn delete_member(&self, id: MemberId) -> RepoResult<()>;
    /// Lists all rows of one project, ordered by username.
    fn list_project_members(&self, project_id: ProjectId) -> RepoResult<Vec<MemberWithUser>>;
    /// Lists the user's rows with `status` on projects the user does not own.
    fn list_memberships(
        &self,
        user_id: UserId,
        status: MemberStatus,
    ) -> RepoResult<Vec<MembershipWithProject>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId> {
        self.conn
            .execute(
                "INSERT INTO members (uuid, project_uuid, user_uuid, status)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    member.id.to_string(),
                    member.project_id.to_string(),
                    member.user_id.to_string(),
                    member.status.as_str(),
                ],
            )
            .map_err(|err| {
                map_unique_violation(err, "member", || {
                    format!("project {} user {}", member.project_id, member.user_id)
                })
            })?;

        Ok(member.id)
    }

    fn get_member(&self, project_id: ProjectId, user_id: UserId) -> RepoResult<Option<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEMBER_COLUMNS_SQL}
             FROM members m
             WHERE m.project_uuid = ?1
               AND m.user_uuid = ?2;"
        ))?;
        let mut rows = stmt.query(params![project_id.to_string(), user_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn update_member_status(&self, id: MemberId, status: MemberStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE members
             SET
                status = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), status.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("member", id));
        }
        Ok(())
    }

    fn delete_member(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM members WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("member", id));
        }
        Ok(())
    }

    fn list_project_members(&self, project_id: ProjectId) -> RepoResult<Vec<MemberWithUser>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                {MEMBER_COLUMNS_SQL},
                u.uuid AS user_uuid,
                u.username AS user_username,
                u.email AS user_email
             FROM members m
             INNER JOIN users u ON u.uuid = m.user_uuid
             WHERE m.project_uuid = ?1
             ORDER BY u.username ASC, m.uuid ASC;"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(MemberWithUser {
                member: parse_member_row(row)?,
                user: parse_joined_user(row)?,
            });
        }
        Ok(items)
    }

    fn list_memberships(
        &self,
        user_id: UserId,
        status: MemberStatus,
    ) -> RepoResult<Vec<MembershipWithProject>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                {MEMBER_COLUMNS_SQL},
                p.uuid AS project_uuid,
                p.name AS project_name,
                p.description AS project_description,
                p.owner_uuid AS project_owner_uuid
             FROM members m
             INNER JOIN projects p ON p.uuid = m.project_uuid
             WHERE m.user_uuid = ?1
               AND m.status = ?2
               AND p.owner_uuid <> m.user_uuid
             ORDER BY p.name ASC, p.uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![user_id.to_string(), status.as_str()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(MembershipWithProject {
                member: parse_member_row(row)?,
                project: parse_joined_project(row)?,
            });
        }
        Ok(items)
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let uuid: String = row.get("member_uuid")?;
    let project_uuid: String = row.get("member_project_uuid")?;
    let user_uuid: String = row.get("member_user_uuid")?;
    let status_text: String = row.get("member_status")?;
    let status = MemberStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid member status `{status_text}` in members.status"
        ))
    })?;

    Ok(Member {
        id: parse_uuid(&uuid, "members.uuid")?,
        project_id: parse_uuid(&project_uuid, "members.project_uuid")?,
        user_id: parse_uuid(&user_uuid, "members.user_uuid")?,
        status,
    })
}
