//! Membership lifecycle service.
//!
//! # Responsibility
//! - Invite, remove and list project members (owner side).
//! - Accept/decline invitations and leave projects (member side).
//!
//! # Invariants
//! - At most one member row per (project, user); duplicates are `AlreadyMember`.
//! - Decisions only apply to the requester's own pending row.
//! - The owner never holds a member row and can never leave.

use crate::model::member::{Member, MemberStatus, MemberWithUser, MembershipWithProject};
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::repo::member_repo::{MemberRepository, SqliteMemberRepository};
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoError;
use crate::service::access::{can_act, ProjectRole};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{in_transaction, ready};
use log::{debug, info};
use rusqlite::Connection;

/// The UNIQUE (project, user) constraint catches invites that raced past the
/// existence check; both paths report `AlreadyMember`.
fn member_conflict(err: RepoError, project_id: ProjectId, username: &str) -> ServiceError {
    match err {
        RepoError::Duplicate { .. } => ServiceError::AlreadyMember {
            project_id,
            username: username.to_string(),
        },
        other => other.into(),
    }
}

/// Outcome of an invitation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteDecision {
    Accepted,
    Declined,
}

impl InviteDecision {
    pub fn from_bool(accept: bool) -> Self {
        if accept {
            Self::Accepted
        } else {
            Self::Declined
        }
    }
}

/// Membership use-case service over one SQLite connection.
pub struct MembershipService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> MembershipService<'conn> {
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        ready(conn)?;
        Ok(Self { conn })
    }

    /// Invites `member_username` to the project as a pending member.
    ///
    /// # Errors
    /// - `NotOwner` unless the requester owns the project.
    /// - `UserNotFound` when the username does not resolve.
    /// - `AlreadyMember` when a row exists or the user is the owner.
    pub fn add_member(
        &self,
        project_id: ProjectId,
        member_username: &str,
        requester: UserId,
    ) -> ServiceResult<MemberWithUser> {
        let added = in_transaction(self.conn, |tx| {
            let projects = SqliteProjectRepository::new(tx);
            let members = SqliteMemberRepository::new(tx);
            let users = SqliteUserRepository::new(tx);

            let access = can_act(&projects, &members, requester, project_id, ProjectRole::Owner)?;
            let user = users
                .find_by_username(member_username)?
                .ok_or_else(|| ServiceError::UserNotFound(member_username.trim().to_string()))?;

            if access.project.is_owned_by(user.id) || members.get_member(project_id, user.id)?.is_some()
            {
                return Err(ServiceError::AlreadyMember {
                    project_id,
                    username: user.username,
                });
            }

            let member = Member::invite(project_id, user.id);
            members
                .create_member(&member)
                .map_err(|err| member_conflict(err, project_id, &user.username))?;
            Ok(MemberWithUser { member, user })
        })?;

        info!(
            "event=member_add module=membership status=ok project_id={} member_id={}",
            project_id, added.member.id
        );
        Ok(added)
    }

    /// Deletes the member row of `member_username`, pending or accepted.
    ///
    /// # Errors
    /// - `NotOwner` unless the requester owns the project.
    /// - `UserNotFound` when the username does not resolve.
    /// - `MemberNotFound` when the user has no row on this project.
    pub fn remove_member(
        &self,
        project_id: ProjectId,
        member_username: &str,
        requester: UserId,
    ) -> ServiceResult<()> {
        let removed = in_transaction(self.conn, |tx| {
            let projects = SqliteProjectRepository::new(tx);
            let members = SqliteMemberRepository::new(tx);
            let users = SqliteUserRepository::new(tx);

            can_act(&projects, &members, requester, project_id, ProjectRole::Owner)?;
            let username = member_username.trim().to_string();
            let user = users
                .find_by_username(&username)?
                .ok_or_else(|| ServiceError::UserNotFound(username.clone()))?;
            let member = members
                .get_member(project_id, user.id)?
                .ok_or(ServiceError::MemberNotFound {
                    project_id,
                    username,
                })?;
            members.delete_member(member.id)?;
            Ok(member)
        })?;

        info!(
            "event=member_remove module=membership status=ok project_id={} member_id={}",
            project_id, removed.id
        );
        Ok(())
    }

    /// Lists all member rows of a project, pending and accepted.
    ///
    /// Visible to the owner and to accepted members.
    pub fn list_members(
        &self,
        project_id: ProjectId,
        requester: UserId,
    ) -> ServiceResult<Vec<MemberWithUser>> {
        let items = in_transaction(self.conn, |tx| {
            let projects = SqliteProjectRepository::new(tx);
            let members = SqliteMemberRepository::new(tx);

            can_act(&projects, &members, requester, project_id, ProjectRole::Member)?;
            Ok(members.list_project_members(project_id)?)
        })?;

        debug!(
            "event=member_list module=membership status=ok project_id={} count={}",
            project_id,
            items.len()
        );
        Ok(items)
    }

    /// Accepts (`true`) or declines (`false`) the requester's pending invite.
    ///
    /// Declining deletes the row so the owner may invite again later.
    pub fn decide_invite(
        &self,
        project_id: ProjectId,
        accept: bool,
        requester: UserId,
    ) -> ServiceResult<InviteDecision> {
        let decision = InviteDecision::from_bool(accept);
        let member = in_transaction(self.conn, |tx| {
            let members = SqliteMemberRepository::new(tx);

            let member = members
                .get_member(project_id, requester)?
                .filter(Member::is_pending)
                .ok_or(ServiceError::NoPendingInvite(project_id))?;
            match decision {
                InviteDecision::Accepted => {
                    members.update_member_status(member.id, MemberStatus::Accepted)?
                }
                InviteDecision::Declined => members.delete_member(member.id)?,
            }
            Ok(member)
        })?;

        info!(
            "event=member_decision module=membership status=ok project_id={} member_id={} decision={:?}",
            project_id, member.id, decision
        );
        Ok(decision)
    }

    /// Removes the requester's own accepted membership.
    ///
    /// # Errors
    /// - `ProjectNotFound` when the project does not exist.
    /// - `OwnerCannotLeave` for the owner, whatever rows exist.
    /// - `NotAMember` when the requester has no accepted row.
    pub fn leave_project(&self, project_id: ProjectId, requester: UserId) -> ServiceResult<()> {
        let member = in_transaction(self.conn, |tx| {
            let projects = SqliteProjectRepository::new(tx);
            let members = SqliteMemberRepository::new(tx);

            let project = projects
                .get_project(project_id)?
                .ok_or(ServiceError::ProjectNotFound(project_id))?;
            if project.is_owned_by(requester) {
                return Err(ServiceError::OwnerCannotLeave(project_id));
            }
            let member = members
                .get_member(project_id, requester)?
                .filter(Member::is_accepted)
                .ok_or(ServiceError::NotAMember(project_id))?;
            members.delete_member(member.id)?;
            Ok(member)
        })?;

        info!(
            "event=member_leave module=membership status=ok project_id={} member_id={}",
            project_id, member.id
        );
        Ok(())
    }

    /// Projects the requester has joined, excluding projects they own.
    pub fn list_my_projects(&self, requester: UserId) -> ServiceResult<Vec<MembershipWithProject>> {
        in_transaction(self.conn, |tx| {
            let members = SqliteMemberRepository::new(tx);
            Ok(members.list_memberships(requester, MemberStatus::Accepted)?)
        })
    }

    /// Projects with an invitation still awaiting the requester's decision.
    pub fn list_pending_invites(
        &self,
        requester: UserId,
    ) -> ServiceResult<Vec<MembershipWithProject>> {
        in_transaction(self.conn, |tx| {
            let members = SqliteMemberRepository::new(tx);
            Ok(members.list_memberships(requester, MemberStatus::Pending)?)
        })
    }
}
