//! Member list and "my projects" views.

use crate::model::member::{Member, MemberId, MemberStatus};
use crate::model::project::{Project, ProjectId};
use crate::model::user::{User, UserId};
use serde::Serialize;

/// Member row flattened with the invited user's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRead {
    pub id: MemberId,
    pub user_id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub status: MemberStatus,
}

impl MemberRead {
    pub fn from_member(member: &Member, user: &User) -> Self {
        Self {
            id: member.id,
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            status: member.status,
        }
    }
}

/// Member row flattened with project display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectMemberRead {
    pub member_id: MemberId,
    pub project_id: ProjectId,
    pub project_name: String,
    pub project_description: Option<String>,
    pub owner_id: UserId,
    pub status: MemberStatus,
}

impl ProjectMemberRead {
    pub fn from_membership(member: &Member, project: &Project) -> Self {
        Self {
            member_id: member.id,
            project_id: project.id,
            project_name: project.name.clone(),
            project_description: project.description.clone(),
            owner_id: project.owner_id,
            status: member.status,
        }
    }
}
