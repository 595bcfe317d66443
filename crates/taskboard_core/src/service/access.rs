//! Project authorization predicate.
//!
//! # Responsibility
//! - Resolve the requester's role on one project.
//! - Translate roles into capability sets for service checks.
//!
//! # Invariants
//! - The owner is identified by `projects.owner_uuid`, never by a member row.
//! - Pending invitees hold no role until they accept.

use crate::model::project::{Project, ProjectId};
use crate::model::user::UserId;
use crate::repo::member_repo::MemberRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::service::error::{ServiceError, ServiceResult};
use std::collections::BTreeSet;

/// Role a requester holds on a project. Ordered by authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProjectRole {
    /// Accepted member.
    Member,
    /// Project creator.
    Owner,
}

/// Action class granted by a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    ReadProject,
    EditTasks,
    ManageMembers,
    ManageSprints,
    ManageProject,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadProject => "read_project",
            Self::EditTasks => "edit_tasks",
            Self::ManageMembers => "manage_members",
            Self::ManageSprints => "manage_sprints",
            Self::ManageProject => "manage_project",
        }
    }
}

impl ProjectRole {
    pub fn capabilities(self) -> BTreeSet<Capability> {
        let mut caps = BTreeSet::from([Capability::ReadProject, Capability::EditTasks]);
        if self == Self::Owner {
            caps.extend([
                Capability::ManageMembers,
                Capability::ManageSprints,
                Capability::ManageProject,
            ]);
        }
        caps
    }
}

/// Successful authorization result: the loaded project and the granted role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectAccess {
    pub project: Project,
    pub role: ProjectRole,
}

impl ProjectAccess {
    pub fn capabilities(&self) -> BTreeSet<Capability> {
        self.role.capabilities()
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn is_owner(&self) -> bool {
        self.role == ProjectRole::Owner
    }
}

/// Returns the requester's role on `project`, or `None` without access.
pub fn resolve_role(
    members: &impl MemberRepository,
    project: &Project,
    requester: UserId,
) -> ServiceResult<Option<ProjectRole>> {
    if project.is_owned_by(requester) {
        return Ok(Some(ProjectRole::Owner));
    }
    let member = members.get_member(project.id, requester)?;
    Ok(member
        .filter(|member| member.is_accepted())
        .map(|_| ProjectRole::Member))
}

/// Checks that `requester` holds at least `required` on `project_id`.
///
/// # Errors
/// - `ProjectNotFound` when the project does not exist.
/// - `NotOwner` when `required` is `Owner` and the requester is not.
/// - `Forbidden` when the requester holds no role at all.
pub fn can_act(
    projects: &impl ProjectRepository,
    members: &impl MemberRepository,
    requester: UserId,
    project_id: ProjectId,
    required: ProjectRole,
) -> ServiceResult<ProjectAccess> {
    let project = projects
        .get_project(project_id)?
        .ok_or(ServiceError::ProjectNotFound(project_id))?;

    match resolve_role(members, &project, requester)? {
        Some(role) if role >= required => Ok(ProjectAccess { project, role }),
        _ if required == ProjectRole::Owner => Err(ServiceError::NotOwner(project_id)),
        _ => Err(ServiceError::Forbidden(project_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::{Capability, ProjectRole};

    #[test]
    fn member_can_edit_tasks_but_not_manage() {
        let caps = ProjectRole::Member.capabilities();
        assert!(caps.contains(&Capability::ReadProject));
        assert!(caps.contains(&Capability::EditTasks));
        assert!(!caps.contains(&Capability::ManageMembers));
        assert!(!caps.contains(&Capability::ManageSprints));
    }

    #[test]
    fn owner_capabilities_are_a_superset() {
        let member = ProjectRole::Member.capabilities();
        let owner = ProjectRole::Owner.capabilities();
        assert!(owner.is_superset(&member));
        assert!(owner.contains(&Capability::ManageProject));
    }

    #[test]
    fn roles_are_ordered_by_authority() {
        assert!(ProjectRole::Owner > ProjectRole::Member);
    }
}
