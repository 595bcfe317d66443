//! Project membership join entity.
//!
//! # Invariants
//! - At most one `Member` row exists per (project, user) pair.
//! - A row starts `Pending`; the invited user moves it to `Accepted` or
//!   deletes it. There is no transition back to `Pending`.
//! - The project owner never has a `Member` row for their own project.

use super::project::{Project, ProjectId};
use super::user::{User, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MemberId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Invited, waiting for the user's decision.
    Pending,
    /// Invitation accepted; the user participates in the project.
    Accepted,
}

impl MemberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub status: MemberStatus,
}

impl Member {
    /// Creates a pending invitation row.
    pub fn invite(project_id: ProjectId, user_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            user_id,
            status: MemberStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MemberStatus::Pending
    }

    pub fn is_accepted(&self) -> bool {
        self.status == MemberStatus::Accepted
    }
}

/// Member row joined with the invited user, used by member listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberWithUser {
    pub member: Member,
    pub user: User,
}

/// Member row joined with its project, used by "my projects" listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipWithProject {
    pub member: Member,
    pub project: Project,
}

#[cfg(test)]
mod tests {
    use super::{Member, MemberStatus};
    use uuid::Uuid;

    #[test]
    fn invite_starts_pending() {
        let member = Member::invite(Uuid::new_v4(), Uuid::new_v4());
        assert!(member.is_pending());
        assert!(!member.is_accepted());
    }

    #[test]
    fn status_strings_are_stable() {
        for status in [MemberStatus::Pending, MemberStatus::Accepted] {
            assert_eq!(MemberStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MemberStatus::parse("invited"), None);
    }
}
