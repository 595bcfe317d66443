//! Service error taxonomy.
//!
//! Every failure is terminal for the current request: the open transaction
//! rolls back on drop and the error is returned to the caller unchanged.

use crate::model::project::ProjectId;
use crate::model::sprint::SprintId;
use crate::model::task::{PriorityId, TaskId};
use crate::model::ValidationError;
use crate::repo::RepoError;
use chrono::NaiveDate;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse error class callers map to protocol-level responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Forbidden,
    NotFound,
    Conflict,
    InvalidInput,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("only the project owner may do this: project {0}")]
    NotOwner(ProjectId),
    #[error("no access to project {0}")]
    Forbidden(ProjectId),
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    #[error("sprint not found: {0}")]
    SprintNotFound(SprintId),
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("priority not found: {0}")]
    PriorityNotFound(PriorityId),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("`{username}` is not a member of project {project_id}")]
    MemberNotFound {
        project_id: ProjectId,
        username: String,
    },
    #[error("no pending invite to project {0}")]
    NoPendingInvite(ProjectId),
    #[error("not a member of project {0}")]
    NotAMember(ProjectId),
    #[error("`{username}` is already part of project {project_id}")]
    AlreadyMember {
        project_id: ProjectId,
        username: String,
    },
    #[error("the owner cannot leave project {0}")]
    OwnerCannotLeave(ProjectId),
    #[error("username already taken: {0}")]
    UsernameTaken(String),
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("task {task_id} does not belong to the project of sprint {sprint_id}")]
    TaskOutsideProject { task_id: TaskId, sprint_id: SprintId },
    #[error(transparent)]
    Validation(ValidationError),
    #[error(transparent)]
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner(_) | Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::ProjectNotFound(_)
            | Self::SprintNotFound(_)
            | Self::TaskNotFound(_)
            | Self::PriorityNotFound(_)
            | Self::UserNotFound(_)
            | Self::MemberNotFound { .. }
            | Self::NoPendingInvite(_)
            | Self::NotAMember(_) => ErrorKind::NotFound,
            Self::AlreadyMember { .. } | Self::OwnerCannotLeave(_) | Self::UsernameTaken(_) => {
                ErrorKind::Conflict
            }
            Self::InvalidDateRange { .. }
            | Self::TaskOutsideProject { .. }
            | Self::Validation(_) => ErrorKind::InvalidInput,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::InvalidDateRange { start, end } => {
                Self::InvalidDateRange { start, end }
            }
            other => Self::Validation(other),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => err.into(),
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}
