//! Core domain logic for the taskboard project-management backend.
//! This crate is the single source of truth for membership and sprint
//! invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::member::{Member, MemberId, MemberStatus, MemberWithUser, MembershipWithProject};
pub use model::project::{Project, ProjectDraft, ProjectId, ProjectPatch};
pub use model::sprint::{Sprint, SprintDraft, SprintId, SprintPatch, SprintStatus};
pub use model::task::{
    Priority, PriorityId, Task, TaskDraft, TaskId, TaskPatch, TaskWithPriority,
};
pub use model::user::{User, UserId};
pub use model::ValidationError;
pub use projection::member::{MemberRead, ProjectMemberRead};
pub use projection::project::ProjectRead;
pub use projection::sprint::{burndown_series, ChartPoint, SprintRead, SprintReadChart};
pub use projection::task::{PriorityRead, TaskRead};
pub use repo::{RepoError, RepoResult};
pub use service::access::{can_act, Capability, ProjectAccess, ProjectRole};
pub use service::error::{ErrorKind, ServiceError, ServiceResult};
pub use service::membership_service::{InviteDecision, MembershipService};
pub use service::project_service::ProjectService;
pub use service::sprint_service::SprintService;
pub use service::task_service::TaskService;
pub use service::user_service::UserService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
