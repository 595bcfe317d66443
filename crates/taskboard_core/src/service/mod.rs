//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into request-level operations.
//! - Enforce ownership and membership rules through `access::can_act`.
//!
//! # Invariants
//! - Every operation runs inside exactly one immediate transaction, so
//!   check-then-write sequences cannot interleave with other writers.
//! - Services hold no state between calls besides the borrowed connection.

pub mod access;
pub mod error;
pub mod membership_service;
pub mod project_service;
pub mod sprint_service;
pub mod task_service;
pub mod user_service;

use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::repo::ensure_connection_ready;
use crate::repo::member_repo::SqliteMemberRepository;
use crate::repo::project_repo::SqliteProjectRepository;
use access::{can_act, ProjectAccess, ProjectRole};
use error::ServiceResult;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `work` in one immediate transaction; commits only on success.
pub(crate) fn in_transaction<T>(
    conn: &Connection,
    work: impl FnOnce(&Transaction<'_>) -> ServiceResult<T>,
) -> ServiceResult<T> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = work(&tx)?;
    tx.commit()?;
    Ok(value)
}

pub(crate) fn ready(conn: &Connection) -> ServiceResult<()> {
    ensure_connection_ready(conn)?;
    Ok(())
}

/// `can_act` over the SQLite repositories of one connection or transaction.
pub(crate) fn authorize(
    conn: &Connection,
    requester: UserId,
    project_id: ProjectId,
    required: ProjectRole,
) -> ServiceResult<ProjectAccess> {
    can_act(
        &SqliteProjectRepository::new(conn),
        &SqliteMemberRepository::new(conn),
        requester,
        project_id,
        required,
    )
}
