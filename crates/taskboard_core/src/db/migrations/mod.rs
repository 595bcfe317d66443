//! Ordered schema migrations for the taskboard database.
//!
//! # Invariants
//! - `STEPS` versions start at 1 and strictly increase; the runner refuses
//!   to touch the database otherwise.
//! - All pending steps run in one transaction, each followed by its
//!   `PRAGMA user_version` bump.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;
use std::time::Instant;

/// One schema step: the version it brings the database to, plus its SQL.
type Step = (u32, &'static str);

const STEPS: &[Step] = &[
    (1, include_str!("0001_init.sql")),
    (2, include_str!("0002_priorities.sql")),
];

/// Schema version this binary writes and expects.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |&(version, _)| version)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `MigrationOrder` when the step registry is not strictly increasing.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    check_order(STEPS)?;

    let from = current_user_version(conn)?;
    let to = latest_version();
    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }
    if from == to {
        return Ok(());
    }

    let started_at = Instant::now();
    info!("event=db_migrate module=db status=start from_version={from} to_version={to}");

    let tx = conn.transaction()?;
    for &(version, sql) in STEPS.iter().filter(|&&(version, _)| version > from) {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from} to_version={to} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(())
}

/// Reads `PRAGMA user_version`; 0 for a fresh database.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn check_order(steps: &[Step]) -> DbResult<()> {
    let mut previous = 0;
    for &(version, _) in steps {
        if version <= previous {
            return Err(DbError::MigrationOrder { previous, version });
        }
        previous = version;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_order, latest_version, STEPS};
    use crate::db::DbError;

    #[test]
    fn registered_steps_are_strictly_increasing() {
        check_order(STEPS).unwrap();
        assert_eq!(latest_version(), STEPS.len() as u32);
    }

    #[test]
    fn repeated_or_zero_versions_are_rejected() {
        let err = check_order(&[(1, ""), (1, "")]).unwrap_err();
        assert!(matches!(
            err,
            DbError::MigrationOrder {
                previous: 1,
                version: 1
            }
        ));
        assert!(check_order(&[(0, "")]).is_err());
        assert!(check_order(&[(2, ""), (1, "")]).is_err());
    }
}
