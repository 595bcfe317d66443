//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Username lookups are case-insensitive (`COLLATE NOCASE` column).

use super::{map_unique_violation, parse_uuid, RepoResult};
use crate::model::user::{User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT uuid, username, email FROM users";

/// Repository interface for user lookups and registration.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        self.conn
            .execute(
                "INSERT INTO users (uuid, username, email) VALUES (?1, ?2, ?3);",
                params![user.id.to_string(), user.username, user.email],
            )
            .map_err(|err| map_unique_violation(err, "user", || user.username.clone()))?;

        Ok(user.id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                read_user_columns,
            )
            .optional()?;
        user.map(parse_user).transpose()
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE username = ?1;"),
                [username.trim()],
                read_user_columns,
            )
            .optional()?;
        user.map(parse_user).transpose()
    }
}

type UserColumns = (String, String, Option<String>);

fn read_user_columns(row: &Row<'_>) -> rusqlite::Result<UserColumns> {
    Ok((row.get("uuid")?, row.get("username")?, row.get("email")?))
}

fn parse_user((uuid, username, email): UserColumns) -> RepoResult<User> {
    Ok(User {
        id: parse_uuid(&uuid, "users.uuid")?,
        username,
        email,
    })
}

/// Parses a user from a row that aliases user columns as `user_uuid`,
/// `user_username` and `user_email`.
pub(crate) fn parse_joined_user(row: &Row<'_>) -> RepoResult<User> {
    let uuid: String = row.get("user_uuid")?;
    Ok(User {
        id: parse_uuid(&uuid, "users.uuid")?,
        username: row.get("user_username")?,
        email: row.get("user_email")?,
    })
}
