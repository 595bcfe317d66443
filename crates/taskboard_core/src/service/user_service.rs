//! User registration and lookup.
//!
//! Identity verification happens outside the core; this service only keeps
//! the username → id mapping that membership invitations rely on.

use crate::model::user::User;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoError;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{in_transaction, ready};
use log::info;
use rusqlite::Connection;

pub struct UserService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> UserService<'conn> {
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        ready(conn)?;
        Ok(Self { conn })
    }

    /// Registers a user; usernames are unique case-insensitively.
    pub fn register_user(
        &self,
        username: impl Into<String>,
        email: Option<String>,
    ) -> ServiceResult<User> {
        let user = User::new(username, email);
        user.validate()?;

        in_transaction(self.conn, |tx| {
            SqliteUserRepository::new(tx)
                .create_user(&user)
                .map_err(|err| match err {
                    RepoError::Duplicate { .. } => ServiceError::UsernameTaken(user.username.clone()),
                    other => other.into(),
                })
        })?;

        info!(
            "event=user_register module=user status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Resolves a username; `UserNotFound` when absent.
    pub fn find_user(&self, username: &str) -> ServiceResult<User> {
        in_transaction(self.conn, |tx| {
            SqliteUserRepository::new(tx)
                .find_by_username(username)?
                .ok_or_else(|| ServiceError::UserNotFound(username.trim().to_string()))
        })
    }
}
