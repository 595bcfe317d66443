//! User identity record.
//!
//! Users are owned by the identity provider; the core only stores enough to
//! resolve usernames and render member lists.

use super::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").expect("valid username regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
}

impl User {
    /// Creates a user with a generated id. The username is trimmed.
    pub fn new(username: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into().trim().to_string(),
            email: email
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)
    }
}

/// Checks the username against the accepted character set and length.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername(username.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_username, User};

    #[test]
    fn username_pattern() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob.smith-2").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn blank_email_is_dropped() {
        let user = User::new("  carol ", Some("  ".to_string()));
        assert_eq!(user.username, "carol");
        assert_eq!(user.email, None);
    }
}
