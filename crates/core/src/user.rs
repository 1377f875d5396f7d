use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CrmError;

/// Minimum accepted password length at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A user row together with its password hash. Never serialized to clients.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

/// The authenticated principal on whose behalf an operation runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self { id: user.id.clone(), email: user.email.clone() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Validate for signup: well-formed e-mail and a password of minimum length.
    pub fn validate_signup(&self) -> Result<String, CrmError> {
        let email = normalize_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CrmError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(email)
    }
}

/// Trim and lower-case an e-mail address, rejecting malformed ones.
pub fn normalize_email(raw: &str) -> Result<String, CrmError> {
    let email = raw.trim().to_lowercase();
    let valid = EMAIL_RE.as_ref().is_some_and(|re| re.is_match(&email));
    if valid {
        Ok(email)
    } else {
        Err(CrmError::invalid_value("email", raw))
    }
}
