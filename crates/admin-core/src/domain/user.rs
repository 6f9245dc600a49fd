//! User entity and request principal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Role;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Uuid,

    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"))]
    pub username: String,

    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub avatar: Option<String>,

    /// Opaque to the core; verified by the security collaborator.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    pub is_active: bool,
    /// Bypasses all role checks.
    pub is_superuser: bool,

    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(username: String, password_hash: Option<String>) -> Result<Self, validator::ValidationErrors> {
        let user = Self {
            id: Uuid::new_v4(),
            username: username.trim().to_string(),
            name: None,
            email: None,
            mobile: None,
            avatar: None,
            password_hash,
            is_active: true,
            is_superuser: false,
            last_login: None,
            created_at: Utc::now(),
            modified_at: None,
        };
        user.validate()?;
        Ok(user)
    }

    pub fn can_login(&self) -> bool {
        self.is_active
    }

    pub fn record_login(&mut self) {
        self.last_login = Some(Utc::now());
        self.modified_at = Some(Utc::now());
    }
}

/// The authenticated principal attached to a request: just enough of the
/// user plus resolved roles for permission decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub is_superuser: bool,
    pub roles: Vec<Role>,
}

impl CurrentUser {
    pub fn from_user(user: &User, roles: Vec<Role>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_superuser: user.is_superuser,
            roles,
        }
    }

    pub fn role_keys(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.key.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user() {
        let user = User::new("admin".to_string(), Some("hash".to_string()));
        assert!(user.is_ok());
        assert!(user.unwrap().can_login());
    }

    #[test]
    fn test_record_login() {
        let mut user = User::new("ops".to_string(), None).unwrap();
        assert!(user.last_login.is_none());
        user.record_login();
        assert!(user.last_login.is_some());
    }
}
