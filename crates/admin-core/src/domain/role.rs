//! Role entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A role groups menu grants. `key` is the globally unique permission
/// identifier; `admin` grants the same unrestricted menu view as a
/// superuser for role-scoped queries.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Role {
    pub id: Uuid,

    #[validate(length(min = 1, max = 64, message = "Role name must be between 1 and 64 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 64, message = "Role key must be between 1 and 64 characters"))]
    pub key: String,

    pub sort: i32,
    /// Enabled/disabled flag.
    pub status: bool,
    pub admin: bool,
    pub remark: Option<String>,

    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Role {
    pub fn new(name: String, key: String, sort: i32) -> Result<Self, validator::ValidationErrors> {
        let role = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            key: key.trim().to_string(),
            sort,
            status: true,
            admin: false,
            remark: None,
            created_at: Utc::now(),
            modified_at: None,
        };
        role.validate()?;
        Ok(role)
    }

    pub fn is_enabled(&self) -> bool {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_role() {
        let role = Role::new("Operator".to_string(), "operator".to_string(), 1);
        assert!(role.is_ok());
        let role = role.unwrap();
        assert!(role.is_enabled());
        assert!(!role.admin);
    }
}
