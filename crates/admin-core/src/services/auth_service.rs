//! Authentication service: login, token refresh, password changes.
//!
//! Token issuance and hashing live in the security crate; this service
//! only wires them to the user store.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use admin_security::jwt::JwtService;
use admin_security::password::PasswordService;
use admin_shared::constants::MIN_PASSWORD_LENGTH;

use crate::domain::{CurrentUser, Role};
use crate::error::DomainError;
use crate::repositories::{RoleRepository, UserRepository};

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    jwt: JwtService,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: CurrentUser,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        jwt_secret: String,
        access_expiry: i64,
        refresh_expiry: i64,
    ) -> Self {
        Self {
            users,
            roles,
            jwt: JwtService::new(jwt_secret, access_expiry, refresh_expiry),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, DomainError> {
        info!("Login attempt for username: {}", username);

        let user = self.users.find_by_username(username).await?.ok_or_else(|| {
            warn!("Login failed: unknown username: {}", username);
            DomainError::InvalidCredentials
        })?;

        if !user.can_login() {
            warn!("Login failed: user not active: {}", username);
            return Err(DomainError::UserNotActive);
        }

        let stored_hash = user.password_hash.as_ref().ok_or(DomainError::InvalidCredentials)?;
        let valid = PasswordService::verify(password, stored_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            warn!("Login failed: invalid password for: {}", username);
            return Err(DomainError::InvalidCredentials);
        }

        let access_token = self
            .jwt
            .generate_access_token(&user.id)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(&user.id)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        let mut updated = user.clone();
        updated.record_login();
        if let Err(e) = self.users.update(&updated).await {
            // Login still succeeds; the timestamp is best-effort.
            error!("Failed to record last login: {}", e);
        }

        let roles = self.enabled_roles(&user.id).await?;
        info!("Login successful for: {}", username);

        Ok(LoginResult {
            user: CurrentUser::from_user(&updated, roles),
            access_token,
            refresh_token,
        })
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|_| DomainError::InvalidToken)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::InvalidToken)?;

        let user = self.users.find_by_id(&user_id).await?.ok_or(DomainError::UserNotFound)?;
        if !user.can_login() {
            return Err(DomainError::UserNotActive);
        }

        Ok(TokenPair {
            access_token: self
                .jwt
                .generate_access_token(&user.id)
                .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?,
            refresh_token: self
                .jwt
                .generate_refresh_token(&user.id)
                .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?,
        })
    }

    /// Resolves a Bearer access token into the request principal.
    pub async fn current_user(&self, access_token: &str) -> Result<CurrentUser, DomainError> {
        let claims = self
            .jwt
            .validate_access_token(access_token)
            .map_err(|_| DomainError::InvalidToken)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::InvalidToken)?;

        let user = self.users.find_by_id(&user_id).await?.ok_or(DomainError::UserNotFound)?;
        if !user.can_login() {
            return Err(DomainError::UserNotActive);
        }
        let roles = self.enabled_roles(&user.id).await?;
        Ok(CurrentUser::from_user(&user, roles))
    }

    pub async fn change_password(
        &self,
        user_id: &Uuid,
        old_password: &str,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), DomainError> {
        if new_password != confirm {
            return Err(DomainError::PasswordMismatch);
        }
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::PasswordTooShort);
        }

        let user = self.users.find_by_id(user_id).await?.ok_or(DomainError::UserNotFound)?;
        let stored_hash = user.password_hash.as_ref().ok_or(DomainError::InvalidCredentials)?;
        let valid = PasswordService::verify(old_password, stored_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            return Err(DomainError::InvalidCredentials);
        }

        self.store_password(user, new_password).await
    }

    /// Administrative reset; no old password required.
    pub async fn reset_password(
        &self,
        user_id: &Uuid,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), DomainError> {
        if new_password != confirm {
            return Err(DomainError::PasswordMismatch);
        }
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::PasswordTooShort);
        }
        let user = self.users.find_by_id(user_id).await?.ok_or(DomainError::UserNotFound)?;
        self.store_password(user, new_password).await
    }

    async fn store_password(&self, mut user: crate::domain::User, new_password: &str) -> Result<(), DomainError> {
        user.password_hash = Some(
            PasswordService::hash(new_password)
                .map_err(|e| DomainError::PasswordHashError(e.to_string()))?,
        );
        user.modified_at = Some(chrono::Utc::now());
        self.users.update(&user).await?;
        Ok(())
    }

    async fn enabled_roles(&self, user_id: &Uuid) -> Result<Vec<Role>, DomainError> {
        Ok(self
            .roles
            .roles_for_user(user_id)
            .await?
            .into_iter()
            .filter(Role::is_enabled)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::repositories::role_repository::MockRoleRepository;
    use crate::repositories::user_repository::MockUserRepository;

    fn user_with_password(password: &str) -> User {
        let hash = PasswordService::hash(password).unwrap();
        User::new("admin".to_string(), Some(hash)).unwrap()
    }

    fn service(users: MockUserRepository, roles: MockRoleRepository) -> AuthService {
        AuthService::new(Arc::new(users), Arc::new(roles), "test-secret".to_string(), 900, 604800)
    }

    #[tokio::test]
    async fn test_login_success_issues_both_tokens() {
        let user = user_with_password("hunter2hunter2");
        let mut users = MockUserRepository::new();
        let found = user.clone();
        users.expect_find_by_username().returning(move |_| Ok(Some(found.clone())));
        users.expect_update().returning(|u| Ok(u.clone()));
        let mut roles = MockRoleRepository::new();
        roles.expect_roles_for_user().returning(|_| Ok(vec![]));

        let result = service(users, roles).login("admin", "hunter2hunter2").await.unwrap();
        assert_eq!(result.user.username, "admin");
        assert!(!result.access_token.is_empty());
        assert!(!result.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let user = user_with_password("hunter2hunter2");
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(move |_| Ok(Some(user.clone())));

        let result = service(users, MockRoleRepository::new()).login("admin", "wrong").await;
        assert!(matches!(result, Err(DomainError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_inactive_user() {
        let mut user = user_with_password("hunter2hunter2");
        user.is_active = false;
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(move |_| Ok(Some(user.clone())));

        let result = service(users, MockRoleRepository::new()).login("admin", "hunter2hunter2").await;
        assert!(matches!(result, Err(DomainError::UserNotActive)));
    }

    #[tokio::test]
    async fn test_disabled_roles_are_dropped_from_principal() {
        let user = user_with_password("hunter2hunter2");
        let mut users = MockUserRepository::new();
        let found = user.clone();
        users.expect_find_by_username().returning(move |_| Ok(Some(found.clone())));
        users.expect_update().returning(|u| Ok(u.clone()));

        let mut enabled = Role::new("Active".to_string(), "active".to_string(), 1).unwrap();
        enabled.status = true;
        let mut disabled = Role::new("Old".to_string(), "old".to_string(), 2).unwrap();
        disabled.status = false;
        let mut roles = MockRoleRepository::new();
        let pair = vec![enabled, disabled];
        roles.expect_roles_for_user().returning(move |_| Ok(pair.clone()));

        let result = service(users, roles).login("admin", "hunter2hunter2").await.unwrap();
        assert_eq!(result.user.role_keys(), vec!["active".to_string()]);
    }

    #[tokio::test]
    async fn test_change_password_mismatch() {
        let result = service(MockUserRepository::new(), MockRoleRepository::new())
            .change_password(&Uuid::new_v4(), "old", "newpassword", "different")
            .await;
        assert!(matches!(result, Err(DomainError::PasswordMismatch)));
    }

    #[tokio::test]
    async fn test_change_password_too_short() {
        let result = service(MockUserRepository::new(), MockRoleRepository::new())
            .change_password(&Uuid::new_v4(), "old", "short", "short")
            .await;
        assert!(matches!(result, Err(DomainError::PasswordTooShort)));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let user = user_with_password("hunter2hunter2");
        let mut users = MockUserRepository::new();
        let found = user.clone();
        users.expect_find_by_username().returning(move |_| Ok(Some(found.clone())));
        users.expect_update().returning(|u| Ok(u.clone()));
        let mut roles = MockRoleRepository::new();
        roles.expect_roles_for_user().returning(|_| Ok(vec![]));

        let svc = service(users, roles);
        let login = svc.login("admin", "hunter2hunter2").await.unwrap();
        assert!(matches!(svc.refresh(&login.access_token).await, Err(DomainError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_current_user_round_trip() {
        let user = user_with_password("hunter2hunter2");
        let mut users = MockUserRepository::new();
        let by_name = user.clone();
        users.expect_find_by_username().returning(move |_| Ok(Some(by_name.clone())));
        users.expect_update().returning(|u| Ok(u.clone()));
        let by_id = user.clone();
        users.expect_find_by_id().returning(move |_| Ok(Some(by_id.clone())));
        let mut roles = MockRoleRepository::new();
        roles.expect_roles_for_user().returning(|_| Ok(vec![]));

        let svc = service(users, roles);
        let login = svc.login("admin", "hunter2hunter2").await.unwrap();
        let principal = svc.current_user(&login.access_token).await.unwrap();
        assert_eq!(principal.id, user.id);
    }
}
