//! Role repository trait (port)
//!
//! Covers the role table and the role->menu association.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Menu, Role};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Role>, DomainError>;
    async fn find_by_key(&self, key: &str) -> Result<Option<Role>, DomainError>;
    async fn find_all(&self) -> Result<Vec<Role>, DomainError>;
    async fn create(&self, role: &Role) -> Result<Role, DomainError>;
    async fn update(&self, role: &Role) -> Result<Role, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;

    /// Menus associated with a role. Dangling associations resolve to
    /// nothing rather than erroring.
    async fn menus_for_role(&self, role_id: &Uuid) -> Result<Vec<Menu>, DomainError>;
    async fn set_menus(&self, role_id: &Uuid, menu_ids: &[Uuid]) -> Result<(), DomainError>;
    async fn roles_for_user(&self, user_id: &Uuid) -> Result<Vec<Role>, DomainError>;
}
