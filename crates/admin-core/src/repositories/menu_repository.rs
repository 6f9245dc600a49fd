//! Menu repository trait (port)
//!
//! The tree store: lookup by id, by id set, and by parent. All listing
//! methods return nodes ordered by `sort` ascending, insertion order on ties.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Menu;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Menu>, DomainError>;
    async fn find_all(&self) -> Result<Vec<Menu>, DomainError>;
    /// Missing ids are skipped, not errors.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Menu>, DomainError>;
    /// `None` lists root nodes.
    async fn children_of(&self, parent_id: Option<Uuid>) -> Result<Vec<Menu>, DomainError>;
    async fn create(&self, menu: &Menu) -> Result<Menu, DomainError>;
    async fn update(&self, menu: &Menu) -> Result<Menu, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
