use std::sync::Arc;

use admin_core::repositories::{RoleRepository, UserRepository};
use admin_core::services::{AuthService, MenuService, PermissionService};
use admin_shared::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub auth: Arc<AuthService>,
    pub menu_service: Arc<MenuService>,
    pub permission_service: Arc<PermissionService>,
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
}
