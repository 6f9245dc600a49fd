//! Domain services (business logic)

pub mod auth_service;
pub mod menu_service;
pub mod permission_service;

pub use auth_service::{AuthService, LoginResult, TokenPair};
pub use menu_service::MenuService;
pub use permission_service::{has_unrestricted_access, PermissionService, RouteMeta, RouteNode};
