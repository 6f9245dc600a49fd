//! PostgreSQL repository implementations

pub mod menu_repo_impl;
pub mod role_repo_impl;
pub mod user_repo_impl;

pub use menu_repo_impl::PgMenuRepository;
pub use role_repo_impl::PgRoleRepository;
pub use user_repo_impl::PgUserRepository;
