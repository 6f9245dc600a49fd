//! Domain entities for the admin backend.

pub mod menu;
pub mod role;
pub mod user;

pub use menu::{Menu, MenuType};
pub use role::Role;
pub use user::{CurrentUser, User};
