pub mod auth;
pub mod health;
pub mod menu;
pub mod role;
pub mod user;
