//! # Admin Infrastructure
//!
//! PostgreSQL adapters for the repository ports.

pub mod database;

pub use database::{create_pool, PgMenuRepository, PgRoleRepository, PgUserRepository};
