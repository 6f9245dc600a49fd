//! # Admin Core
//!
//! Domain entities, the menu filter/tree engine, permission resolution,
//! and repository traits for the admin backend.

pub mod domain;
pub mod error;
pub mod filter;
pub mod repositories;
pub mod services;

pub use domain::*;
pub use error::DomainError;
