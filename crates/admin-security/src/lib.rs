//! # Admin Security
//!
//! Security utilities: JWT issuance/validation and password hashing.

pub mod jwt;
pub mod password;

pub use jwt::JwtService;
pub use password::PasswordService;
