//! Domain errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unknown filter field: {0}")]
    UnknownFilterField(String),

    #[error("Invalid filter value for field {field}: {value}")]
    InvalidFilterValue { field: String, value: String },

    #[error("User not found")]
    UserNotFound,

    #[error("User not active")]
    UserNotActive,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Role not found")]
    RoleNotFound,

    #[error("Role key already exists: {0}")]
    RoleKeyAlreadyExists(String),

    #[error("Menu not found")]
    MenuNotFound,

    #[error("Password too short")]
    PasswordTooShort,

    #[error("Password mismatch")]
    PasswordMismatch,

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
