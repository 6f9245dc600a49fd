//! API Response wrapper

use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use admin_core::error::DomainError;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

pub type ErrorReply = (StatusCode, Json<ApiResponse<()>>);

/// Maps domain errors onto the response envelope. Client mistakes are
/// 4xx; only store failures surface as 500.
pub fn domain_error(err: DomainError) -> ErrorReply {
    let (status, code) = match &err {
        DomainError::UnknownFilterField(_) | DomainError::InvalidFilterValue { .. } => {
            (StatusCode::BAD_REQUEST, "INVALID_FILTER")
        }
        DomainError::ValidationError(_)
        | DomainError::PasswordMismatch
        | DomainError::PasswordTooShort => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        DomainError::InvalidCredentials | DomainError::InvalidToken => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
        }
        DomainError::UserNotActive => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        DomainError::UserNotFound | DomainError::RoleNotFound | DomainError::MenuNotFound => {
            (StatusCode::NOT_FOUND, "NOT_FOUND")
        }
        DomainError::UsernameAlreadyExists(_) | DomainError::RoleKeyAlreadyExists(_) => {
            (StatusCode::CONFLICT, "CONFLICT")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (status, Json(ApiResponse::error(code, &err.to_string())))
}
