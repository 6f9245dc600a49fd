//! Authentication HTTP handlers (login, refresh, logout)

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use admin_core::domain::CurrentUser;

use crate::response::{domain_error, ApiResponse, ErrorReply};
use crate::state::AppState;

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Authentication response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserDto,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// User DTO for auth responses
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub is_superuser: bool,
    pub roles: Vec<String>,
}

impl UserDto {
    fn from_principal(user: &CurrentUser) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            is_superuser: user.is_superuser,
            roles: user.role_keys(),
        }
    }
}

/// Login handler - POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ErrorReply> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "VALIDATION_ERROR",
                "Username and password are required",
            )),
        ));
    }

    let result = state
        .auth
        .login(&payload.username, &payload.password)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(AuthResponse {
        user: UserDto::from_principal(&result.user),
        access_token: result.access_token,
        refresh_token: result.refresh_token,
    })))
}

/// Refresh token handler - POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ErrorReply> {
    let pair = state
        .auth
        .refresh(&payload.refresh_token)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    })))
}

/// Logout handler - POST /api/v1/auth/logout
///
/// Tokens are stateless; logout is a client-side discard. The endpoint
/// exists so callers have a uniform success response to hook into.
pub async fn logout() -> Json<ApiResponse<()>> {
    Json(ApiResponse::success(()))
}
