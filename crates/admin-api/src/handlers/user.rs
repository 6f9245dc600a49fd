//! User HTTP handlers: profile, CRUD, password management

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use admin_core::domain::{CurrentUser, User};
use admin_core::error::DomainError;
use admin_security::password::PasswordService;

use crate::response::{domain_error, ApiResponse, ErrorReply};
use crate::state::AppState;

/// Profile payload for GET /api/v1/users/me, shaped for the admin UI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    pub username: String,
    pub avatar: Option<String>,
    pub roles: Vec<String>,
    pub perms: Vec<String>,
}

/// GET /api/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ErrorReply> {
    let stored = state
        .users
        .find_by_id(&user.id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| domain_error(DomainError::UserNotFound))?;
    let perms = state
        .permission_service
        .user_perms(&user)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(ProfileResponse {
        user_id: user.id.to_string(),
        username: user.username.clone(),
        avatar: stored.avatar,
        roles: user.role_keys(),
        perms,
    })))
}

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<User>>>, ErrorReply> {
    let users = state.users.find_all().await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(users)))
}

/// GET /api/v1/users/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, ErrorReply> {
    let user = state
        .users
        .find_by_id(&id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| domain_error(DomainError::UserNotFound))?;
    Ok(Json(ApiResponse::success(user)))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ErrorReply> {
    let hash = PasswordService::hash(&payload.password)
        .map_err(|e| domain_error(DomainError::PasswordHashError(e.to_string())))?;
    let mut user = User::new(payload.username, Some(hash))
        .map_err(|e| domain_error(DomainError::ValidationError(e.to_string())))?;
    user.name = payload.name;
    user.email = payload.email;
    user.mobile = payload.mobile;

    let created = state.users.create(&user).await.map_err(domain_error)?;
    if !payload.role_ids.is_empty() {
        state
            .users
            .set_roles(&created.id, &payload.role_ids)
            .await
            .map_err(domain_error)?;
    }
    Ok(Json(ApiResponse::success(created)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub avatar: Option<String>,
    pub is_active: Option<bool>,
    pub role_ids: Option<Vec<Uuid>>,
}

/// PUT /api/v1/users/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ErrorReply> {
    let mut user = state
        .users
        .find_by_id(&id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| domain_error(DomainError::UserNotFound))?;

    if payload.name.is_some() {
        user.name = payload.name;
    }
    if payload.email.is_some() {
        user.email = payload.email;
    }
    if payload.mobile.is_some() {
        user.mobile = payload.mobile;
    }
    if payload.avatar.is_some() {
        user.avatar = payload.avatar;
    }
    if let Some(is_active) = payload.is_active {
        user.is_active = is_active;
    }
    user.modified_at = Some(chrono::Utc::now());

    let updated = state.users.update(&user).await.map_err(domain_error)?;
    if let Some(role_ids) = payload.role_ids {
        state
            .users
            .set_roles(&id, &role_ids)
            .await
            .map_err(domain_error)?;
    }
    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/v1/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ErrorReply> {
    state.users.delete(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// PUT /api/v1/users/me/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ErrorReply> {
    state
        .auth
        .change_password(
            &user.id,
            &payload.old_password,
            &payload.new_password,
            &payload.confirm_password,
        )
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
}

/// PUT /api/v1/users/{id}/password/reset
pub async fn reset_password(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ErrorReply> {
    state
        .auth
        .reset_password(&id, &payload.new_password, &payload.confirm_password)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}
