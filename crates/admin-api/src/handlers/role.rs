//! Role HTTP handlers: CRUD plus role-menu grants

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use admin_core::domain::{CurrentUser, Menu, Role};
use admin_core::error::DomainError;
use admin_core::services::has_unrestricted_access;

use crate::response::{domain_error, ApiResponse, ErrorReply};
use crate::state::AppState;

/// GET /api/v1/roles
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Role>>>, ErrorReply> {
    let roles = state.roles.find_all().await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(roles)))
}

/// GET /api/v1/roles/menus
///
/// Menus the caller may grant to a role: an administrator sees the
/// whole forest, everyone else only what their own roles carry.
pub async fn assignable_menus(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Menu>>>, ErrorReply> {
    let menus = state
        .permission_service
        .role_menus(&user)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(menus)))
}

/// GET /api/v1/roles/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Role>>, ErrorReply> {
    let role = state
        .roles
        .find_by_id(&id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| domain_error(DomainError::RoleNotFound))?;
    Ok(Json(ApiResponse::success(role)))
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub sort: i32,
    #[serde(default)]
    pub admin: bool,
    pub remark: Option<String>,
}

/// POST /api/v1/roles
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<Json<ApiResponse<Role>>, ErrorReply> {
    let mut role = Role::new(payload.name, payload.key, payload.sort)
        .map_err(|e| domain_error(DomainError::ValidationError(e.to_string())))?;
    // Only an unrestricted caller may mint another unrestricted role.
    role.admin = payload.admin && has_unrestricted_access(&user);
    role.remark = payload.remark;

    let created = state.roles.create(&role).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(created)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub key: Option<String>,
    pub sort: Option<i32>,
    pub status: Option<bool>,
    pub admin: Option<bool>,
    pub remark: Option<String>,
}

/// PUT /api/v1/roles/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<Role>>, ErrorReply> {
    let mut role = state
        .roles
        .find_by_id(&id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| domain_error(DomainError::RoleNotFound))?;

    if let Some(name) = payload.name {
        role.name = name.trim().to_string();
    }
    if let Some(key) = payload.key {
        role.key = key.trim().to_string();
    }
    if let Some(sort) = payload.sort {
        role.sort = sort;
    }
    if let Some(status) = payload.status {
        role.status = status;
    }
    if let Some(admin) = payload.admin {
        if has_unrestricted_access(&user) {
            role.admin = admin;
        }
    }
    if payload.remark.is_some() {
        role.remark = payload.remark;
    }
    role.modified_at = Some(chrono::Utc::now());

    let updated = state.roles.update(&role).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/v1/roles/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ErrorReply> {
    state.roles.delete(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}

/// GET /api/v1/roles/{id}/menus
pub async fn granted_menus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Menu>>>, ErrorReply> {
    let menus = state
        .roles
        .menus_for_role(&id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(menus)))
}

#[derive(Debug, Deserialize)]
pub struct SetMenusRequest {
    pub menu_ids: Vec<Uuid>,
}

/// PUT /api/v1/roles/{id}/menus
pub async fn set_menus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetMenusRequest>,
) -> Result<Json<ApiResponse<()>>, ErrorReply> {
    state
        .roles
        .find_by_id(&id)
        .await
        .map_err(domain_error)?
        .ok_or_else(|| domain_error(DomainError::RoleNotFound))?;
    state
        .roles
        .set_menus(&id, &payload.menu_ids)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}
