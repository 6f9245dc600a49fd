//! Menu HTTP handlers: lazy listing, route tree, CRUD

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use admin_core::domain::{CurrentUser, Menu, MenuType};
use admin_core::error::DomainError;
use admin_core::filter::FilterParams;
use admin_core::services::RouteNode;

use crate::response::{domain_error, ApiResponse, ErrorReply};
use crate::state::AppState;

/// GET /api/v1/menus
///
/// Every query parameter is a filter entry; repeated keys accumulate
/// into value lists (two values form a range). A `parent` parameter
/// switches the response from top-of-match to expand-under-parent.
pub async fn list(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<Vec<Menu>>>, ErrorReply> {
    let params = FilterParams::from_pairs(pairs);
    let menus = state
        .menu_service
        .lazy_list(&params)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(menus)))
}

/// GET /api/v1/menus/routes
pub async fn routes(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<RouteNode>>>, ErrorReply> {
    let tree = state
        .permission_service
        .routes(&user)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(tree)))
}

/// GET /api/v1/menus/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Menu>>, ErrorReply> {
    let menu = state.menu_service.get(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(menu)))
}

#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub menu_type: MenuType,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub redirect: Option<String>,
    pub perm: Option<String>,
    #[serde(default)]
    pub sort: i32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub keep_alive: bool,
    #[serde(default)]
    pub always_show: bool,
}

fn default_true() -> bool {
    true
}

/// POST /api/v1/menus
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateMenuRequest>,
) -> Result<Json<ApiResponse<Menu>>, ErrorReply> {
    let mut menu = Menu::new(
        payload.parent_id,
        payload.name,
        payload.menu_type,
        payload.path,
        payload.component,
        payload.perm,
        payload.sort,
    )
    .map_err(|e| domain_error(DomainError::ValidationError(e.to_string())))?;
    menu.icon = payload.icon;
    menu.redirect = payload.redirect;
    menu.visible = payload.visible;
    menu.keep_alive = payload.keep_alive;
    menu.always_show = payload.always_show;

    let created = state
        .menu_service
        .create(&menu)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(created)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateMenuRequest {
    pub parent_id: Option<Uuid>,
    pub name: Option<String>,
    pub menu_type: Option<MenuType>,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub redirect: Option<String>,
    pub perm: Option<String>,
    pub sort: Option<i32>,
    pub visible: Option<bool>,
    pub keep_alive: Option<bool>,
    pub always_show: Option<bool>,
}

/// PUT /api/v1/menus/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMenuRequest>,
) -> Result<Json<ApiResponse<Menu>>, ErrorReply> {
    let mut menu = state.menu_service.get(&id).await.map_err(domain_error)?;

    if payload.parent_id.is_some() {
        menu.parent_id = payload.parent_id;
    }
    if let Some(name) = payload.name {
        menu.name = name.trim().to_string();
    }
    if let Some(menu_type) = payload.menu_type {
        menu.menu_type = menu_type;
    }
    if payload.path.is_some() {
        menu.path = payload.path;
    }
    if payload.component.is_some() {
        menu.component = payload.component;
    }
    if payload.icon.is_some() {
        menu.icon = payload.icon;
    }
    if payload.redirect.is_some() {
        menu.redirect = payload.redirect;
    }
    if payload.perm.is_some() {
        menu.perm = payload.perm;
    }
    if let Some(sort) = payload.sort {
        menu.sort = sort;
    }
    if let Some(visible) = payload.visible {
        menu.visible = visible;
    }
    if let Some(keep_alive) = payload.keep_alive {
        menu.keep_alive = keep_alive;
    }
    if let Some(always_show) = payload.always_show {
        menu.always_show = always_show;
    }

    let updated = state
        .menu_service
        .update(&menu)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/v1/menus/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ErrorReply> {
    state.menu_service.delete(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}
