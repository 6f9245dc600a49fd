//! Bearer-token authentication middleware

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use tracing::debug;

use crate::response::{ApiResponse, ErrorReply};
use crate::state::AppState;

/// Resolves the `Authorization: Bearer` token into a [`CurrentUser`]
/// extension. Requests without a valid token are rejected before any
/// handler runs.
///
/// [`CurrentUser`]: admin_core::domain::CurrentUser
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ErrorReply> {
    let token = bearer_token(&request).ok_or_else(unauthorized)?;

    let principal = state
        .auth
        .current_user(token)
        .await
        .map_err(|_| unauthorized())?;

    debug!(username = %principal.username, "authenticated request");
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn unauthorized() -> ErrorReply {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::error("UNAUTHORIZED", "Authentication required")),
    )
}
