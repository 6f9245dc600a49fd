use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use admin_api::handlers::{auth, health, menu, role, user};
use admin_api::middleware::require_auth;
use admin_api::state::AppState;
use admin_core::repositories::{MenuRepository, RoleRepository, UserRepository};
use admin_core::services::{AuthService, MenuService, PermissionService};
use admin_infrastructure::database::connection;
use admin_infrastructure::{PgMenuRepository, PgRoleRepository, PgUserRepository};
use admin_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    admin_shared::telemetry::init_telemetry();

    info!("Admin server starting...");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to Database
    info!("Connecting to database...");
    let pool = connection::create_pool(&config.database.url, config.database.max_connections).await?;
    info!("Database connection established.");

    // Wire repositories and services
    let menus: Arc<dyn MenuRepository> = Arc::new(PgMenuRepository::new(pool.clone()));
    let roles: Arc<dyn RoleRepository> = Arc::new(PgRoleRepository::new(pool.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));

    let state = AppState {
        auth: Arc::new(AuthService::new(
            users.clone(),
            roles.clone(),
            config.jwt.secret.clone(),
            config.jwt.access_token_expiry,
            config.jwt.refresh_token_expiry,
        )),
        menu_service: Arc::new(MenuService::new(menus.clone())),
        permission_service: Arc::new(PermissionService::new(menus.clone(), roles.clone())),
        users,
        roles,
        config: config.clone(),
    };

    // Routes behind bearer-token authentication
    let protected = Router::new()
        .route("/api/v1/menus", get(menu::list).post(menu::create))
        .route("/api/v1/menus/routes", get(menu::routes))
        .route(
            "/api/v1/menus/{id}",
            get(menu::get).put(menu::update).delete(menu::delete),
        )
        .route("/api/v1/roles", get(role::list).post(role::create))
        .route("/api/v1/roles/menus", get(role::assignable_menus))
        .route(
            "/api/v1/roles/{id}",
            get(role::get).put(role::update).delete(role::delete),
        )
        .route(
            "/api/v1/roles/{id}/menus",
            get(role::granted_menus).put(role::set_menus),
        )
        .route("/api/v1/users", get(user::list).post(user::create))
        .route("/api/v1/users/me", get(user::me))
        .route("/api/v1/users/me/password", put(user::change_password))
        .route(
            "/api/v1/users/{id}",
            get(user::get).put(user::update).delete(user::delete),
        )
        .route("/api/v1/users/{id}/password/reset", put(user::reset_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Build router
    let app = Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION]),
        );

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
