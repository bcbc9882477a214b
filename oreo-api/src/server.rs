use crate::handlers;
use axum::routing::{delete, get, post, put};
use axum::Router as AxumRouter;
use oreo_auth::Oreo;
use oreo_core::config::AdminConfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared state for the auth REST boundary.
#[derive(Clone)]
pub struct AppState {
    pub oreo: Arc<Oreo>,
}

/// Build the boundary router, mounted at `{prefix}/oreo/auth`.
pub fn build_auth_router(state: AppState, prefix: &str) -> AxumRouter {
    let api = AxumRouter::new()
        // routes
        .route("/route", get(handlers::routes::route_list))
        .route("/route", post(handlers::routes::add_routes))
        .route("/route", put(handlers::routes::update_route_desc))
        .route("/route", delete(handlers::routes::del_route))
        .route("/route/method", get(handlers::routes::data_auth_routes))
        .route("/route/method", put(handlers::routes::enable_data_auth))
        .route("/route/method", post(handlers::routes::disable_data_auth))
        .route("/route/method", delete(handlers::routes::del_route_method))
        .route("/route/method/desc", put(handlers::routes::update_route_method_desc))
        .route("/route/info", get(handlers::routes::query_route_info))
        // roles
        .route("/role", get(handlers::roles::role_route_diff))
        .route("/role", post(handlers::roles::add_role))
        .route("/role", delete(handlers::roles::del_role))
        .route("/role/user", get(handlers::roles::query_user_roles))
        .route("/role/user", post(handlers::roles::add_role_users))
        .route("/role/user", put(handlers::roles::del_role_users))
        .route("/role/info", get(handlers::roles::query_role_info))
        .route("/role/info", put(handlers::roles::set_default_role))
        .route("/role/info", post(handlers::roles::update_role_type_desc))
        // users
        .route("/user", get(handlers::users::query_user_info))
        .route("/user", put(handlers::users::query_user_info_simple))
        .route("/user/sign", get(handlers::users::user_own_signs))
        .route("/user/sign", post(handlers::users::add_user_sign_key))
        .route("/user/sign", put(handlers::users::update_user_sign_key))
        .route("/user/role", get(handlers::users::user_own_roles))
        // sign grants
        .route("/sign", get(handlers::signs::query_sign))
        .route("/sign", post(handlers::signs::add_sign))
        .route("/sign", put(handlers::signs::copy_sign))
        .route("/sign", delete(handlers::signs::del_sign))
        .route("/sign/users", get(handlers::signs::sign_diff_global))
        .route("/sign/users", put(handlers::signs::append_sign_uri))
        .route("/sign/users", post(handlers::signs::remove_sign_uri));

    AxumRouter::new()
        .nest(&format!("{}/oreo/auth", prefix.trim_end_matches('/')), api)
        .with_state(state)
}

/// Serve the boundary on the configured listener.
pub async fn start(config: &AdminConfig, state: AppState, prefix: &str) -> anyhow::Result<()> {
    if !config.enabled {
        info!("auth REST boundary disabled");
        return Ok(());
    }

    let mut app = build_auth_router(state, prefix);

    if !config.cors_origins.is_empty() {
        let cors = CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(Any);
        app = app.layer(cors);
    }

    info!(addr = %config.addr, "starting auth REST boundary");

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
