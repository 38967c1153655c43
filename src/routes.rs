//! Route wiring

use crate::{
    auth::middleware::{auth_middleware, authorize},
    handlers::{auth, health, user},
    middleware::{request_tracking_middleware, AppState},
    models::account::Role,
};
use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // No token required
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    // Admin role required; the role gate is a route_layer so it runs after
    // the outer authentication stage has attached the context
    let admin = Router::new()
        .route("/api/users", get(user::list_users))
        .route("/api/users/{id}", axum::routing::delete(user::delete_user))
        .route_layer(from_fn(|req, next| authorize(ADMIN_ONLY, req, next)));

    // Any authenticated account; per-handler checks narrow further
    let authenticated = Router::new()
        .route("/api/auth/me", get(auth::get_me))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/users/{id}",
            get(user::get_user).put(user::update_user),
        )
        .merge(admin)
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .fallback(health::not_found_handler)
        .layer(from_fn(request_tracking_middleware))
        .layer(cors_layer(&state))
        .with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    match &state.config.server.allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}
