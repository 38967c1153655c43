//! Authentication endpoints

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::Json,
    middleware::AppState,
    models::account::{AccountDetail, AccountProfile, LoginRequest, RegisterRequest},
};
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use std::sync::Arc;

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let authenticated = state.auth_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "token": authenticated.token,
            "user": AccountProfile::from(authenticated.account),
        })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let authenticated = state.auth_service.login(req).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": authenticated.token,
        "user": AccountProfile::from(authenticated.account),
    })))
}

/// GET /api/auth/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let account = state
        .auth_service
        .current_account(auth_context.account_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "user": AccountDetail::from(account),
    })))
}

/// POST /api/auth/logout
///
/// Tokens are stateless, so there is nothing to revoke server-side; the
/// client discards its copy. The endpoint exists so clients have a uniform
/// session-end call.
pub async fn logout(auth_context: AuthContext) -> impl IntoResponse {
    tracing::info!(account_id = %auth_context.account_id, "Logout");

    Json(json!({
        "success": true,
        "message": "Logout successful",
    }))
}
