//! Account management endpoints
//!
//! Listing and deletion are admin-only (enforced at the router); reading and
//! updating a single account is allowed for the account's owner or an admin.

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::{Json, Path},
    middleware::AppState,
    models::account::{AccountDetail, UpdateAccountRequest},
};
use axum::{extract::State, response::IntoResponse};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// GET /api/users (admin only)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let accounts = state.accounts.find_all().await?;

    let users: Vec<AccountDetail> = accounts.into_iter().map(AccountDetail::from).collect();

    Ok(Json(json!({
        "success": true,
        "count": users.len(),
        "users": users,
    })))
}

/// GET /api/users/{id} (owner or admin)
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if auth_context.account_id != id && !auth_context.is_admin() {
        return Err(AppError::forbidden("Access denied"));
    }

    let account = state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(json!({
        "success": true,
        "user": AccountDetail::from(account),
    })))
}

/// PUT /api/users/{id} (owner or admin)
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    if auth_context.account_id != id && !auth_context.is_admin() {
        return Err(AppError::forbidden("Access denied"));
    }

    let account = state
        .accounts
        .update(id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    tracing::info!(account_id = %id, updated_by = %auth_context.account_id, "Account updated");

    Ok(Json(json!({
        "success": true,
        "message": "User updated successfully",
        "user": AccountDetail::from(account),
    })))
}

/// DELETE /api/users/{id} (admin only)
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.accounts.delete(id).await?;

    if !deleted {
        return Err(AppError::not_found("User not found"));
    }

    tracing::info!(account_id = %id, deleted_by = %auth_context.account_id, "Account deleted");

    Ok(Json(json!({
        "success": true,
        "message": "User deleted successfully",
    })))
}
