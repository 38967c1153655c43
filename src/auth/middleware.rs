//! Authentication gate
//!
//! Stage one (`auth_middleware`) verifies the bearer token and loads the
//! claimed account; stage two (`authorize`) enforces role membership on the
//! routes that opt into it.

use crate::{error::AppError, middleware::AppState, models::account::Role};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

/// Authenticated identity, attached to request extensions by the gate
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// Allow handlers to extract AuthContext directly
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .ok_or(AppError::Unauthorized)
}

/// Authentication middleware for protected routes.
///
/// Verifies the token, then loads the account it names; a token for a
/// deleted account is rejected the same way as an invalid one.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())?;

    let account_id = state.jwt_service.verify(&token).map_err(|e| {
        tracing::debug!(reason = %e, "Token verification failed");
        AppError::Unauthorized
    })?;

    let account = state
        .accounts
        .find_by_id(account_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let auth_context = AuthContext {
        account_id: account.id,
        username: account.username.clone(),
        role: account.role(),
    };

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Authorization middleware: require one of the allowed roles.
///
/// Must run after `auth_middleware`; a missing context means the route was
/// wired without the authentication stage and is treated as unauthenticated.
pub async fn authorize(
    allowed: &'static [Role],
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    if !allowed.contains(&context.role) {
        tracing::debug!(
            account_id = %context.account_id,
            role = ?context.role,
            "Role not permitted for route"
        );
        return Err(AppError::forbidden("Access denied"));
    }

    Ok(next.run(req).await)
}
