//! Health and readiness probes

use crate::{db, error::AppError, middleware::AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

static APP_START: OnceLock<Instant> = OnceLock::new();

/// Record process start time; call once during startup
pub fn record_start_time() {
    let _ = APP_START.set(Instant::now());
}

fn uptime_secs() -> u64 {
    APP_START.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

/// GET /health
/// Liveness only; does not touch the database
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime_secs(),
    }))
}

/// GET /ready
/// Readiness, including a database round trip
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    match db::health_check(&state.db).await {
        db::HealthStatus::Healthy => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "database": "ok",
            })),
        )),
        db::HealthStatus::Unhealthy(reason) => {
            tracing::warn!(reason = %reason, "Readiness check failed");
            Ok((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "database": reason,
                })),
            ))
        }
    }
}

/// Fallback for unmatched routes
pub async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Route not found",
        })),
    )
}
