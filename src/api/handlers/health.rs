//! Liveness and database-reachability checks.

use axum::Router;
use axum::extract::State;
use axum::routing::get;

use crate::app_state::AppState;
use crate::error::{ErrorResponse, ServiceError};

/// `GET /shallow/health/check` — answers without touching the pool.
#[utoipa::path(
    get,
    path = "/shallow/health/check",
    tag = "Health",
    summary = "Liveness check",
    responses(
        (status = 200, description = "Service process is up", body = String),
    )
)]
pub async fn shallow_health(State(state): State<AppState>) -> String {
    format!(
        "Health check for {} service is successful!",
        state.entity().service_name()
    )
}

/// `GET /full/health/check` — acquires one connection and releases it.
///
/// # Errors
///
/// Returns [`ServiceError::HealthCheck`] if no connection can be acquired.
#[utoipa::path(
    get,
    path = "/full/health/check",
    tag = "Health",
    summary = "Database reachability check",
    description = "Acquires one pooled connection and releases it immediately.",
    responses(
        (status = 200, description = "A connection could be acquired", body = String),
        (status = 500, description = "No connection could be acquired", body = ErrorResponse),
    )
)]
pub async fn full_health(State(state): State<AppState>) -> Result<String, ServiceError> {
    state.records.check_connectivity().await?;
    Ok(format!(
        "Health check for {} service is successful! Application is able to acquire DB connection.",
        state.entity().service_name()
    ))
}

/// Health routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shallow/health/check", get(shallow_health))
        .route("/full/health/check", get(full_health))
}
