//! System endpoints: pool status and the OpenAPI document.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use utoipa::OpenApi;

use crate::api::dto::StatusResponse;
use crate::api::openapi::ApiDoc;
use crate::app_state::AppState;

/// `GET /status` — service identity and pool counters.
///
/// Reads the counters only; never acquires a connection.
#[utoipa::path(
    get,
    path = "/status",
    tag = "System",
    summary = "Service status",
    description = "Returns service name, version, timestamp, and connection pool counters.",
    responses(
        (status = 200, description = "Current status", body = StatusResponse),
    )
)]
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let pool = state.records.pool();
    let status = if pool.is_closed() { "closed" } else { "ok" };
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: status.to_string(),
            service: state.entity().service_name().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            pool: pool.status().into(),
        }),
    )
}

/// `GET /api-docs/openapi.json` — OpenAPI document of the DTO schemas.
pub async fn openapi_handler() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    let router = Router::new()
        .route("/status", get(status_handler))
        .route("/api-docs/openapi.json", get(openapi_handler));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/swagger.json", ApiDoc::openapi()),
    );

    router
}
