//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Record routes live under the entity's collection path
//! (`/customers`, `/sellers`); health and system routes sit at the root.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;
use crate::domain::Entity;

/// Builds the complete API router for the service of `entity`.
pub fn build_router(entity: Entity) -> Router<AppState> {
    handlers::routes(entity)
}
