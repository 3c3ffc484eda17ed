//! REST endpoint handlers organized by concern.

pub mod health;
pub mod records;
pub mod system;

use axum::Router;

use crate::app_state::AppState;
use crate::domain::Entity;

/// Composes every route of the service for `entity`.
pub fn routes(entity: Entity) -> Router<AppState> {
    Router::new()
        .merge(records::routes(entity))
        .merge(health::routes())
        .merge(system::routes())
}
