//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::Entity;
use crate::persistence::ConnectionPool;
use crate::service::RecordService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Record operations for the served entity.
    pub records: Arc<RecordService>,
}

impl AppState {
    /// Builds the state for `entity` over an already constructed pool.
    #[must_use]
    pub fn new(pool: ConnectionPool, entity: Entity) -> Self {
        Self {
            records: Arc::new(RecordService::new(pool, entity)),
        }
    }

    /// The served entity.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.records.entity()
    }
}
